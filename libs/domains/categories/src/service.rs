//! Category service - ownership-scoped category management

use database::{BaseRepository, QueryOptions, RepositoryError, RepositoryResult, uuid_bson};
use mongodb::bson::{Document, doc};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CreateCategory, UpdateCategory};

// Collection the InUse guard counts against; owned by the products domain.
const PRODUCTS_COLLECTION: &str = "products";

/// Category service providing ownership-scoped CRUD.
///
/// Every query is scoped to the authenticated owner; absent and
/// foreign-owned categories are indistinguishable to callers.
#[derive(Clone)]
pub struct CategoryService {
    categories: BaseRepository<Category>,
    products: Collection<Document>,
}

impl CategoryService {
    pub fn new(db: &Database) -> Self {
        Self {
            categories: BaseRepository::new(db),
            products: db.collection::<Document>(PRODUCTS_COLLECTION),
        }
    }

    /// Initialize indexes for the categories collection
    pub async fn init_indexes(&self) -> RepositoryResult<()> {
        let owner_name_unique = IndexModel::builder()
            .keys(doc! { "owner_id": 1, "name": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_owner_name_unique".to_string())
                    .build(),
            )
            .build();

        self.categories
            .collection()
            .create_indexes(vec![owner_name_unique])
            .await?;
        tracing::info!("Category indexes created successfully");
        Ok(())
    }

    /// List all categories of an owner, name-sorted
    #[instrument(skip(self))]
    pub async fn list_by_owner(&self, owner_id: Uuid) -> CategoryResult<Vec<Category>> {
        let categories = self
            .categories
            .find_many(
                doc! { "owner_id": uuid_bson(owner_id) },
                QueryOptions::new().sort(doc! { "name": 1 }),
            )
            .await?;
        Ok(categories)
    }

    /// Create a new category for an owner
    #[instrument(skip(self, input), fields(category_name = %input.name))]
    pub async fn create(&self, input: CreateCategory, owner_id: Uuid) -> CategoryResult<Category> {
        input.validate().map_err(RepositoryError::from)?;

        if self.name_taken(owner_id, &input.name).await? {
            return Err(CategoryError::DuplicateName(input.name));
        }

        let category = self.categories.create(Category::new(input, owner_id)).await?;
        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// Rename an existing owned category
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        category_id: &str,
        patch: UpdateCategory,
        owner_id: Uuid,
    ) -> CategoryResult<Category> {
        let existing = self.owned_category(category_id, owner_id).await?;

        if let Some(ref new_name) = patch.name {
            if new_name != &existing.name && self.name_taken(owner_id, new_name).await? {
                return Err(CategoryError::DuplicateName(new_name.clone()));
            }
        }

        self.categories
            .update(category_id, patch)
            .await?
            .ok_or(CategoryError::NotFound)
    }

    /// Delete an owned category, refusing while products still use it
    #[instrument(skip(self))]
    pub async fn delete(&self, category_id: &str, owner_id: Uuid) -> CategoryResult<Category> {
        let existing = self.owned_category(category_id, owner_id).await?;

        let in_use = self
            .products
            .count_documents(doc! {
                "owner_id": uuid_bson(owner_id),
                "category_id": uuid_bson(existing.id),
            })
            .await
            .map_err(RepositoryError::from)?;

        if in_use > 0 {
            return Err(CategoryError::InUse);
        }

        self.categories
            .delete(category_id)
            .await?
            .ok_or(CategoryError::NotFound)
    }

    /// Ownership-scoped lookup; absent and foreign-owned collapse to the
    /// same error.
    async fn owned_category(&self, category_id: &str, owner_id: Uuid) -> CategoryResult<Category> {
        let id = BaseRepository::<Category>::parse_id(category_id)?;
        self.categories
            .find_one(doc! { "_id": uuid_bson(id), "owner_id": uuid_bson(owner_id) })
            .await?
            .ok_or(CategoryError::NotFound)
    }

    async fn name_taken(&self, owner_id: Uuid, name: &str) -> CategoryResult<bool> {
        let filter = doc! { "owner_id": uuid_bson(owner_id), "name": name };
        Ok(self.categories.find_one(filter).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::TestMongo;

    fn create_input(name: &str) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_sorted_by_name() {
        let mongo = TestMongo::new().await;
        let service = CategoryService::new(mongo.database());
        let owner = Uuid::new_v4();

        service.create(create_input("Toys"), owner).await.unwrap();
        service.create(create_input("Books"), owner).await.unwrap();

        let categories = service.list_by_owner(owner).await.unwrap();
        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Books", "Toys"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_same_owner_rejected() {
        let mongo = TestMongo::new().await;
        let service = CategoryService::new(mongo.database());
        let owner = Uuid::new_v4();

        service.create(create_input("Books"), owner).await.unwrap();
        let result = service.create(create_input("Books"), owner).await;
        assert!(matches!(result, Err(CategoryError::DuplicateName(_))));
    }

    #[tokio::test]
    async fn test_same_name_different_owners_allowed() {
        let mongo = TestMongo::new().await;
        let service = CategoryService::new(mongo.database());

        service
            .create(create_input("Books"), Uuid::new_v4())
            .await
            .unwrap();
        service
            .create(create_input("Books"), Uuid::new_v4())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_by_non_owner_collapses_to_not_found() {
        let mongo = TestMongo::new().await;
        let service = CategoryService::new(mongo.database());
        let owner = Uuid::new_v4();

        let category = service.create(create_input("Books"), owner).await.unwrap();

        let patch = UpdateCategory {
            name: Some("Novels".to_string()),
        };
        let result = service
            .update(&category.id.to_string(), patch, Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(CategoryError::NotFound)));

        // Same error as a genuinely unknown id
        let missing = service
            .update(
                &Uuid::new_v4().to_string(),
                UpdateCategory::default(),
                owner,
            )
            .await;
        assert!(matches!(missing, Err(CategoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_category() {
        let mongo = TestMongo::new().await;
        let service = CategoryService::new(mongo.database());
        let owner = Uuid::new_v4();

        let category = service.create(create_input("Books"), owner).await.unwrap();
        let removed = service
            .delete(&category.id.to_string(), owner)
            .await
            .unwrap();
        assert_eq!(removed.id, category.id);

        assert!(service.list_by_owner(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_in_use_category_refused() {
        let mongo = TestMongo::new().await;
        let service = CategoryService::new(mongo.database());
        let owner = Uuid::new_v4();

        let category = service.create(create_input("Books"), owner).await.unwrap();

        // Simulate an owned product referencing the category
        mongo
            .database()
            .collection::<Document>(PRODUCTS_COLLECTION)
            .insert_one(doc! {
                "_id": uuid_bson(Uuid::new_v4()),
                "owner_id": uuid_bson(owner),
                "category_id": uuid_bson(category.id),
                "name": "Dune",
            })
            .await
            .unwrap();

        let result = service.delete(&category.id.to_string(), owner).await;
        assert!(matches!(result, Err(CategoryError::InUse)));
    }
}
