//! Product service - ownership and referential-integrity policy

use database::{BaseRepository, Entity, QueryOptions, RepositoryResult, uuid_bson};
use domain_categories::Category;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CATEGORY_EXPAND, CreateProduct, LOW_STOCK_THRESHOLD, Product, ProductStats,
    ProductWithCategory, UpdateProduct,
};

/// Product service layering policy over the generic repositories.
///
/// The service never talks to the store directly: it composes the
/// repositories' primitives and adds ownership scoping, referential
/// validation and the statistics aggregation. Every operation is a
/// stateless, request-scoped transformation; two-step operations
/// (ownership lookup, then mutation) are not wrapped in a transaction,
/// which leaves a benign race when a concurrent delete lands between the
/// two steps.
#[derive(Clone)]
pub struct ProductService {
    products: BaseRepository<Product>,
    categories: BaseRepository<Category>,
}

impl ProductService {
    pub fn new(db: &Database) -> Self {
        Self {
            products: BaseRepository::new(db),
            categories: BaseRepository::new(db),
        }
    }

    /// Initialize indexes for the products collection
    pub async fn init_indexes(&self) -> RepositoryResult<()> {
        let indexes = vec![
            // Owner listing in creation order
            IndexModel::builder()
                .keys(doc! { "owner_id": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_owner_created".to_string())
                        .build(),
                )
                .build(),
            // Referential checks and the category breakdown
            IndexModel::builder()
                .keys(doc! { "owner_id": 1, "category_id": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_owner_category".to_string())
                        .build(),
                )
                .build(),
            // Low-stock counting
            IndexModel::builder()
                .keys(doc! { "owner_id": 1, "stock": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_owner_stock".to_string())
                        .build(),
                )
                .build(),
        ];

        self.products.collection().create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    /// List an owner's products with their categories resolved.
    ///
    /// Pagination and sorting options pass through unchanged. The owner id
    /// comes from the authenticated identity and is not re-validated.
    #[instrument(skip(self, options))]
    pub async fn list_by_owner(
        &self,
        owner_id: Uuid,
        options: QueryOptions,
    ) -> ProductResult<Vec<ProductWithCategory>> {
        let products = self
            .products
            .find_many_expanded(
                doc! { "owner_id": uuid_bson(owner_id) },
                &[CATEGORY_EXPAND],
                options,
            )
            .await?;
        Ok(products)
    }

    /// Number of products the owner has (pagination envelope)
    #[instrument(skip(self))]
    pub async fn count_by_owner(&self, owner_id: Uuid) -> ProductResult<u64> {
        let count = self
            .products
            .count(doc! { "owner_id": uuid_bson(owner_id) })
            .await?;
        Ok(count)
    }

    /// Ownership-scoped single fetch with the category resolved
    #[instrument(skip(self))]
    pub async fn get_by_owner(
        &self,
        product_id: &str,
        owner_id: Uuid,
    ) -> ProductResult<ProductWithCategory> {
        let row: Option<ProductWithCategory> = self
            .products
            .find_by_id_expanded(product_id, &[CATEGORY_EXPAND])
            .await?;

        match row {
            Some(row) if row.product.owner_id == owner_id => Ok(row),
            _ => Err(ProductError::NotFound),
        }
    }

    /// Create a product for an owner.
    ///
    /// The category reference is checked first, before structural
    /// validation, so a bad reference is reported even when other fields
    /// are also invalid. An input with a valid category but invalid fields
    /// surfaces the repository's aggregated validation failure instead.
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create(&self, input: CreateProduct, owner_id: Uuid) -> ProductResult<Product> {
        self.owned_category(input.category_id, owner_id).await?;

        let product = self.products.create(Product::new(input, owner_id)).await?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Partially update an owned product.
    ///
    /// Fields absent from the patch are left unchanged. When the patch
    /// touches the category reference, it is re-validated exactly as in
    /// create.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        product_id: &str,
        patch: UpdateProduct,
        owner_id: Uuid,
    ) -> ProductResult<Product> {
        self.owned_product(product_id, owner_id).await?;

        if let Some(category_id) = patch.category_id {
            self.owned_category(category_id, owner_id).await?;
        }

        // The product can vanish between the ownership lookup and the
        // patch; the disappearance collapses into the same not-found.
        self.products
            .update(product_id, patch)
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Delete an owned product, returning the removed entity
    #[instrument(skip(self))]
    pub async fn delete(&self, product_id: &str, owner_id: Uuid) -> ProductResult<Product> {
        self.owned_product(product_id, owner_id).await?;

        self.products
            .delete(product_id)
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Per-owner statistics: totals, low-stock count and the per-category
    /// breakdown (categories with zero products are omitted; ordering is
    /// unspecified).
    #[instrument(skip(self))]
    pub async fn statistics(&self, owner_id: Uuid) -> ProductResult<ProductStats> {
        let total_products = self
            .products
            .count(doc! { "owner_id": uuid_bson(owner_id) })
            .await?;

        let low_stock_products = self
            .products
            .count(doc! {
                "owner_id": uuid_bson(owner_id),
                "stock": { "$lt": LOW_STOCK_THRESHOLD },
            })
            .await?;

        let pipeline = vec![
            doc! { "$match": { "owner_id": uuid_bson(owner_id) } },
            doc! { "$group": { "_id": "$category_id", "count": { "$sum": 1 } } },
            doc! { "$lookup": {
                "from": Category::COLLECTION,
                "localField": "_id",
                "foreignField": "_id",
                "as": "category",
            } },
            doc! { "$unwind": "$category" },
            doc! { "$project": { "_id": 0, "category_name": "$category.name", "count": 1 } },
        ];

        let category_breakdown = self.products.aggregate(pipeline).await?;

        Ok(ProductStats {
            total_products,
            low_stock_products,
            category_breakdown,
        })
    }

    /// Ownership-scoped product lookup; absent and foreign-owned collapse
    /// to the same error.
    async fn owned_product(&self, product_id: &str, owner_id: Uuid) -> ProductResult<Product> {
        let id = BaseRepository::<Product>::parse_id(product_id)?;
        self.products
            .find_one(doc! { "_id": uuid_bson(id), "owner_id": uuid_bson(owner_id) })
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Referential validation: the category must exist under the same owner
    async fn owned_category(&self, category_id: Uuid, owner_id: Uuid) -> ProductResult<Category> {
        self.categories
            .find_one(doc! { "_id": uuid_bson(category_id), "owner_id": uuid_bson(owner_id) })
            .await?
            .ok_or(ProductError::InvalidReference("category"))
    }
}
