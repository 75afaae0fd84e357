use chrono::{DateTime, Utc};
use database::{Entity, EntityPatch, Expand};
use domain_categories::Category;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Stock level below which a product counts as low-stock in statistics.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Resolves a product's `category_id` against the categories collection.
pub const CATEGORY_EXPAND: Expand = Expand {
    from: Category::COLLECTION,
    local_field: "category_id",
    field: "category",
};

/// Product entity - stored in the `products` collection
///
/// Owned by exactly one user; the referenced category must belong to the
/// same owner (enforced by the service, not the storage engine).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct Product {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Product name
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Owning user
    pub owner_id: Uuid,
    /// Category the product belongs to (same owner)
    pub category_id: Uuid,
    /// Unit price
    #[validate(range(min = 0.0))]
    pub price: f64,
    /// Units in stock
    #[validate(range(min = 0))]
    pub stock: i32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Entity for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// DTO for creating a new product
///
/// Deserialized without eager validation: the service checks the category
/// reference first and leaves structural validation to the repository, so
/// a bad reference is reported even when other fields are also invalid.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProduct {
    #[serde(default)]
    pub name: String,
    pub category_id: Uuid,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i32,
}

/// DTO for partially updating an existing product
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
}

impl EntityPatch<Product> for UpdateProduct {
    fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(category_id) = self.category_id {
            product.category_id = category_id;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        product.updated_at = Utc::now();
    }
}

/// A product with its category resolved inline
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
}

/// One category's share of an owner's products
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    /// Display name of the category
    pub category_name: String,
    /// Number of the owner's products in it
    pub count: i64,
}

/// Per-owner product statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductStats {
    pub total_products: u64,
    pub low_stock_products: u64,
    /// One entry per category actually used; ordering is unspecified
    pub category_breakdown: Vec<CategoryCount>,
}

impl Product {
    /// Create a new product owned by the given user
    pub fn new(input: CreateProduct, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            owner_id,
            category_id: input.category_id,
            price: input.price,
            stock: input.stock,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product::new(
            CreateProduct {
                name: "Keyboard".to_string(),
                category_id: Uuid::new_v4(),
                price: 49.99,
                stock: 12,
            },
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_new_product_copies_inputs() {
        let owner = Uuid::new_v4();
        let category = Uuid::new_v4();
        let product = Product::new(
            CreateProduct {
                name: "Keyboard".to_string(),
                category_id: category,
                price: 49.99,
                stock: 12,
            },
            owner,
        );

        assert_eq!(product.owner_id, owner);
        assert_eq!(product.category_id, category);
        assert_eq!(product.price, 49.99);
        assert_eq!(product.stock, 12);
    }

    #[test]
    fn test_partial_patch_leaves_other_fields_untouched() {
        let mut product = sample_product();
        let stock_before = product.stock;
        let name_before = product.name.clone();

        UpdateProduct {
            price: Some(59.99),
            ..Default::default()
        }
        .apply(&mut product);

        assert_eq!(product.price, 59.99);
        assert_eq!(product.stock, stock_before);
        assert_eq!(product.name, name_before);
    }

    #[test]
    fn test_patched_product_can_become_invalid() {
        let mut product = sample_product();

        UpdateProduct {
            price: Some(-1.0),
            stock: Some(-5),
            ..Default::default()
        }
        .apply(&mut product);

        let errors = product.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("stock"));
    }

    #[test]
    fn test_product_with_category_flattens_in_json() {
        let product = sample_product();
        let category = Category::new(
            domain_categories::CreateCategory {
                name: "Peripherals".to_string(),
            },
            product.owner_id,
        );

        let json = serde_json::to_value(ProductWithCategory {
            product: product.clone(),
            category,
        })
        .unwrap();

        // Product fields stay top-level; the category is nested
        assert_eq!(json.get("name").unwrap(), "Keyboard");
        assert_eq!(
            json.get("category").unwrap().get("name").unwrap(),
            "Peripherals"
        );
    }
}
