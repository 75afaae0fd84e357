use chrono::{DateTime, Utc};
use database::{Entity, EntityPatch};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Category entity - stored in the `categories` collection
///
/// Visible and usable only by its owner.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct Category {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Category display name (unique per owner)
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Owning user
    pub owner_id: Uuid,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Entity for Category {
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// DTO for creating a new category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// DTO for renaming an existing category
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateCategory {
    pub name: Option<String>,
}

impl EntityPatch<Category> for UpdateCategory {
    fn apply(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        category.updated_at = Utc::now();
    }
}

impl Category {
    /// Create a new category owned by the given user
    pub fn new(input: CreateCategory, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}
