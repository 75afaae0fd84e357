//! Database library providing the MongoDB connector and the generic
//! document repository used by every domain crate.
//!
//! # Features
//!
//! - `config` - Configuration support with `core_config::FromEnv`
//!
//! # Examples
//!
//! ```ignore
//! use database::{mongodb, BaseRepository};
//!
//! let client = mongodb::connect("mongodb://localhost:27017").await?;
//! let db = client.database("catalog");
//! let products: BaseRepository<Product> = BaseRepository::new(&db);
//! ```

// Always available modules
pub mod common;

pub mod mongodb;

// Generic document repository over a single collection
pub mod repository;

// Re-exports for convenience
pub use repository::{
    BaseRepository, Entity, EntityPatch, Expand, QueryOptions, RepositoryError, RepositoryResult,
    uuid_bson,
};
