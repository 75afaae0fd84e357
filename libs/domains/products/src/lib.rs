//! Products Domain
//!
//! The policy core of the catalog. `ProductService` composes two generic
//! repositories and layers the rules the storage engine does not enforce:
//!
//! - every query is scoped to the authenticated owner;
//! - a product's category must exist and belong to the same owner,
//!   checked before any write that touches the reference;
//! - absent and foreign-owned products raise the same error, so callers
//!   cannot probe other tenants' ids;
//! - per-owner statistics are computed with a grouped aggregation joined
//!   to the categories collection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, pagination envelope
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← ownership, referential integrity, statistics
//! └──────┬──────┘
//!        │
//! ┌──────▼─────────────────┐
//! │ BaseRepository<Product> │  +  BaseRepository<Category>
//! └──────┬─────────────────┘
//!        │
//! ┌──────▼──────┐
//! │   MongoDB   │
//! └─────────────┘
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{
    CategoryCount, CreateProduct, LOW_STOCK_THRESHOLD, Product, ProductStats, ProductWithCategory,
    UpdateProduct,
};
pub use service::ProductService;
