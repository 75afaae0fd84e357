//! Users Domain
//!
//! The identity anchor of the catalog: every category and product is owned
//! by exactly one user. This crate covers registration and lookup only;
//! credential validation and token issuance live in the upstream gateway.
//!
//! # Architecture
//!
//! ```text
//! Handlers  ->  UserService  ->  BaseRepository<User>  ->  MongoDB
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{RegisterUser, Role, User, UserResponse};
pub use service::UserService;
