//! Custom extractors for Axum handlers.
//!
//! This module provides reusable extractors that reduce boilerplate
//! and standardize error handling across the API.

pub mod identity;
pub mod validated_json;

pub use identity::Identity;
pub use validated_json::ValidatedJson;
