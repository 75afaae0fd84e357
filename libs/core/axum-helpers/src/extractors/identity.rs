//! Authenticated caller identity extractor.

use crate::errors::AppError;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Header carrying the authenticated user id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller's user id.
///
/// Authentication happens at the edge: the upstream gateway validates
/// credentials and forwards the caller's id in the `x-user-id` header.
/// This extractor trusts that header; a missing or malformed value is
/// rejected with 401.
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::Identity;
///
/// async fn list_products(Identity(owner_id): Identity) -> String {
///     format!("Products of {}", owner_id)
/// }
/// ```
#[derive(Debug)]
pub struct Identity(pub Uuid);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_ID_HEADER) else {
            return Err(
                AppError::Unauthorized("Missing caller identity".to_string()).into_response()
            );
        };

        let value = value.to_str().map_err(|_| {
            AppError::Unauthorized("Malformed caller identity".to_string()).into_response()
        })?;

        match Uuid::parse_str(value) {
            Ok(user_id) => Ok(Identity(user_id)),
            Err(_) => Err(
                AppError::Unauthorized("Malformed caller identity".to_string()).into_response(),
            ),
        }
    }
}
