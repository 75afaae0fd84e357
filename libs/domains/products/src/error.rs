use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::RepositoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    /// Raised both when the product does not exist and when it belongs to
    /// another owner; callers cannot tell the two apart.
    #[error("Product not found")]
    NotFound,

    /// The referenced entity does not exist or belongs to another owner.
    #[error("The specified {0} does not exist or does not belong to the user")]
    InvalidReference(&'static str),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound => AppError::NotFound("Product not found".to_string()),
            ProductError::InvalidReference(field) => AppError::BadRequest(format!(
                "The specified {} does not exist or does not belong to the user",
                field
            )),
            ProductError::Repository(e) => match e {
                RepositoryError::InvalidId(id) => {
                    AppError::BadRequest(format!("Invalid identifier: {}", id))
                }
                RepositoryError::Validation(errors) => AppError::ValidationError(errors),
                RepositoryError::Deserialize(e) => AppError::InternalServerError(e.to_string()),
                RepositoryError::Database(e) => AppError::InternalServerError(e.to_string()),
            },
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
