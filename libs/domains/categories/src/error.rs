use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::RepositoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CategoryError {
    /// Raised both when the category does not exist and when it belongs
    /// to another owner; callers cannot tell the two apart.
    #[error("Category not found")]
    NotFound,

    #[error("A category named '{0}' already exists")]
    DuplicateName(String),

    #[error("Category still has products assigned to it")]
    InUse,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type CategoryResult<T> = Result<T, CategoryError>;

/// Convert CategoryError to AppError for standardized error responses
impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound => AppError::NotFound("Category not found".to_string()),
            CategoryError::DuplicateName(name) => {
                AppError::Conflict(format!("A category named '{}' already exists", name))
            }
            CategoryError::InUse => {
                AppError::Conflict("Category still has products assigned to it".to_string())
            }
            CategoryError::Repository(e) => match e {
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

impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
