use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::RepositoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("A user with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type UserResult<T> = Result<T, UserError>;

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => AppError::NotFound("User not found".to_string()),
            UserError::DuplicateEmail(email) => {
                AppError::Conflict(format!("A user with email '{}' already exists", email))
            }
            UserError::PasswordHash(msg) => AppError::InternalServerError(msg),
            UserError::Repository(e) => match e {
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

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
