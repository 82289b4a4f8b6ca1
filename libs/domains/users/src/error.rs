use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, JsonOrFormRejection};
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    /// Caller is not an admin (or carries no usable role)
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("Bad request: invalid role")]
    InvalidRole,

    #[error("Invalid user id: {0}")]
    InvalidId(String),

    #[error("Malformed request body: {0}")]
    MalformedPayload(String),

    #[error("Username already exist")]
    DuplicateUsername(String),

    #[error("User {0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<JsonOrFormRejection> for UserError {
    fn from(rejection: JsonOrFormRejection) -> Self {
        UserError::MalformedPayload(rejection.to_string())
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Unauthorized => AppError::Unauthorized("Unauthorized".to_string()),
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::InvalidRole => AppError::BadRequest(UserError::InvalidRole.to_string()),
            UserError::InvalidId(raw) => AppError::InvalidId(raw),
            UserError::MalformedPayload(msg) => AppError::BadRequest(msg),
            UserError::DuplicateUsername(username) => {
                tracing::debug!(%username, "Username taken");
                AppError::Conflict("Username already exist".to_string())
            }
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::Database(err) => AppError::Database(err),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
