use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Environment variable not set error, {0}")]
    EnvironmentVariableNotSetError(String),
    #[error("File read error, {0}")]
    FileReadError(String),
    #[error("Database connection error")]
    DatabaseConnectionError,
    #[error("Sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Object storage error: {0}")]
    ObjectStorageError(#[from] object_store::Error),
    #[error("You're not authorized!")]
    UnauthorizedError,
    #[error("{0}")]
    ForbiddenError(String),
    #[error("You're already signed in")]
    AlreadyAuthenticatedError,
    #[error("jsonwebtoken error")]
    JsonWebTokenError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid form data, {0}")]
    InvalidFormData(String),
    #[error("Invalid image format error, {0}")]
    InvalidImageFormatError(String),
    #[error("File {file_name} exceeds the maximum size of 5MB")]
    FileTooLargeError { file_name: String, size: usize },
    #[error("Validation error, {0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("Wizard session {0} not found")]
    WizardNotFoundError(Uuid),
    #[error("IO error, {0}")]
    IoError(#[from] std::io::Error),
    #[error("Url parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("Internal error, {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            Self::EnvironmentVariableNotSetError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Environment variable not set error, {}", e),
            ),
            Self::FileReadError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
            Self::DatabaseConnectionError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database connection error".to_string(),
            ),
            Self::SqlxError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::MigrationError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::ObjectStorageError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::UnauthorizedError => (StatusCode::UNAUTHORIZED, "Unauthorized!".to_string()),
            Self::ForbiddenError(e) => (StatusCode::FORBIDDEN, e),
            Self::AlreadyAuthenticatedError => (
                StatusCode::BAD_REQUEST,
                "You're already signed in".to_string(),
            ),
            Self::JsonWebTokenError(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            Self::InvalidFormData(e) => (StatusCode::UNPROCESSABLE_ENTITY, e),
            Self::InvalidImageFormatError(e) => (StatusCode::UNPROCESSABLE_ENTITY, e),
            Self::FileTooLargeError { file_name, .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("File {file_name} exceeds the maximum size of 5MB"),
            ),
            Self::ValidationError(e) => (StatusCode::UNPROCESSABLE_ENTITY, e),
            Self::NotFoundError(e) => (StatusCode::NOT_FOUND, e),
            Self::WizardNotFoundError(id) => (
                StatusCode::NOT_FOUND,
                format!("Wizard session {id} not found"),
            ),
            Self::IoError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::UrlParseError(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Url parse error, {}", e),
            ),
            Self::InternalError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
        };

        let body = Json(json!({"error": error_message}));

        (status, body).into_response()
    }
}
