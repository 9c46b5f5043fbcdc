use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Entity kinds that can be reported as missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Note,
    Tag,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Note => write!(f, "Note"),
            Entity::Tag => write!(f, "Tag"),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    DuplicateEmail,
    DuplicateExternalId,
    DuplicateTagName,
    InvalidCredentials,
    /// Malformed, badly signed or expired token.
    InvalidToken,
    UserNotFound,
    NotFound(Entity),
    Forbidden,
    Database(sqlx::Error),
    PasswordHash(String),
    Token(jsonwebtoken::errors::Error),
    /// Configured token lifetime pushes the expiry past the representable range.
    TokenLifetime,
    Task(tokio::task::JoinError),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::DuplicateEmail => write!(f, "User already registered"),
            AppError::DuplicateExternalId => {
                write!(f, "External id already linked to another user")
            }
            AppError::DuplicateTagName => write!(f, "Tag already exists"),
            AppError::InvalidCredentials => write!(f, "Incorrect username or password"),
            AppError::InvalidToken => write!(f, "Could not validate credentials"),
            AppError::UserNotFound => write!(f, "User not found"),
            AppError::NotFound(entity) => write!(f, "{entity} not found"),
            AppError::Forbidden => write!(f, "Not authorized to access this resource"),
            AppError::Database(e) => write!(f, "database error: {e}"),
            AppError::PasswordHash(e) => write!(f, "password hashing error: {e}"),
            AppError::Token(e) => write!(f, "token encoding error: {e}"),
            AppError::TokenLifetime => write!(f, "token lifetime out of range"),
            AppError::Task(e) => write!(f, "background task failed: {e}"),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail
            | AppError::DuplicateExternalId
            | AppError::DuplicateTagName => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Database(_)
            | AppError::PasswordHash(_)
            | AppError::Token(_)
            | AppError::TokenLifetime
            | AppError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{self}");
            return (
                status,
                Json(json!({ "detail": "Internal server error" })),
            )
                .into_response();
        }

        let body = Json(json!({ "detail": self.to_string() }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::Token(e)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Task(e)
    }
}
