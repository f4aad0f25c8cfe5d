use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::constants::ALLOWED_CHAT_METHODS;
use crate::shared::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Database connection error")]
    DatabaseConnection(sqlx::Error),

    #[error("Entity metadata error")]
    DatabaseSchema(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Method {method} Not Allowed")]
    MethodNotAllowed { method: String },

    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Classify store-layer failures into the stable taxonomy. Connection and
/// schema problems keep their own variants so they surface with the fixed
/// messages; everything else stays unclassified.
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => AppError::DatabaseConnection(e),
            sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::TypeNotFound { .. } => AppError::DatabaseSchema(e),
            other => AppError::Database(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::DatabaseConnection(ref e) => {
                tracing::error!("Database connection error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database connection error".to_string(),
                )
            }
            AppError::DatabaseSchema(ref e) => {
                tracing::error!("Entity metadata error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Entity metadata error".to_string(),
                )
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MethodNotAllowed { ref method } => {
                let allow = HeaderValue::from_str(&ALLOWED_CHAT_METHODS.join(", "))
                    .unwrap_or_else(|_| HeaderValue::from_static("DELETE, PUT"));
                let body = Json(ErrorResponse::new(format!("Method {} Not Allowed", method)));
                return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, allow)], body)
                    .into_response();
            }
            AppError::Configuration(ref msg) => {
                tracing::error!("Missing configuration: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Upstream(ref msg) => {
                tracing::error!("Upstream error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
