//! Error handling for the Retail Sales Tracker
//!
//! All errors are rendered as a uniform JSON envelope; internal details are
//! logged but never leaked to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate {field}")]
    DuplicateKey { field: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Sale lifecycle errors
    #[error("Invalid status transition: {0}")]
    InvalidStatusTransition(String),

    #[error("Sales can only be cancelled within 24 hours of creation")]
    CancellationWindowExpired,

    #[error("Cannot refund more items than purchased: {0}")]
    RefundQuantityExceeded(String),

    #[error("Refund item not found in sale: {0}")]
    RefundItemNotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }

    fn with_field(code: &str, message: impl Into<String>, field: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: Some(field.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_CREDENTIALS", "Invalid username or password"),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", msg.clone()),
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new("FORBIDDEN", msg.clone()),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::with_field("VALIDATION_ERROR", message.clone(), field),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg.clone()),
            ),
            AppError::DuplicateKey { field } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::with_field(
                    "DUPLICATE_KEY",
                    format!("A record with this {} already exists", field),
                    field,
                ),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::InvalidStatusTransition(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("INVALID_STATUS_TRANSITION", msg.clone()),
            ),
            AppError::CancellationWindowExpired => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("CANCELLATION_WINDOW_EXPIRED", self.to_string()),
            ),
            AppError::RefundQuantityExceeded(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "REFUND_QUANTITY_EXCEEDED",
                    format!("Cannot refund more items than purchased: {}", msg),
                ),
            ),
            AppError::RefundItemNotFound(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "REFUND_ITEM_NOT_FOUND",
                    format!("Refund item not found in sale: {}", msg),
                ),
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(_) | AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
