// src/common/error.rs

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::fulfillment::FulfillmentState;

/// Taxonomy bucket of an [`AppError`]. Callers decide retry policy from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    StateConflict,
    Auth,
    Persistence,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Body, query string or path segment that could not be parsed at all.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    // --- Not found ---
    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    #[error("Item is not active: {0}")]
    ItemInactive(i64),

    #[error("Fulfillment unit not found: {0}")]
    UnitNotFound(i64),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Image not found: {0}")]
    ImageNotFound(i64),

    // --- State conflicts ---
    #[error("Invalid transition for unit {unit_id}: {from} -> {to}")]
    InvalidTransition {
        unit_id: i64,
        from: FulfillmentState,
        to: FulfillmentState,
    },

    #[error("Insufficient stock while allocating item {0}")]
    InsufficientStock(i64),

    #[error("Item {0} is still referenced by fulfillment units")]
    ItemInUse(i64),

    // --- Auth ---
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Admin access required")]
    Forbidden,

    // --- Infrastructure ---
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationError(_) | AppError::MalformedRequest(_) => ErrorKind::Validation,
            AppError::ItemNotFound(_)
            | AppError::ItemInactive(_)
            | AppError::UnitNotFound(_)
            | AppError::OrderNotFound(_)
            | AppError::ImageNotFound(_) => ErrorKind::NotFound,
            AppError::InvalidTransition { .. }
            | AppError::InsufficientStock(_)
            | AppError::ItemInUse(_) => ErrorKind::StateConflict,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::Forbidden => {
                ErrorKind::Auth
            }
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => ErrorKind::Persistence,
        }
    }

    /// Stable machine-readable code sent in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::MalformedRequest(_) => "VALIDATION_ERROR",
            AppError::ItemNotFound(_) => "ITEM_NOT_FOUND",
            AppError::ItemInactive(_) => "ITEM_INACTIVE",
            AppError::UnitNotFound(_) => "UNIT_NOT_FOUND",
            AppError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            AppError::ImageNotFound(_) => "IMAGE_NOT_FOUND",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            AppError::ItemInUse(_) => "ITEM_IN_USE",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::Forbidden => "FORBIDDEN",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidToken | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            _ => match self.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::StateConflict => StatusCode::CONFLICT,
                ErrorKind::Auth => StatusCode::UNAUTHORIZED,
                ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match &self {
            // Per-field messages so the client can highlight inputs.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": code,
                    "message": "One or more fields are invalid.",
                    "details": details,
                })
            }
            e if e.kind() == ErrorKind::Persistence => {
                tracing::error!(error = %e, "internal server error");
                json!({ "error": code, "message": "An unexpected error occurred." })
            }
            e => json!({ "error": code, "message": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

// Extractor rejections, used through `WithRejection<_, AppError>` so clients
// always get the JSON error body.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}
