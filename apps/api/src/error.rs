//! API error types and HTTP response mapping.
//!
//! Every handler and service returns [`ApiError`]; the [`IntoResponse`]
//! impl turns it into a JSON body of the form `{"detail": "..."}` with
//! the matching status code. Conflicts surface as 400 so clients can
//! treat every rejected input the same way.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use bazaar_core::{CoreError, ValidationError};
use bazaar_db::DbError;

// =============================================================================
// Error Type
// =============================================================================

/// User-facing API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or rule-violating input (400).
    #[error("{0}")]
    BadRequest(String),

    /// Missing, invalid, or expired credentials (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Requested resource does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// The request collides with existing state, e.g. a taken email (400).
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure; details are logged, never sent to the client (500).
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(msg) | ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ApiError::NotFound(format!("{entity} not found")),
            // Lost races on unique columns (signup, first add of an item)
            // surface as a client error rather than a 500.
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(_) => ApiError::NotFound("Item not found".to_string()),
            CoreError::OutOfStock(_) => ApiError::BadRequest("Item is out of stock".to_string()),
            CoreError::InsufficientStock { available, .. } => {
                ApiError::BadRequest(format!("Only {available} items available in stock"))
            }
            CoreError::LineNotFound(_) => ApiError::NotFound("Item not found in cart".to_string()),
            CoreError::NonPositiveQuantity => {
                ApiError::BadRequest("Quantity must be greater than 0".to_string())
            }
            CoreError::NegativeQuantity => {
                ApiError::BadRequest("Quantity cannot be negative".to_string())
            }
            CoreError::Validation(v) => v.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err: ApiError = CoreError::InsufficientStock {
            item: "Headphones".to_string(),
            available: 50,
            requested: 51,
        }
        .into();

        match err {
            ApiError::BadRequest(msg) => {
                assert_eq!(msg, "Only 50 items available in stock");
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_db_not_found_maps_to_404() {
        let err: ApiError = DbError::not_found("Item", "abc").into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_quantity_errors_map_to_400() {
        let err: ApiError = CoreError::NonPositiveQuantity.into();
        match err {
            ApiError::BadRequest(msg) => assert_eq!(msg, "Quantity must be greater than 0"),
            other => panic!("expected BadRequest, got {other:?}"),
        }

        let err: ApiError = CoreError::NegativeQuantity.into();
        match err {
            ApiError::BadRequest(msg) => assert_eq!(msg, "Quantity cannot be negative"),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }
}
