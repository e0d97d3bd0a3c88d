//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bazaar-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  API errors (in app)                                                   │
//! │  └── ApiError         - What clients see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item name, quantities, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item cannot be found in the catalog.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Item exists but has zero stock.
    ///
    /// Distinct from [`CoreError::InsufficientStock`] so the API can say
    /// "out of stock" rather than "only 0 available".
    #[error("Item is out of stock: {0}")]
    OutOfStock(String),

    /// Requested quantity exceeds available stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5, already in cart: 48)
    ///      │
    ///      ▼
    /// Check stock: available=50
    ///      │
    ///      ▼
    /// InsufficientStock { item: "Headphones", available: 50, requested: 53 }
    ///      │
    ///      ▼
    /// Client shows: "Only 50 items available in stock"
    /// ```
    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        available: i64,
        requested: i64,
    },

    /// Cart line for the given item does not exist.
    #[error("Item not in cart: {0}")]
    LineNotFound(String),

    /// Quantity must be strictly positive for this operation.
    #[error("Quantity must be greater than 0")]
    NonPositiveQuantity,

    /// Quantity may not be negative for this operation.
    #[error("Quantity cannot be negative")]
    NegativeQuantity,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed email address).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., email already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            item: "Wireless Headphones".to_string(),
            available: 50,
            requested: 53,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Wireless Headphones: available 50, requested 53"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        };
        assert_eq!(err.to_string(), "username must be at least 3 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
