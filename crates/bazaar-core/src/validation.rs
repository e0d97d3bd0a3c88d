//! # Validation Module
//!
//! Input validation utilities for Bazaar.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field and business rule validation                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (email, username, cart lines)                  │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::validation::{validate_email, validate_quantity};
//!
//! assert!(validate_email("ada@example.com").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Account Validators
// =============================================================================

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Must contain one `@` with a non-empty local part and a domain
///   containing at least one dot
///
/// Deliberately loose: the point is to reject obvious typos, not to
/// re-implement RFC 5322.
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_email;
///
/// assert!(validate_email("ada@example.com").is_ok());
/// assert!(validate_email("not-an-email").is_err());
/// assert!(validate_email("@example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a username.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 3 and 50 characters
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: MIN_USERNAME_LENGTH,
        });
    }

    if username.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    Ok(())
}

/// Validates a plaintext password before hashing.
///
/// ## Rules
/// - Must be at least 6 characters
///
/// No upper bound here; Argon2 handles arbitrary input lengths.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates an item name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a category label.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    let category = category.trim();

    if category.is_empty() {
        return Err(ValidationError::Required {
            field: "category".to_string(),
        });
    }

    if category.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());  // 10.99
/// assert!(validate_price_cents(0).is_ok());     // Free item
/// assert!(validate_price_cents(-100).is_err()); // Invalid
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock quantity for item creation.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero means "out of stock", not unknown
pub fn validate_stock_quantity(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock_quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a quantity for adding to a cart.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.co").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("user@.com").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ada").is_ok());
        assert!(validate_username("ada_lovelace").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter2!").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Wireless Headphones").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_stock_quantity() {
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(50).is_ok());
        assert!(validate_stock_quantity(-5).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(1000).is_err());
    }
}
