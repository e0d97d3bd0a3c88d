//! # bazaar-core: Pure Business Logic for Bazaar
//!
//! This crate is the **heart** of Bazaar. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP Clients                                 │   │
//! │  │    Signup ──► Browse catalog ──► Manage cart                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    signup, login, list_items, add_to_cart, update_quantity      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │ User Item │  │   Money   │  │ add/update│  │   rules   │  │   │
//! │  │   │ Cart Line │  │   cents   │  │  totals   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bazaar-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Item, Cart, CartLine)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart mutation decisions and totals
//! - [`error`] - Domain error types
//! - [`validation`] - Field and business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::money::Money;
//!
//! // A price arrives as 199.99 from a request body and is converted
//! // to cents exactly once, at the boundary:
//! let price = Money::from_display(199.99);
//! assert_eq!(price.cents(), 19999);
//!
//! // From here on everything is exact integer arithmetic:
//! let total: Money = price * 3;
//! assert_eq!(total.to_display(), 599.97);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bazaar_core::Money` instead of
// `use bazaar_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Minimum password length enforced at signup.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum quantity of a single item in a cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Stock ceilings usually bind first; this is the absolute upper bound.
pub const MAX_ITEM_QUANTITY: i64 = 999;
