//! # Domain Types
//!
//! Core domain types used throughout Bazaar.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     User        │   │      Item       │   │      Cart       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  email (unique) │   │  name           │   │  user_id (uniq) │       │
//! │  │  username       │   │  price_cents    │   │  created_at     │       │
//! │  │  password_hash  │   │  stock_quantity │   │  updated_at     │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                       │                │
//! │                                              ┌────────┴────────┐       │
//! │                                              │    CartLine     │       │
//! │                                              │  ─────────────  │       │
//! │                                              │  cart_id (FK)   │       │
//! │                                              │  item_id (FK)   │       │
//! │                                              │  quantity       │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These are the database row shapes: prices live as integer cents, ids as
//! UUID strings, timestamps as UTC. API-facing representations (float prices,
//! derived totals) are built from these at the edge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// User
// =============================================================================

/// A registered account.
///
/// `password_hash` is a PHC-format Argon2 hash and must never be serialized
/// out to clients; API response types carry only the public fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login identifier, unique across all accounts.
    pub email: String,

    /// Display name, also unique.
    pub username: String,

    /// Argon2 hash of the password. Never the plaintext.
    pub password_hash: String,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Item
// =============================================================================

/// A catalog item available for purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional longer description.
    pub description: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Category label used for filtered listings.
    pub category: String,

    /// Optional product image URL.
    pub image_url: Option<String>,

    /// Units currently available. Never NULL; unknown stock is 0.
    pub stock_quantity: i64,

    /// When the item was created.
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the item has any stock at all.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A user's active cart. One per user, created lazily on first add.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Cart {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning user. UNIQUE in the database: at most one cart per user.
    pub user_id: String,

    /// When the cart was created.
    pub created_at: DateTime<Utc>,

    /// Bumped on every mutation of the cart or its lines.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Cart Line
// =============================================================================

/// One distinct item within a cart.
///
/// The database enforces `UNIQUE(cart_id, item_id)`: adding an item that is
/// already present merges into this row's quantity instead of creating a
/// second line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Cart this line belongs to.
    pub cart_id: String,

    /// Catalog item referenced by this line.
    pub item_id: String,

    /// Units of the item in the cart. Always >= 1 once stored.
    pub quantity: i64,

    /// When the item was first added to the cart. Merging more units into
    /// the line does not change it.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Line subtotal for a given unit price, exact in cents.
    #[inline]
    pub fn subtotal(&self, unit_price: Money) -> Money {
        unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
