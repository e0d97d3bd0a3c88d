//! # bazaar-db: Database Layer for Bazaar
//!
//! This crate provides database access for the Bazaar backend.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (list_items, add_to_cart)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bazaar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (user/item/  │    │  (embedded)  │  │   │
//! │  │   │               │    │   cart)       │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ UserRepo      │    │ 001_init.sql │  │   │
//! │  │   │ Transactions  │    │ ItemRepo      │    │ ...          │  │   │
//! │  │   │ Health checks │    │ CartRepo      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (./bazaar.db, or :memory: in tests)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, configuration, transactions
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (user, item, cart)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/bazaar.db");
//! let db = Database::new(config).await?;
//!
//! // Reads go straight through the pool
//! let items = db.items().list(&ItemFilter::default()).await?;
//!
//! // Mutations run in a transaction
//! let mut tx = db.begin().await?;
//! db.users().insert(&mut tx, &user).await?;
//! db.carts().insert(&mut tx, &cart).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cart::CartRepository;
pub use repository::item::{ItemFilter, ItemRepository};
pub use repository::user::UserRepository;
