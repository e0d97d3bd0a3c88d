//! # Repository Module
//!
//! Database repository implementations for Bazaar.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service Layer                                                         │
//! │       │                                                                 │
//! │       │  db.items().list(&filter)                                      │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ItemRepository                                                        │
//! │  ├── list(&self, filter)                                               │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, item)                                               │
//! │  └── categories(&self)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Write methods take a connection, so services control transactions   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Account lookups and creation
//! - [`item::ItemRepository`] - Catalog CRUD and filtered listing
//! - [`cart::CartRepository`] - Cart and cart line operations

pub mod cart;
pub mod item;
pub mod user;
