//! # Bazaar API
//!
//! HTTP server for the Bazaar storefront.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          API Server                                     │
//! │                                                                         │
//! │  Client ───► HTTP (8000) ───► routes ───► services ───► bazaar-db      │
//! │                                  │            │                         │
//! │                                  │            ▼                         │
//! │                                  │       bazaar-core                    │
//! │                                  │    (cart math, money,                │
//! │                                  ▼        validation)                   │
//! │                          CurrentUser extractor                          │
//! │                            (JWT bearer auth)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Routes parse requests and shape responses; services own transactions
//! and call into bazaar-core for every business decision. The binary in
//! `main.rs` wires configuration, the database, and graceful shutdown
//! around [`routes::build_router`].

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
