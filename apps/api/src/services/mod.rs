//! Application services.
//!
//! Each service owns one slice of the API surface and orchestrates
//! bazaar-core decisions with bazaar-db transactions:
//!
//! - [`account`] - signup, login, token issuance
//! - [`catalog`] - item listing, lookup, creation, categories
//! - [`cart`] - the per-user cart and its lines

pub mod account;
pub mod cart;
pub mod catalog;

pub use account::AccountService;
pub use cart::{CartService, CartView};
pub use catalog::CatalogService;
