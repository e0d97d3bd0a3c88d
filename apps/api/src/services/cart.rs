//! Cart service: the per-user cart and its lines.
//!
//! ## Transaction Shape
//! ```text
//! POST /cart/items
//!      │
//!      ▼
//! load item (pool) ──► begin tx ──► get-or-create cart
//!                                       │
//!                                       ▼
//!                              find line, resolve_add()
//!                                       │
//!                                       ▼
//!                          upsert line, touch cart, reload lines
//!                                       │
//!                                       ▼
//!                                    commit
//! ```
//!
//! Item lookups that do not need transactional consistency happen on the
//! pool BEFORE `begin()`. In-memory test databases run with a single
//! connection, so a pool read while a transaction is open would block
//! forever; everything after `begin()` goes through the transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use bazaar_core::cart::{resolve_add, resolve_update, totals, LineChange};
use bazaar_core::types::{Cart, CartLine, Item};
use bazaar_core::CoreError;
use bazaar_db::DbError;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// One cart line joined with its catalog item, ready for JSON.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: String,
    pub item_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub image_url: Option<String>,
    pub subtotal: f64,
}

/// The full cart as returned by every cart endpoint.
///
/// Totals are derived from the lines on every read; they are never stored.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: String,
    pub user_id: String,
    pub items: Vec<CartLineView>,
    pub total_items: i64,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Service
// =============================================================================

/// Cart service.
pub struct CartService {
    state: Arc<AppState>,
}

impl CartService {
    /// Create a new cart service.
    pub fn new(state: Arc<AppState>) -> Self {
        CartService { state }
    }

    /// Load the user's cart with lines and totals, creating it if missing.
    pub async fn view(&self, user_id: &str) -> Result<CartView, ApiError> {
        let mut tx = self.state.db.begin().await?;

        let cart = self.get_or_create(&mut tx, user_id).await?;
        let lines = self.state.db.carts().lines_with_items(&mut tx, &cart.id).await?;

        tx.commit().await.map_err(DbError::from)?;

        Ok(render(cart, &lines))
    }

    /// Add `quantity` units of an item, merging into an existing line.
    pub async fn add_item(
        &self,
        user_id: &str,
        item_id: &str,
        quantity: i64,
    ) -> Result<CartView, ApiError> {
        if quantity <= 0 {
            return Err(CoreError::NonPositiveQuantity.into());
        }

        // Pool read, deliberately before begin().
        let item = self
            .state
            .db
            .items()
            .get_by_id(item_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        let mut tx = self.state.db.begin().await?;

        let mut cart = self.get_or_create(&mut tx, user_id).await?;
        let existing = self
            .state
            .db
            .carts()
            .find_line(&mut tx, &cart.id, item_id)
            .await?;

        let existing_qty = existing.as_ref().map_or(0, |line| line.quantity);
        let merged = resolve_add(&item, existing_qty, quantity)?;

        match existing {
            Some(line) => {
                self.state
                    .db
                    .carts()
                    .set_line_quantity(&mut tx, &line.id, merged)
                    .await?;
            }
            None => {
                let line = CartLine {
                    id: Uuid::new_v4().to_string(),
                    cart_id: cart.id.clone(),
                    item_id: item.id.clone(),
                    quantity: merged,
                    added_at: Utc::now(),
                };
                // A concurrent first-add of the same item trips the
                // UNIQUE(cart_id, item_id) index; the loser gets a 400.
                self.state.db.carts().insert_line(&mut tx, &line).await?;
            }
        }

        let touched_at = Utc::now();
        self.state.db.carts().touch(&mut tx, &cart.id, touched_at).await?;
        let lines = self.state.db.carts().lines_with_items(&mut tx, &cart.id).await?;

        tx.commit().await.map_err(DbError::from)?;

        // The row loaded above predates touch(); keep the view in sync
        // with what was just stored.
        cart.updated_at = touched_at;

        info!(user_id, item_id, quantity, merged, "Item added to cart");
        Ok(render(cart, &lines))
    }

    /// Set the absolute quantity of a line. Zero removes the line.
    pub async fn update_item(
        &self,
        user_id: &str,
        item_id: &str,
        quantity: i64,
    ) -> Result<CartView, ApiError> {
        if quantity < 0 {
            return Err(CoreError::NegativeQuantity.into());
        }

        let mut tx = self.state.db.begin().await?;

        let mut cart = self
            .state
            .db
            .carts()
            .get_by_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", user_id))?;

        // The joined load doubles as the item lookup; the FK guarantees
        // every line still has its item.
        let lines = self.state.db.carts().lines_with_items(&mut tx, &cart.id).await?;

        let (line, item) = lines
            .iter()
            .find(|(line, _)| line.item_id == item_id)
            .ok_or_else(|| CoreError::LineNotFound(item_id.to_string()))?;

        match resolve_update(item, quantity)? {
            LineChange::Remove => {
                debug!(line_id = %line.id, "Quantity set to 0, removing line");
                self.state.db.carts().delete_line(&mut tx, &line.id).await?;
            }
            LineChange::Set(qty) => {
                self.state
                    .db
                    .carts()
                    .set_line_quantity(&mut tx, &line.id, qty)
                    .await?;
            }
        }

        let touched_at = Utc::now();
        self.state.db.carts().touch(&mut tx, &cart.id, touched_at).await?;
        let lines = self.state.db.carts().lines_with_items(&mut tx, &cart.id).await?;

        tx.commit().await.map_err(DbError::from)?;

        cart.updated_at = touched_at;

        info!(user_id, item_id, quantity, "Cart line updated");
        Ok(render(cart, &lines))
    }

    /// Remove an item's line from the cart entirely.
    pub async fn remove_item(&self, user_id: &str, item_id: &str) -> Result<(), ApiError> {
        let mut tx = self.state.db.begin().await?;

        let cart = self
            .state
            .db
            .carts()
            .get_by_user(&mut tx, user_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", user_id))?;

        let line = self
            .state
            .db
            .carts()
            .find_line(&mut tx, &cart.id, item_id)
            .await?
            .ok_or_else(|| CoreError::LineNotFound(item_id.to_string()))?;

        self.state.db.carts().delete_line(&mut tx, &line.id).await?;
        self.state.db.carts().touch(&mut tx, &cart.id, Utc::now()).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(user_id, item_id, "Item removed from cart");
        Ok(())
    }

    /// Remove every line from the user's cart.
    ///
    /// Returns `true` when there was an existing cart to clear. A missing
    /// cart is created empty instead, so the operation always succeeds.
    pub async fn clear(&self, user_id: &str) -> Result<bool, ApiError> {
        let mut tx = self.state.db.begin().await?;

        let existing = self.state.db.carts().get_by_user(&mut tx, user_id).await?;

        let cleared = match existing {
            Some(cart) => {
                let removed = self.state.db.carts().clear_lines(&mut tx, &cart.id).await?;
                self.state.db.carts().touch(&mut tx, &cart.id, Utc::now()).await?;
                info!(user_id, removed, "Cart cleared");
                true
            }
            None => {
                let now = Utc::now();
                let cart = Cart {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                self.state.db.carts().insert(&mut tx, &cart).await?;
                false
            }
        };

        tx.commit().await.map_err(DbError::from)?;
        Ok(cleared)
    }

    /// Load the user's cart, creating an empty one on first touch.
    async fn get_or_create(
        &self,
        conn: &mut SqliteConnection,
        user_id: &str,
    ) -> Result<Cart, ApiError> {
        if let Some(cart) = self.state.db.carts().get_by_user(conn, user_id).await? {
            return Ok(cart);
        }

        let now = Utc::now();
        let cart = Cart {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.state.db.carts().insert(conn, &cart).await?;
        debug!(user_id, cart_id = %cart.id, "Created cart on first use");
        Ok(cart)
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Build the JSON view from a cart and its joined lines.
fn render(cart: Cart, lines: &[(CartLine, Item)]) -> CartView {
    let computed = totals(lines);

    let items = lines
        .iter()
        .map(|(line, item)| CartLineView {
            id: line.id.clone(),
            item_id: item.id.clone(),
            name: item.name.clone(),
            price: item.price().to_display(),
            quantity: line.quantity,
            image_url: item.image_url.clone(),
            subtotal: line.subtotal(item.price()).to_display(),
        })
        .collect();

    CartView {
        id: cart.id,
        user_id: cart.user_id,
        items,
        total_items: computed.total_items,
        total_price: computed.total_price.to_display(),
        created_at: cart.created_at,
        updated_at: cart.updated_at,
    }
}
