//! # Cart Math
//!
//! Pure decision logic for cart mutations and totals.
//!
//! ## Where This Fits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operation Flow                                  │
//! │                                                                         │
//! │  HTTP handler                 THIS MODULE               bazaar-db       │
//! │  ────────────                 ───────────               ─────────       │
//! │                                                                         │
//! │  POST /cart/add ────────────► resolve_add() ──────────► upsert line     │
//! │                                                                         │
//! │  PUT /cart/items/{id} ──────► resolve_update() ───────► set / delete    │
//! │                                                                         │
//! │  GET /cart ─────────────────► totals() ───────────────► (read only)     │
//! │                                                                         │
//! │  The functions here never touch the database: callers load the item     │
//! │  and the existing line, ask this module what should happen, and then    │
//! │  apply the answer inside their transaction.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - A stored line always has quantity >= 1 (updates to 0 become removals)
//! - A line's quantity never exceeds the item's stock at decision time
//! - Stock is a ceiling on the TOTAL line quantity, not on the delta:
//!   adding 5 to an existing 48 is checked as 53 against stock

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartLine, Item};
use crate::validation::validate_quantity;

// =============================================================================
// Mutation Decisions
// =============================================================================

/// The outcome of a quantity update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// Store this quantity on the line.
    Set(i64),
    /// Remove the line entirely (requested quantity was zero).
    Remove,
}

/// Decides the new line quantity for an add-to-cart request.
///
/// ## Arguments
/// * `item` - The catalog item being added
/// * `existing_qty` - Quantity already on the user's line for this item
///   (0 if the item is not in the cart yet)
/// * `requested` - Units the user wants to add on top
///
/// ## Returns
/// The merged quantity to store on the line.
///
/// ## Errors
/// - [`CoreError::NonPositiveQuantity`] if `requested <= 0`
/// - [`CoreError::OutOfStock`] if the item has zero stock
/// - [`CoreError::Validation`] if the merged quantity exceeds
///   [`MAX_ITEM_QUANTITY`](crate::MAX_ITEM_QUANTITY)
/// - [`CoreError::InsufficientStock`] if `existing + requested` exceeds stock
///
/// ## Example
/// ```rust
/// use bazaar_core::cart::resolve_add;
/// # use bazaar_core::types::Item;
/// # use chrono::Utc;
/// # let item = Item {
/// #     id: "i".into(), name: "Headphones".into(), description: None,
/// #     price_cents: 19999, category: "Electronics".into(), image_url: None,
/// #     stock_quantity: 50, created_at: Utc::now(),
/// # };
/// assert_eq!(resolve_add(&item, 0, 3).unwrap(), 3);
/// assert_eq!(resolve_add(&item, 3, 2).unwrap(), 5);
/// assert!(resolve_add(&item, 3, 48).is_err()); // 51 > 50
/// ```
pub fn resolve_add(item: &Item, existing_qty: i64, requested: i64) -> CoreResult<i64> {
    if requested <= 0 {
        return Err(CoreError::NonPositiveQuantity);
    }

    if !item.in_stock() {
        return Err(CoreError::OutOfStock(item.name.clone()));
    }

    // Saturate instead of wrapping: an absurd request must fail the
    // range check below, never panic or slip past the stock ceiling.
    let merged = existing_qty.saturating_add(requested);
    validate_quantity(merged)?;

    if merged > item.stock_quantity {
        return Err(CoreError::InsufficientStock {
            item: item.name.clone(),
            available: item.stock_quantity,
            requested: merged,
        });
    }

    Ok(merged)
}

/// Decides what to do with a line when the user sets an absolute quantity.
///
/// Unlike [`resolve_add`], the requested value REPLACES the line quantity,
/// and zero is meaningful: it removes the line.
///
/// ## Errors
/// - [`CoreError::NegativeQuantity`] if `requested < 0`
/// - [`CoreError::Validation`] if `requested` exceeds
///   [`MAX_ITEM_QUANTITY`](crate::MAX_ITEM_QUANTITY)
/// - [`CoreError::InsufficientStock`] if `requested` exceeds stock
pub fn resolve_update(item: &Item, requested: i64) -> CoreResult<LineChange> {
    if requested < 0 {
        return Err(CoreError::NegativeQuantity);
    }

    if requested == 0 {
        return Ok(LineChange::Remove);
    }

    validate_quantity(requested)?;

    if requested > item.stock_quantity {
        return Err(CoreError::InsufficientStock {
            item: item.name.clone(),
            available: item.stock_quantity,
            requested,
        });
    }

    Ok(LineChange::Set(requested))
}

// =============================================================================
// Totals
// =============================================================================

/// Aggregates over a cart's lines, computed fresh on every read.
///
/// Totals are never stored: the lines are the single source of truth and
/// these numbers are derived from them, so they cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of line quantities (3 units of one item counts as 3).
    pub total_items: i64,
    /// Sum of line subtotals, exact in cents.
    pub total_price: Money,
}

/// Computes cart totals from joined (line, item) pairs.
///
/// ## Example
/// ```text
/// 3 × 199.99 + 1 × 49.99
///   = 59997 + 4999 cents
///   = 64996 cents
///   = 649.96 exactly (no float drift)
/// ```
pub fn totals(lines: &[(CartLine, Item)]) -> CartTotals {
    let total_items = lines.iter().map(|(line, _)| line.quantity).sum();
    let total_price = lines
        .iter()
        .map(|(line, item)| line.subtotal(item.price()))
        .sum();

    CartTotals {
        total_items,
        total_price,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
