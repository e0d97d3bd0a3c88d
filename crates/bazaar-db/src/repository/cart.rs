//! # Cart Repository
//!
//! Database operations for carts and their lines.
//!
//! ## Transaction Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Why Every Method Takes a Connection                        │
//! │                                                                         │
//! │  A cart mutation is a read-modify-write sequence:                       │
//! │                                                                         │
//! │    begin tx                                                             │
//! │      get_by_user ──► read the cart (or insert one)                     │
//! │      find_line ────► read the existing quantity                        │
//! │      (cart math decides the new quantity)                               │
//! │      insert_line / set_line_quantity ──► write                         │
//! │      touch ────────► bump cart.updated_at                              │
//! │    commit                                                               │
//! │                                                                         │
//! │  Putting all of it on one transaction connection makes the sequence    │
//! │  atomic; concurrent mutations of the same cart serialize on SQLite's   │
//! │  single writer. UNIQUE(cart_id, item_id) is the backstop if two        │
//! │  first-adds of the same item race anyway.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{Cart, CartLine, Item};

/// Repository for cart database operations.
///
/// Unlike the catalog repositories, every method here takes an explicit
/// `&mut SqliteConnection`: cart operations always run inside a caller-owned
/// transaction, even reads (the read feeds the write that follows it).
#[derive(Debug, Clone)]
pub struct CartRepository {
    #[allow(dead_code)]
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    // ========================================================================
    // Carts
    // ========================================================================

    /// Fetches a user's cart, if they have one.
    pub async fn get_by_user(
        &self,
        conn: &mut SqliteConnection,
        user_id: &str,
    ) -> DbResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>(
            r#"
            SELECT id, user_id, created_at, updated_at
            FROM carts
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(cart)
    }

    /// Inserts a new cart.
    ///
    /// The UNIQUE index on `user_id` rejects a second cart for the same user.
    pub async fn insert(&self, conn: &mut SqliteConnection, cart: &Cart) -> DbResult<()> {
        debug!(cart_id = %cart.id, user_id = %cart.user_id, "Inserting cart");

        sqlx::query(
            r#"
            INSERT INTO carts (id, user_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&cart.id)
        .bind(&cart.user_id)
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Bumps a cart's `updated_at` timestamp.
    ///
    /// Called by every mutation so clients can tell when a cart last changed.
    pub async fn touch(
        &self,
        conn: &mut SqliteConnection,
        cart_id: &str,
        at: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query("UPDATE carts SET updated_at = ?2 WHERE id = ?1")
            .bind(cart_id)
            .bind(at)
            .execute(conn)
            .await?;

        Ok(())
    }

    // ========================================================================
    // Lines
    // ========================================================================

    /// Finds the line for a given item in a cart, if present.
    pub async fn find_line(
        &self,
        conn: &mut SqliteConnection,
        cart_id: &str,
        item_id: &str,
    ) -> DbResult<Option<CartLine>> {
        let line = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT id, cart_id, item_id, quantity, added_at
            FROM cart_items
            WHERE cart_id = ?1 AND item_id = ?2
            "#,
        )
        .bind(cart_id)
        .bind(item_id)
        .fetch_optional(conn)
        .await?;

        Ok(line)
    }

    /// Inserts a new cart line.
    pub async fn insert_line(&self, conn: &mut SqliteConnection, line: &CartLine) -> DbResult<()> {
        debug!(
            line_id = %line.id,
            cart_id = %line.cart_id,
            item_id = %line.item_id,
            quantity = line.quantity,
            "Inserting cart line"
        );

        sqlx::query(
            r#"
            INSERT INTO cart_items (id, cart_id, item_id, quantity, added_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&line.id)
        .bind(&line.cart_id)
        .bind(&line.item_id)
        .bind(line.quantity)
        .bind(line.added_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Sets the quantity on an existing line.
    pub async fn set_line_quantity(
        &self,
        conn: &mut SqliteConnection,
        line_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        debug!(line_id = %line_id, quantity, "Updating cart line quantity");

        sqlx::query("UPDATE cart_items SET quantity = ?2 WHERE id = ?1")
            .bind(line_id)
            .bind(quantity)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Deletes a line.
    pub async fn delete_line(&self, conn: &mut SqliteConnection, line_id: &str) -> DbResult<()> {
        debug!(line_id = %line_id, "Deleting cart line");

        sqlx::query("DELETE FROM cart_items WHERE id = ?1")
            .bind(line_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Deletes all lines of a cart. Returns the number of lines removed.
    ///
    /// Zero is a normal outcome: clearing an empty cart removes nothing.
    pub async fn clear_lines(&self, conn: &mut SqliteConnection, cart_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1")
            .bind(cart_id)
            .execute(conn)
            .await?;

        debug!(cart_id = %cart_id, removed = result.rows_affected(), "Cleared cart lines");
        Ok(result.rows_affected())
    }

    /// Loads a cart's lines joined with their catalog items, in the order
    /// the lines were added.
    pub async fn lines_with_items(
        &self,
        conn: &mut SqliteConnection,
        cart_id: &str,
    ) -> DbResult<Vec<(CartLine, Item)>> {
        let rows = sqlx::query(
            r#"
            SELECT
                ci.id       AS line_id,
                ci.cart_id  AS line_cart_id,
                ci.item_id  AS line_item_id,
                ci.quantity AS line_quantity,
                ci.added_at AS line_added_at,
                i.id,
                i.name,
                i.description,
                i.price_cents,
                i.category,
                i.image_url,
                i.stock_quantity,
                i.created_at
            FROM cart_items ci
            INNER JOIN items i ON i.id = ci.item_id
            WHERE ci.cart_id = ?1
            ORDER BY ci.added_at, ci.rowid
            "#,
        )
        .bind(cart_id)
        .fetch_all(conn)
        .await?;

        rows.into_iter().map(from_joined_row).collect()
    }
}

/// Maps one joined row into its (line, item) pair.
fn from_joined_row(row: SqliteRow) -> DbResult<(CartLine, Item)> {
    let line = CartLine {
        id: row.try_get("line_id")?,
        cart_id: row.try_get("line_cart_id")?,
        item_id: row.try_get("line_item_id")?,
        quantity: row.try_get("line_quantity")?,
        added_at: row.try_get("line_added_at")?,
    };
    let item = Item {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price_cents: row.try_get("price_cents")?,
        category: row.try_get("category")?,
        image_url: row.try_get("image_url")?,
        stock_quantity: row.try_get("stock_quantity")?,
        created_at: row.try_get("created_at")?,
    };
    Ok((line, item))
}

// =============================================================================
// Unit Tests
// =============================================================================
