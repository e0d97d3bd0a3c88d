//! # Item Repository
//!
//! Database operations for the product catalog.
//!
//! ## Filtered Listing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Filtered Listing Works                           │
//! │                                                                         │
//! │  GET /items?category=Electronics&min_price=10&search=head               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ItemFilter { category, min_price_cents, search, skip, limit }          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  QueryBuilder appends one AND clause per present filter:               │
//! │                                                                         │
//! │  SELECT ... FROM items WHERE 1=1                                        │
//! │    AND category = ?         (exact match)                               │
//! │    AND price_cents >= ?     (inclusive)                                 │
//! │    AND name LIKE '%head%'   (substring)                                 │
//! │  ORDER BY created_at, rowid                                             │
//! │  LIMIT ? OFFSET ?                                                       │
//! │                                                                         │
//! │  Absent filters add no clause; all values go through bind parameters.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::Item;

/// Filters for catalog listing. All fields optional; absent means "no filter".
///
/// Price bounds are inclusive on both ends, in cents.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Exact category match.
    pub category: Option<String>,

    /// Minimum price in cents (inclusive).
    pub min_price_cents: Option<i64>,

    /// Maximum price in cents (inclusive).
    pub max_price_cents: Option<i64>,

    /// Case-insensitive substring match on the item name.
    pub search: Option<String>,

    /// Rows to skip (pagination offset). None means 0.
    pub skip: Option<i64>,

    /// Maximum rows to return. None means 100.
    pub limit: Option<i64>,
}

/// Default page size when the caller does not specify a limit.
const DEFAULT_LIMIT: i64 = 100;

/// Repository for item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.items();
///
/// // Filtered listing
/// let filter = ItemFilter { category: Some("Electronics".into()), ..Default::default() };
/// let items = repo.list(&filter).await?;
///
/// // Get by ID
/// let item = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists items matching the filter, in stable insertion order.
    ///
    /// Filters compose with AND: an item must satisfy every present filter
    /// to appear in the result. An empty filter returns the first page of
    /// the whole catalog.
    pub async fn list(&self, filter: &ItemFilter) -> DbResult<Vec<Item>> {
        debug!(?filter, "Listing items");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, name, description, price_cents, category, image_url, \
             stock_quantity, created_at \
             FROM items WHERE 1=1",
        );

        if let Some(category) = &filter.category {
            qb.push(" AND category = ").push_bind(category);
        }
        if let Some(min) = filter.min_price_cents {
            qb.push(" AND price_cents >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price_cents {
            qb.push(" AND price_cents <= ").push_bind(max);
        }
        if let Some(search) = &filter.search {
            // LIKE is case-insensitive for ASCII in SQLite
            qb.push(" AND name LIKE ").push_bind(format!("%{search}%"));
        }

        // rowid breaks ties between items created in the same instant
        qb.push(" ORDER BY created_at, rowid");
        qb.push(" LIMIT ").push_bind(filter.limit.unwrap_or(DEFAULT_LIMIT));
        qb.push(" OFFSET ").push_bind(filter.skip.unwrap_or(0));

        let items = qb
            .build_query_as::<Item>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), "Listing returned items");
        Ok(items)
    }

    /// Fetches an item by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, price_cents, category, image_url,
                   stock_quantity, created_at
            FROM items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Inserts a new catalog item.
    pub async fn insert(&self, conn: &mut SqliteConnection, item: &Item) -> DbResult<()> {
        debug!(item_id = %item.id, name = %item.name, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items
                (id, name, description, price_cents, category, image_url,
                 stock_quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price_cents)
        .bind(&item.category)
        .bind(&item.image_url)
        .bind(item.stock_quantity)
        .bind(item.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Returns the distinct category labels present in the catalog.
    pub async fn categories(&self) -> DbResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT category
            FROM items
            WHERE category <> ''
            ORDER BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
