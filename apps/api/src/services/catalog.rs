//! Catalog service: item listing, lookup, creation, categories.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use bazaar_core::types::Item;
use bazaar_core::validation::{
    validate_category, validate_item_name, validate_price_cents, validate_stock_quantity,
};
use bazaar_core::{CoreError, Money};
use bazaar_db::{DbError, ItemFilter};

use crate::error::ApiError;
use crate::state::AppState;

/// A catalog item to be created, before it has an id or timestamp.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub category: String,
    pub image_url: Option<String>,
    pub stock_quantity: i64,
}

/// Catalog service.
pub struct CatalogService {
    state: Arc<AppState>,
}

impl CatalogService {
    /// Create a new catalog service.
    pub fn new(state: Arc<AppState>) -> Self {
        CatalogService { state }
    }

    /// List items matching the filter.
    pub async fn list(&self, filter: &ItemFilter) -> Result<Vec<Item>, ApiError> {
        Ok(self.state.db.items().list(filter).await?)
    }

    /// Fetch a single item by id.
    pub async fn get(&self, item_id: &str) -> Result<Item, ApiError> {
        let item = self
            .state
            .db
            .items()
            .get_by_id(item_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        Ok(item)
    }

    /// Validate and insert a new catalog item.
    pub async fn create(&self, new: NewItem) -> Result<Item, ApiError> {
        validate_item_name(&new.name)?;
        validate_category(&new.category)?;
        validate_price_cents(new.price.cents())?;
        validate_stock_quantity(new.stock_quantity)?;

        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            description: new.description,
            price_cents: new.price.cents(),
            category: new.category,
            image_url: new.image_url,
            stock_quantity: new.stock_quantity,
            created_at: Utc::now(),
        };

        let mut tx = self.state.db.begin().await?;
        self.state.db.items().insert(&mut tx, &item).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(item_id = %item.id, name = %item.name, "Item created");
        Ok(item)
    }

    /// Distinct non-empty categories, sorted alphabetically.
    pub async fn categories(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.state.db.items().categories().await?)
    }
}
