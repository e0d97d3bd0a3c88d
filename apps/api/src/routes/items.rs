//! Catalog endpoints.
//!
//! Prices cross the API boundary as display floats ("199.99") and are
//! converted to exact cents at the edge; everything inside works in cents.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::types::Item;
use bazaar_core::Money;
use bazaar_db::ItemFilter;

use crate::error::ApiError;
use crate::services::catalog::NewItem;
use crate::services::CatalogService;
use crate::state::AppState;

// =============================================================================
// Request / Response Bodies
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
}

impl From<ListItemsQuery> for ItemFilter {
    fn from(query: ListItemsQuery) -> Self {
        ItemFilter {
            category: query.category,
            min_price_cents: query.min_price.map(|p| Money::from_display(p).cents()),
            max_price_cents: query.max_price.map(|p| Money::from_display(p).cents()),
            search: query.search,
            skip: query.skip,
            limit: query.limit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock_quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
    pub stock_quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        ItemResponse {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price().to_display(),
            category: item.category.clone(),
            image_url: item.image_url.clone(),
            stock_quantity: item.stock_quantity,
            created_at: item.created_at,
        }
    }
}

// =============================================================================
// Routes
// =============================================================================

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{item_id}", get(get_item))
        .route("/categories", get(list_categories))
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = CatalogService::new(state).list(&query.into()).await?;

    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item = CatalogService::new(state).get(&item_id).await?;

    Ok(Json(item.into()))
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item = CatalogService::new(state)
        .create(NewItem {
            name: body.name,
            description: body.description,
            price: Money::from_display(body.price),
            category: body.category,
            image_url: body.image_url,
            stock_quantity: body.stock_quantity,
        })
        .await?;

    Ok(Json(item.into()))
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let categories = CatalogService::new(state).categories().await?;

    Ok(Json(categories))
}
