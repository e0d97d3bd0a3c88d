//! Cart endpoints. All of them require a bearer token.
//!
//! Route order matters for the DELETE pair: `/cart/items/clear` is a
//! static segment and wins over `/cart/items/{item_id}`, so "clear" can
//! never be mistaken for an item id.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::services::{CartService, CartView};
use crate::state::AppState;

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub item_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

// =============================================================================
// Routes
// =============================================================================

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cart", get(get_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/clear", delete(clear_cart))
        .route(
            "/cart/items/{item_id}",
            axum::routing::put(update_item).delete(remove_item),
        )
}

async fn get_cart(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CartView>, ApiError> {
    let cart = CartService::new(state).view(&user.id).await?;

    Ok(Json(cart))
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cart = CartService::new(state)
        .add_item(&user.id, &body.item_id, body.quantity)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Item added to cart",
        "cart": cart,
    })))
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<String>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    let cart = CartService::new(state)
        .update_item(&user.id, &item_id, body.quantity)
        .await?;

    Ok(Json(cart))
}

async fn remove_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    CartService::new(state).remove_item(&user.id, &item_id).await?;

    Ok(Json(json!({ "message": "Item removed from cart" })))
}

async fn clear_cart(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cleared = CartService::new(state).clear(&user.id).await?;

    let message = if cleared {
        "Cart cleared successfully"
    } else {
        "Cart is already empty"
    };

    Ok(Json(json!({ "message": message })))
}
