//! HTTP routes.
//!
//! ## Surface
//! ```text
//! POST   /auth/signup              register (creates the user's cart)
//! POST   /auth/login               exchange credentials for a JWT
//! POST   /auth/logout              stateless acknowledgement
//!
//! GET    /items                    filtered catalog listing
//! GET    /items/{item_id}          single item
//! POST   /items                    create item
//! GET    /categories               distinct categories
//!
//! GET    /cart                     current cart (auth)
//! POST   /cart/items               add item (auth)
//! PUT    /cart/items/{item_id}     set quantity, 0 removes (auth)
//! DELETE /cart/items/clear         empty the cart (auth)
//! DELETE /cart/items/{item_id}     remove one line (auth)
//!
//! GET    /health                   liveness probe
//! ```

pub mod auth;
pub mod cart;
pub mod items;

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Browser storefronts run on a different origin in development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .merge(auth::router())
        .merge(items::router())
        .merge(cart::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe, including a database round trip.
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = state.db.health_check().await;

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
    }))
}
