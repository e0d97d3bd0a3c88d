//! Authentication endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use bazaar_core::types::User;

use crate::error::ApiError;
use crate::services::AccountService;
use crate::state::AppState;

// =============================================================================
// Request / Response Bodies
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user. The password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// =============================================================================
// Routes
// =============================================================================

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = AccountService::new(state)
        .signup(&body.email, &body.username, &body.password)
        .await?;

    Ok(Json(user.into()))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let access_token = AccountService::new(state)
        .login(&body.email, &body.password)
        .await?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Tokens are stateless, so logout is an acknowledgement: the client
/// discards its token and the server has nothing to revoke.
async fn logout() -> Json<serde_json::Value> {
    Json(json!({ "message": "Successfully logged out" }))
}
