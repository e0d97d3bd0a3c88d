//! Request extractors.
//!
//! [`CurrentUser`] turns a `Bearer` token into the authenticated user row.
//! Handlers that take it as an argument are authenticated; everything else
//! is public.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use bazaar_core::types::User;

use crate::auth::extract_bearer_token;
use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated user, loaded from the bearer token's subject.
///
/// ## Usage
/// ```rust,ignore
/// async fn get_cart(
///     State(state): State<Arc<AppState>>,
///     CurrentUser(user): CurrentUser,
/// ) -> Result<Json<CartView>, ApiError> { ... }
/// ```
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let claims = state.jwt.validate_token(token)?;

        // The subject is the user's email; the account may have been
        // deleted since the token was issued.
        let user = state
            .db
            .users()
            .get_by_email(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Could not validate credentials".to_string()))?;

        Ok(CurrentUser(user))
    }
}
