//! Account service: signup, login, token issuance.
//!
//! ## Signup Flow
//! ```text
//! validate input ──► check email/username taken ──► hash password
//!      │                                                 │
//!      ▼                                                 ▼
//!   400 on bad input                  one transaction: insert user + cart
//! ```
//!
//! Every user owns exactly one cart, created together with the account so
//! cart endpoints never have to special-case brand-new users.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use bazaar_core::types::{Cart, User};
use bazaar_core::validation::{validate_email, validate_password, validate_username};
use bazaar_db::DbError;

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;

/// Message for both "email taken" and "username taken", so a caller
/// cannot probe which of the two collided.
const ALREADY_REGISTERED: &str = "Email or username already registered";

/// Message for both "no such user" and "wrong password".
const BAD_CREDENTIALS: &str = "Incorrect email or password";

/// Account service.
pub struct AccountService {
    state: Arc<AppState>,
}

impl AccountService {
    /// Create a new account service.
    pub fn new(state: Arc<AppState>) -> Self {
        AccountService { state }
    }

    /// Register a new user and create their cart.
    pub async fn signup(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        validate_email(email)?;
        validate_username(username)?;
        validate_password(password)?;

        if self
            .state
            .db
            .users()
            .find_conflict(email, username)
            .await?
            .is_some()
        {
            warn!(email, username, "Signup rejected: identity taken");
            return Err(ApiError::Conflict(ALREADY_REGISTERED.to_string()));
        }

        let password_hash = hash_password(password)?;
        let now = Utc::now();

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            username: username.to_string(),
            password_hash,
            created_at: now,
        };

        let cart = Cart {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.state.db.begin().await?;

        // A concurrent signup can slip past find_conflict; the unique
        // indexes catch it here and the whole transaction rolls back.
        self.state
            .db
            .users()
            .insert(&mut tx, &user)
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation { .. } => {
                    ApiError::Conflict(ALREADY_REGISTERED.to_string())
                }
                other => other.into(),
            })?;

        self.state.db.carts().insert(&mut tx, &cart).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verify credentials and issue an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let user = self.state.db.users().get_by_email(email).await?;

        let Some(user) = user else {
            warn!(email, "Login rejected: unknown email");
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };

        if !verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        let token = self.state.jwt.generate_access_token(&user.email)?;

        info!(user_id = %user.id, "User logged in");
        Ok(token)
    }
}
