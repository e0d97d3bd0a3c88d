//! Shared application state.

use bazaar_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// State shared by every handler, wrapped in an `Arc` by the router.
pub struct AppState {
    /// Database connection pool and repositories.
    pub db: Database,

    /// JWT signing and validation.
    pub jwt: JwtManager,

    /// Loaded server configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Assemble state from a connected database and loaded config.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_access_lifetime_secs);

        AppState { db, jwt, config }
    }
}
