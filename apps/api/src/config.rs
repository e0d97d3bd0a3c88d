//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults suitable for local development. A `.env` file is loaded by
//! `main()` before this runs.

use std::env;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./bazaar.db".to_string()),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // Fallback for development only.
                // In production, this MUST be set via environment variable.
                "bazaar-dev-secret-change-in-production".to_string()
            }),

            jwt_access_lifetime_secs: env::var("JWT_ACCESS_LIFETIME_SECS")
                .unwrap_or_else(|_| "3600".to_string()) // 1 hour
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()))?,
        };

        if config.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "JWT_ACCESS_LIFETIME_SECS".to_string(),
            ));
        }

        Ok(config)
    }
}

impl Default for ApiConfig {
    /// Development defaults, used by tests that never read the environment.
    fn default() -> Self {
        ApiConfig {
            port: 8000,
            database_path: "./bazaar.db".to_string(),
            jwt_secret: "bazaar-dev-secret-change-in-production".to_string(),
            jwt_access_lifetime_secs: 3600,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
