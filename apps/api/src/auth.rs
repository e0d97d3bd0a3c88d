//! JWT authentication and password hashing.
//!
//! Tokens are stateless HS256 JWTs signed with the configured secret.
//! Logout is client-side: the server never stores issued tokens, so a
//! token stays valid until its `exp` passes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// =============================================================================
// JWT
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the user's email)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    access_lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, access_lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            access_lifetime_secs,
        }
    }

    /// Generate an access token for the given user email.
    pub fn generate_access_token(&self, email: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_lifetime_secs);

        let claims = Claims {
            sub: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {e}")))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| ApiError::Unauthorized("Could not validate credentials".to_string()))?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from an authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash.
///
/// Returns `false` for both wrong passwords and malformed hashes, so
/// callers cannot tell the two apart (neither can an attacker).
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let token = manager.generate_access_token("alice@example.com").unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "alice@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);
        let other = JwtManager::new("other-secret".to_string(), 3600);

        let token = manager.generate_access_token("alice@example.com").unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Negative lifetime puts exp in the past; there is still default
        // leeway in the validator, so go well past it.
        let manager = JwtManager::new("test-secret".to_string(), -600);

        let token = manager.generate_access_token("alice@example.com").unwrap();
        assert!(manager.validate_token(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("abc123"), None);
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("secret123").unwrap();

        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_malformed_hash_rejected() {
        assert!(!verify_password("secret123", "not-a-phc-string"));
    }
}
