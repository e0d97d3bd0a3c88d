//! # User Repository
//!
//! Database operations for accounts.
//!
//! ## Key Operations
//! - Lookup by email (login) and by id (token resolution)
//! - Duplicate detection across BOTH unique columns before insert
//!
//! ## Duplicate Checking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Signup asks: is this email OR this username taken?                     │
//! │                                                                         │
//! │  find_conflict("ada@x.com", "ada")                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... WHERE email = ?1 OR username = ?2 LIMIT 1                   │
//! │       │                                                                 │
//! │       ├── Some(user) → signup rejected                                  │
//! │       └── None       → proceed to insert                                │
//! │                                                                         │
//! │  The UNIQUE indexes on both columns are the backstop for races:        │
//! │  two concurrent signups of the same email cannot both insert.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::User;

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Fetches a user by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Fetches a user by email (the login identifier).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, created_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Finds an existing user that would conflict with a signup attempt.
    ///
    /// Returns the first user matching EITHER the email OR the username.
    pub async fn find_conflict(&self, email: &str, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, created_at
            FROM users
            WHERE email = ?1 OR username = ?2
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a new user.
    ///
    /// Takes an explicit connection so signup can create the user and their
    /// cart in a single transaction.
    pub async fn insert(&self, conn: &mut SqliteConnection, user: &User) -> DbResult<()> {
        debug!(user_id = %user.id, email = %user.email, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
