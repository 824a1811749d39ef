// PostgreSQL-backed credential store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::auth::{
    models::{NewUser, Session, User},
    store::{CredentialStore, StoreError},
};

const USER_COLUMNS: &str = "id, email, password_hash, name, avatar_url, created_at, updated_at";

/// Credential store over the `users` and `sessions` tables.
///
/// Session tokens are keyed by their SHA-256 digest; the raw token never
/// reaches the database.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a new PgCredentialStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hash a token using SHA-256
    fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation;
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, name, avatar_url) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(created)
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_session(
        &self,
        id: &str,
        user_id: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let (created_at,): (DateTime<Utc>,) = sqlx::query_as(
            "INSERT INTO sessions (token_hash, user_id, expires_at) VALUES ($1, $2, $3) \
             RETURNING created_at",
        )
        .bind(Self::hash_token(id))
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(Session {
            id: id.to_string(),
            user_id,
            expires_at,
            created_at,
        })
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, StoreError> {
        let row: Option<(i32, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            "SELECT user_id, expires_at, created_at FROM sessions WHERE token_hash = $1",
        )
        .bind(Self::hash_token(id))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(user_id, expires_at, created_at)| Session {
            id: id.to_string(),
            user_id,
            expires_at,
            created_at,
        }))
    }

    async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(Self::hash_token(id))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
