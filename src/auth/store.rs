// Storage contract for users and sessions

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::auth::models::{NewUser, Session, User};

/// Errors raised by a credential store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (duplicate email)
    #[error("Unique constraint violated")]
    UniqueViolation,

    /// A record the caller relies on is missing
    #[error("Record not found")]
    NotFound,

    /// Any other storage-layer failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable persistence for user and session records.
///
/// Implementations must be safe for concurrent use and must enforce email
/// uniqueness on `create_user`; the service's own duplicate check is a
/// best-effort pre-read.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::UniqueViolation`] if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get_user(&self, id: i32) -> Result<Option<User>, StoreError>;

    async fn create_session(
        &self,
        id: &str,
        user_id: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError>;

    async fn get_session(&self, id: &str) -> Result<Option<Session>, StoreError>;

    /// Idempotent: deleting an unknown session succeeds.
    async fn delete_session(&self, id: &str) -> Result<(), StoreError>;

    /// Removes every session with `expires_at < now`, returning how many went.
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
