// In-memory credential store for development and tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::{
    models::{NewUser, Session, User},
    store::{CredentialStore, StoreError},
};

#[derive(Default)]
struct Tables {
    users: HashMap<i32, User>,
    sessions: HashMap<String, Session>,
    next_user_id: i32,
}

/// Credential store held in process memory.
///
/// All state is lost on restart. A single `RwLock` guards both tables, so
/// `create_user` checks and inserts the email atomically.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live session records, expired or not.
    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    /// Number of user records.
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation);
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: tables.next_user_id,
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            avatar_url: user.avatar_url,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_session(
        &self,
        id: &str,
        user_id: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.sessions.contains_key(id) {
            return Err(StoreError::UniqueViolation);
        }

        let session = Session {
            id: id.to_string(),
            user_id,
            expires_at,
            created_at: Utc::now(),
        };
        tables.sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.tables.read().await.sessions.get(id).cloned())
    }

    async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        self.tables.write().await.sessions.remove(id);
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.expires_at >= now);
        Ok((before - tables.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Ann".to_string(),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_user_enforces_unique_email() {
        let store = InMemoryCredentialStore::new();
        let first = store.create_user(new_user("a@x.com")).await.unwrap();
        assert_eq!(first.id, 1);

        let err = store.create_user(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let store = InMemoryCredentialStore::new();
        store.create_user(new_user("a@x.com")).await.unwrap();

        assert!(store.get_user_by_email("a@x.com").await.unwrap().is_some());
        assert!(store.get_user_by_email("A@X.COM").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_session_is_idempotent() {
        let store = InMemoryCredentialStore::new();
        store
            .create_session("tok", 1, Utc::now() + Duration::days(1))
            .await
            .unwrap();

        store.delete_session("tok").await.unwrap();
        store.delete_session("tok").await.unwrap();
        store.delete_session("never-existed").await.unwrap();
        assert!(store.get_session("tok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_sessions_keeps_live_ones() {
        let store = InMemoryCredentialStore::new();
        let now = Utc::now();
        store.create_session("old", 1, now - Duration::hours(1)).await.unwrap();
        store.create_session("older", 1, now - Duration::days(3)).await.unwrap();
        store.create_session("live", 1, now + Duration::hours(1)).await.unwrap();

        let removed = store.delete_expired_sessions(now).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.session_count().await, 1);
        assert!(store.get_session("live").await.unwrap().is_some());
    }
}
