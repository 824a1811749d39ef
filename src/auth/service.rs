// Authentication service - business logic layer

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::auth::{
    error::AuthError,
    models::{NewUser, Session, User},
    password::PasswordService,
    store::{CredentialStore, StoreError},
    token,
};

/// Validity window of every new session
pub const SESSION_TTL_DAYS: i64 = 7;

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 100;

/// Authentication service coordinating all auth operations.
///
/// Holds no per-user state; every call goes to the store. Cheap to clone and
/// safe to share across concurrently handled requests.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    passwords: PasswordService,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(store: Arc<dyn CredentialStore>, passwords: PasswordService) -> Self {
        Self { store, passwords }
    }

    /// Lifetime of a session minted now
    pub fn session_ttl() -> Duration {
        Duration::days(SESSION_TTL_DAYS)
    }

    /// Register a new user and open a first session for them.
    ///
    /// The duplicate-email check is a pre-read and can race with a concurrent
    /// registration; the store's unique constraint settles that race and is
    /// reported as [`AuthError::DuplicateEmail`] as well.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(User, Session), AuthError> {
        let name_len = name.chars().count();
        if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&name_len) {
            return Err(AuthError::Validation(format!(
                "name must be between {} and {} characters",
                MIN_NAME_LENGTH, MAX_NAME_LENGTH
            )));
        }
        PasswordService::validate_password_strength(password)?;

        if self.store.get_user_by_email(email).await?.is_some() {
            debug!("Registration rejected, email already taken: {}", email);
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash_password(password).await?;
        let user = self
            .store
            .create_user(NewUser {
                email: email.to_string(),
                password_hash,
                name: name.to_string(),
                avatar_url: None,
            })
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation => AuthError::DuplicateEmail,
                other => AuthError::Store(other),
            })?;

        let session = self.open_session(user.id).await?;
        info!("Registered user {}", user.id);
        Ok((user, session))
    }

    /// Login a user, always minting a fresh session.
    ///
    /// Unknown email and wrong password produce the same error, and both
    /// paths pay for one hash verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, Session), AuthError> {
        let Some(user) = self.store.get_user_by_email(email).await? else {
            self.burn_verification(password).await;
            debug!("Login failed for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash).await? {
            debug!("Login failed for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.open_session(user.id).await?;
        info!("User {} logged in", user.id);
        Ok((user, session))
    }

    /// Delete the session if it exists. Unknown ids are not an error.
    pub async fn logout(&self, session_id: &str) -> Result<(), AuthError> {
        self.store.delete_session(session_id).await?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Side effect: a session found past its expiry is deleted before
    /// [`AuthError::SessionExpired`] is returned, so a second call with the
    /// same token yields [`AuthError::SessionNotFound`]. A session whose user
    /// no longer exists yields `AuthError::Store(StoreError::NotFound)`.
    pub async fn resolve_session(&self, session_id: &str) -> Result<User, AuthError> {
        let session = self
            .store
            .get_session(session_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if session.is_expired_at(Utc::now()) {
            if let Err(e) = self.store.delete_session(session_id).await {
                warn!("Failed to delete expired session: {}", e);
            }
            return Err(AuthError::SessionExpired);
        }

        let user = self.store.get_user(session.user_id).await?.ok_or_else(|| {
            error!("Session points at missing user {}", session.user_id);
            AuthError::Store(StoreError::NotFound)
        })?;

        Ok(user)
    }

    /// Produce a new unguessable session token.
    pub fn generate_session_token(&self) -> Result<String, AuthError> {
        token::generate_session_token()
    }

    /// Delete every expired session. Returns how many were removed.
    ///
    /// Maintenance only: `resolve_session` already refuses expired sessions.
    pub async fn sweep_expired_sessions(&self) -> Result<u64, AuthError> {
        let removed = self.store.delete_expired_sessions(Utc::now()).await?;
        Ok(removed)
    }

    async fn open_session(&self, user_id: i32) -> Result<Session, AuthError> {
        let token = self.generate_session_token()?;
        let expires_at = Utc::now() + Self::session_ttl();
        let session = self.store.create_session(&token, user_id, expires_at).await?;
        Ok(session)
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let passwords = self.passwords.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || passwords.hash_password(&password))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let passwords = self.passwords.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        let verified = tokio::task::spawn_blocking(move || passwords.verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;

        match verified {
            Ok(matches) => Ok(matches),
            Err(e) => {
                // A corrupt stored hash must not look different from a wrong password.
                error!("Stored password hash is unreadable: {}", e);
                Ok(false)
            }
        }
    }

    async fn burn_verification(&self, password: &str) {
        let passwords = self.passwords.clone();
        let password = password.to_owned();
        let _ = tokio::task::spawn_blocking(move || passwords.verify_dummy(&password)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory::InMemoryCredentialStore;
    use crate::auth::password::test_password_config;

    fn setup() -> (AuthService, InMemoryCredentialStore) {
        let store = InMemoryCredentialStore::new();
        let passwords = PasswordService::new(test_password_config()).unwrap();
        let service = AuthService::new(Arc::new(store.clone()), passwords);
        (service, store)
    }

    #[tokio::test]
    async fn test_register_then_login_then_resolve() {
        let (service, _store) = setup();

        let (user, session) = service.register("a@x.com", "password1", "Ann").await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.name, "Ann");
        assert_eq!(session.user_id, user.id);
        assert_ne!(user.password_hash, "password1");

        let resolved = service.resolve_session(&session.id).await.unwrap();
        assert_eq!(resolved.id, user.id);

        let (login_user, login_session) = service.login("a@x.com", "password1").await.unwrap();
        assert_eq!(login_user.id, user.id);
        assert_ne!(login_session.id, session.id);
    }

    #[tokio::test]
    async fn test_register_session_lasts_seven_days() {
        let (service, _store) = setup();
        let before = Utc::now();
        let (_user, session) = service.register("a@x.com", "password1", "Ann").await.unwrap();
        let after = Utc::now();

        assert!(session.expires_at >= before + Duration::days(7));
        assert!(session.expires_at <= after + Duration::days(7));
    }

    #[tokio::test]
    async fn test_register_validates_name_and_password() {
        let (service, store) = setup();

        for (password, name) in [
            ("password1", "A"),
            ("password1", ""),
            ("short", "Ann"),
            ("1234567", "Ann"),
        ] {
            let err = service.register("a@x.com", password, name).await.unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)), "{password:?}/{name:?}");
        }

        let long_name = "n".repeat(101);
        let err = service
            .register("a@x.com", "password1", &long_name)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        assert_eq!(store.user_count().await, 0);
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_register_stores_email_as_given() {
        let (service, _store) = setup();
        let (user, _) = service.register("ann-at-home", "password1", "Ann").await.unwrap();
        assert_eq!(user.email, "ann-at-home");
    }

    #[tokio::test]
    async fn test_register_accepts_boundary_lengths() {
        let (service, _store) = setup();
        service.register("a@x.com", "12345678", "Al").await.unwrap();
        service
            .register("b@x.com", "password1", &"n".repeat(100))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_email_mutates_nothing() {
        let (service, store) = setup();
        service.register("a@x.com", "password1", "Ann").await.unwrap();
        let users_before = store.user_count().await;
        let sessions_before = store.session_count().await;

        let err = service
            .register("a@x.com", "otherpass1", "Other")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(store.user_count().await, users_before);
        assert_eq!(store.session_count().await, sessions_before);

        // The original password still works.
        service.login("a@x.com", "password1").await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_registration_yields_one_user() {
        let (service, store) = setup();
        let a = service.clone();
        let b = service.clone();

        let (ra, rb) = tokio::join!(
            tokio::spawn(async move { a.register("race@x.com", "password1", "Ann").await }),
            tokio::spawn(async move { b.register("race@x.com", "password1", "Ann").await }),
        );
        let results = [ra.unwrap(), rb.unwrap()];

        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::DuplicateEmail)))
            .count();
        assert_eq!((ok, dup), (1, 1));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
        let (service, _store) = setup();
        service.register("a@x.com", "password1", "Ann").await.unwrap();

        let wrong = service.login("a@x.com", "wrongpw").await.unwrap_err();
        let unknown = service.login("nobody@x.com", "password1").await.unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert_eq!(wrong.code(), unknown.code());
        assert_eq!(wrong.status_code(), unknown.status_code());
    }

    #[tokio::test]
    async fn test_login_email_is_case_sensitive() {
        let (service, _store) = setup();
        service.register("a@x.com", "password1", "Ann").await.unwrap();

        let err = service.login("A@X.COM", "password1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_corrupt_stored_hash_reads_as_invalid_credentials() {
        let (service, store) = setup();
        store
            .create_user(NewUser {
                email: "broken@x.com".to_string(),
                password_hash: "not-a-hash".to_string(),
                name: "Broken".to_string(),
                avatar_url: None,
            })
            .await
            .unwrap();

        let err = service.login("broken@x.com", "password1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_expired_session_is_purged_on_access() {
        let (service, store) = setup();
        let (user, _session) = service.register("a@x.com", "password1", "Ann").await.unwrap();

        store
            .create_session("expired-token", user.id, Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        let first = service.resolve_session("expired-token").await.unwrap_err();
        assert!(matches!(first, AuthError::SessionExpired));
        assert!(store.get_session("expired-token").await.unwrap().is_none());

        let second = service.resolve_session("expired-token").await.unwrap_err();
        assert!(matches!(second, AuthError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_unknown_session_not_found() {
        let (service, _store) = setup();
        let err = service.resolve_session("no-such-token").await.unwrap_err();
        assert!(matches!(err, AuthError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_orphaned_session_is_a_store_error() {
        let (service, store) = setup();
        store
            .create_session("orphan", 999, Utc::now() + Duration::days(1))
            .await
            .unwrap();

        let err = service.resolve_session("orphan").await.unwrap_err();
        assert!(matches!(err, AuthError::Store(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_logout_unknown_session_is_ok() {
        let (service, _store) = setup();
        service.logout("never-issued").await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_invalidates_only_that_session() {
        let (service, _store) = setup();
        service.register("a@x.com", "password1", "Ann").await.unwrap();

        let (_, first) = service.login("a@x.com", "password1").await.unwrap();
        let (_, second) = service.login("a@x.com", "password1").await.unwrap();
        assert_ne!(first.id, second.id);

        service.logout(&first.id).await.unwrap();
        assert!(matches!(
            service.resolve_session(&first.id).await.unwrap_err(),
            AuthError::SessionNotFound
        ));
        assert!(service.resolve_session(&second.id).await.is_ok());

        // Logging out twice is harmless.
        service.logout(&first.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_sessions() {
        let (service, store) = setup();
        let (user, live) = service.register("a@x.com", "password1", "Ann").await.unwrap();
        let past = Utc::now() - Duration::minutes(5);
        store.create_session("stale-1", user.id, past).await.unwrap();
        store.create_session("stale-2", user.id, past).await.unwrap();

        let removed = service.sweep_expired_sessions().await.unwrap();
        assert_eq!(removed, 2);
        assert!(service.resolve_session(&live.id).await.is_ok());

        assert_eq!(service.sweep_expired_sessions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweep_and_resolve_race_harmlessly() {
        let (service, store) = setup();
        let (user, _) = service.register("a@x.com", "password1", "Ann").await.unwrap();
        store
            .create_session("stale", user.id, Utc::now() - Duration::seconds(10))
            .await
            .unwrap();

        let (swept, resolved) = tokio::join!(
            service.sweep_expired_sessions(),
            service.resolve_session("stale"),
        );
        assert!(swept.is_ok());
        assert!(matches!(
            resolved,
            Err(AuthError::SessionExpired) | Err(AuthError::SessionNotFound)
        ));
        assert!(store.get_session("stale").await.unwrap().is_none());
    }
}
