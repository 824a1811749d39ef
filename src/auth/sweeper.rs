// Periodic removal of expired sessions

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::auth::service::AuthService;

/// Spawn a task that sweeps expired sessions every `period`.
///
/// The first sweep runs immediately. Failures are logged and the loop keeps
/// going; per-request expiry checks do not depend on this task.
pub fn spawn_session_sweeper(service: AuthService, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match service.sweep_expired_sessions().await {
                Ok(0) => debug!("Session sweep found nothing to remove"),
                Ok(removed) => info!("Session sweep removed {} expired sessions", removed),
                Err(e) => error!("Session sweep failed: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        memory::InMemoryCredentialStore,
        password::{test_password_config, PasswordService},
        store::CredentialStore,
    };
    use chrono::Utc;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sweeper_removes_expired_sessions_in_background() {
        let store = InMemoryCredentialStore::new();
        let service = AuthService::new(
            Arc::new(store.clone()),
            PasswordService::new(test_password_config()).unwrap(),
        );
        let past = Utc::now() - chrono::Duration::minutes(1);
        let future = Utc::now() + chrono::Duration::days(1);
        store.create_session("stale", 1, past).await.unwrap();
        store.create_session("live", 1, future).await.unwrap();

        let handle = spawn_session_sweeper(service, Duration::from_millis(10));
        for _ in 0..50 {
            if store.session_count().await == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(store.get_session("stale").await.unwrap().is_none());
        assert!(store.get_session("live").await.unwrap().is_some());
    }
}
