use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vugo::{
    auth::{
        sweeper::spawn_session_sweeper, AuthService, CookieSettings, CredentialStore,
        InMemoryCredentialStore, PasswordService, PgCredentialStore,
    },
    config::Config,
    create_router, db, AppState,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Vugo - Starting...");

    let config = Config::from_env().expect("Invalid configuration");

    let store: Arc<dyn CredentialStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");
            db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            Arc::new(PgCredentialStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; all data is lost on restart");
            Arc::new(InMemoryCredentialStore::new())
        }
    };

    let passwords = PasswordService::new(config.password).expect("Invalid Argon2 parameters");
    let auth = AuthService::new(store, passwords);

    match config.sweep_interval {
        Some(period) => {
            tracing::info!("Sweeping expired sessions every {}s", period.as_secs());
            spawn_session_sweeper(auth.clone(), period);
        }
        None => tracing::info!("Expired-session sweep disabled"),
    }

    let state = AppState {
        auth,
        cookies: CookieSettings {
            secure: config.environment.is_production(),
        },
    };
    let app = create_router(state, &config.cors_origins);

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Vugo is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
