// Authentication module
// Session-cookie authentication: registration, login, logout and the request gate

pub mod cookie;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod store;
pub mod sweeper;
pub mod token;

// Re-export commonly used types
pub use cookie::CookieSettings;
pub use error::AuthError;
pub use handlers::{login_handler, logout_handler, me_handler, register_handler};
pub use memory::InMemoryCredentialStore;
pub use middleware::{optional_auth, require_api_auth, require_page_auth, CurrentUser, MaybeUser};
pub use models::{AuthResponse, LoginRequest, RegisterRequest, Session, User, UserResponse};
pub use password::{PasswordConfig, PasswordService};
pub use repository::PgCredentialStore;
pub use service::AuthService;
pub use store::{CredentialStore, StoreError};
