// Authentication error types

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::auth::store::StoreError;
use crate::error::ApiResponse;

/// Authentication error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Bad input: name or password outside the accepted bounds
    #[error("Validation error: {0}")]
    Validation(String),

    /// Body missing, not JSON, or not the expected shape
    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    #[error("Email already registered")]
    DuplicateEmail,

    /// Covers both "unknown email" and "wrong password"
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session expired")]
    SessionExpired,

    /// Storage failure, propagated unchanged
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::SessionNotFound
            | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
            AuthError::Store(_)
            | AuthError::PasswordHash(_)
            | AuthError::TokenGeneration(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code for the response envelope
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::InvalidRequestBody(_) => "INVALID_REQUEST_BODY",
            AuthError::DuplicateEmail => "EMAIL_TAKEN",
            AuthError::InvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            AuthError::SessionNotFound | AuthError::SessionExpired => "NOT_AUTHENTICATED",
            AuthError::Store(_)
            | AuthError::PasswordHash(_)
            | AuthError::TokenGeneration(_)
            | AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get a descriptive error message for this error
    /// This message is safe to send to clients (no sensitive data)
    pub fn error_message(&self) -> String {
        match self {
            AuthError::Validation(msg) => msg.clone(),
            AuthError::InvalidRequestBody(_) => "Invalid request body".to_string(),
            AuthError::DuplicateEmail => "Email already registered".to_string(),
            AuthError::InvalidCredentials => "Invalid email or password".to_string(),
            AuthError::SessionNotFound | AuthError::SessionExpired => {
                "Not authenticated".to_string()
            }
            AuthError::Store(_)
            | AuthError::PasswordHash(_)
            | AuthError::TokenGeneration(_)
            | AuthError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::Validation(errors.to_string())
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::InvalidRequestBody(rejection.body_text())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Auth failure: {}", self);
        } else {
            debug!("Auth rejection: {}", self);
        }

        ApiResponse::failure_response(status, self.code(), self.error_message())
    }
}
