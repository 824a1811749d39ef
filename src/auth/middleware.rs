// Request gate: turns a session cookie into request-scoped identity

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use tracing::{debug, warn};

use crate::auth::{
    cookie::extract_session_token,
    error::AuthError,
    models::User,
    service::AuthService,
};
use crate::error::ApiResponse;
use crate::AppState;

/// Where page routes send anonymous visitors
pub const LOGIN_PATH: &str = "/login";

/// The user resolved for the current request.
///
/// Inserted into the request's extensions by the gate and dropped with the
/// request. As an extractor it rejects with 401 when no gate attached a user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Like [`CurrentUser`], but never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::SessionNotFound)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts.extensions.get::<CurrentUser>().map(|c| c.0.clone()),
        ))
    }
}

/// Resolve the request's session cookie, if any.
///
/// Every failure collapses to `None`; the reason is only logged.
pub async fn authenticate(auth: &AuthService, headers: &HeaderMap) -> Option<User> {
    let token = extract_session_token(headers)?;
    match auth.resolve_session(&token).await {
        Ok(user) => Some(user),
        Err(e @ (AuthError::SessionNotFound | AuthError::SessionExpired)) => {
            debug!("Session rejected: {}", e);
            None
        }
        Err(e) => {
            warn!("Session resolution failed: {}", e);
            None
        }
    }
}

/// Gate for page routes: anonymous requests are redirected to the login page.
pub async fn require_page_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state.auth, request.headers()).await {
        Some(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        None => {
            debug!("Redirecting anonymous request for {}", request.uri().path());
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

/// Gate for API routes: anonymous requests get a 401 envelope.
pub async fn require_api_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state.auth, request.headers()).await {
        Some(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        None => ApiResponse::failure_response(
            StatusCode::UNAUTHORIZED,
            "NOT_AUTHENTICATED",
            "Not authenticated",
        ),
    }
}

/// Attach the user when the session resolves; otherwise carry on anonymously.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user) = authenticate(&state.auth, request.headers()).await {
        request.extensions_mut().insert(CurrentUser(user));
    }
    next.run(request).await
}
