// HTTP handlers for the JSON authentication API

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::warn;
use validator::Validate;

use crate::auth::{
    cookie::{clear_session_cookie, extract_session_token, session_cookie},
    error::AuthError,
    middleware::CurrentUser,
    models::{AuthResponse, LoginRequest, RegisterRequest},
};
use crate::error::ApiResponse;
use crate::AppState;

/// Register a new user
/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered, session cookie set", body = AuthResponse),
        (status = 400, description = "Invalid input or malformed body"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(request) = payload?;
    request.validate()?;

    let (user, session) = state
        .auth
        .register(&request.email, &request.password, &request.name)
        .await?;
    let cookie = session_cookie(&state.cookies, &session.id)
        .map_err(|e| AuthError::Internal(format!("session cookie: {e}")))?;

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::ok(AuthResponse { user: user.into() })),
    ))
}

/// Login a user
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = AuthResponse),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(request) = payload?;
    request.validate()?;

    let (user, session) = state.auth.login(&request.email, &request.password).await?;
    let cookie = session_cookie(&state.cookies, &session.id)
        .map_err(|e| AuthError::Internal(format!("session cookie: {e}")))?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::ok(AuthResponse { user: user.into() })),
    ))
}

/// Logout the current session
/// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session deleted and cookie cleared"),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth"
)]
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = extract_session_token(&headers) {
        if let Err(e) = state.auth.logout(&token).await {
            warn!("Failed to delete session on logout: {}", e);
        }
    }

    (
        [(SET_COOKIE, clear_session_cookie(&state.cookies))],
        ApiResponse::<Value>::ok(json!({ "message": "Logged out successfully" })),
    )
}

/// Get current user information (protected endpoint)
/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth"
)]
pub async fn me_handler(CurrentUser(user): CurrentUser) -> ApiResponse<AuthResponse> {
    ApiResponse::ok(AuthResponse { user: user.into() })
}
