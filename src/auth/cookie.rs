// Session cookie encoding and extraction

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

use crate::auth::service::AuthService;

pub const SESSION_COOKIE_NAME: &str = "session_id";

/// Cookie attributes that depend on the deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    /// Add `Secure`; off only for local development over plain HTTP.
    pub secure: bool,
}

/// Build the `Set-Cookie` value carrying a freshly minted session token.
pub fn session_cookie(settings: &CookieSettings, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = AuthService::session_ttl().num_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    );
    if settings.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build the `Set-Cookie` value that makes the browser drop the session.
pub fn clear_session_cookie(settings: &CookieSettings) -> HeaderValue {
    let cookie = if settings.secure {
        "session_id=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure"
    } else {
        "session_id=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    };
    HeaderValue::from_static(cookie)
}

/// Pull the session token out of the request's `Cookie` headers.
///
/// Empty values count as absent.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == SESSION_COOKIE_NAME)
        .map(|(_, val)| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
