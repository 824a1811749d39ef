// Server-rendered pages: login/register forms and the protected dashboard
//
// Real templating lives outside this crate; these pages are bare HTML so the
// cookie flow can be driven from a browser.

use axum::{
    extract::{Query, State},
    http::header::SET_COOKIE,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, warn};

use crate::auth::{
    cookie::{clear_session_cookie, extract_session_token, session_cookie},
    middleware::{CurrentUser, MaybeUser},
    AuthError,
};
use crate::AppState;

pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// `?error=<code>` on the form pages
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub error: Option<String>,
}

/// Short code carried in the redirect query string.
fn error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::Validation(_) => "invalid_input",
        AuthError::DuplicateEmail => "email_taken",
        AuthError::InvalidCredentials => "invalid_credentials",
        _ => "server_error",
    }
}

/// Fixed message per code; the query string is never echoed.
fn error_message(code: &str) -> Option<&'static str> {
    match code {
        "password_mismatch" => Some("Passwords do not match"),
        "invalid_input" => Some("Name must be 2-100 characters and password at least 8"),
        "email_taken" => Some("Email already registered"),
        "invalid_credentials" => Some("Invalid email or password"),
        "server_error" => Some("Something went wrong, please try again"),
        _ => None,
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body>{body}</body></html>"
    ))
}

fn error_banner(query: &PageQuery) -> String {
    query
        .error
        .as_deref()
        .and_then(error_message)
        .map(|msg| format!("<p class=\"error\">{msg}</p>"))
        .unwrap_or_default()
}

/// Redirect with a fresh session cookie after a successful form submission
fn signed_in(state: &AppState, token: &str) -> Response {
    match session_cookie(&state.cookies, token) {
        Ok(cookie) => ([(SET_COOKIE, cookie)], Redirect::to(DASHBOARD_PATH)).into_response(),
        Err(e) => {
            error!("Failed to build session cookie: {}", e);
            Redirect::to("/login?error=server_error").into_response()
        }
    }
}

/// GET /
pub async fn home_page(MaybeUser(user): MaybeUser) -> Html<String> {
    let body = match user {
        Some(user) => format!(
            "<h1>Welcome back, {}</h1><a href=\"/dashboard\">Dashboard</a>",
            escape_html(&user.name)
        ),
        None => "<h1>Welcome</h1><a href=\"/login\">Log in</a> or <a href=\"/register\">register</a>"
            .to_string(),
    };
    layout("Home", &body)
}

/// GET /login
pub async fn login_page(MaybeUser(user): MaybeUser, Query(query): Query<PageQuery>) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    let body = format!(
        "<h1>Log in</h1>{}\
         <form method=\"post\" action=\"/login\">\
         <input type=\"email\" name=\"email\" required>\
         <input type=\"password\" name=\"password\" required>\
         <button type=\"submit\">Log in</button></form>",
        error_banner(&query)
    );
    layout("Login", &body).into_response()
}

/// GET /register
pub async fn register_page(MaybeUser(user): MaybeUser, Query(query): Query<PageQuery>) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    let body = format!(
        "<h1>Register</h1>{}\
         <form method=\"post\" action=\"/register\">\
         <input type=\"text\" name=\"name\" required>\
         <input type=\"email\" name=\"email\" required>\
         <input type=\"password\" name=\"password\" required>\
         <input type=\"password\" name=\"confirm_password\" required>\
         <button type=\"submit\">Register</button></form>",
        error_banner(&query)
    );
    layout("Register", &body).into_response()
}

/// POST /register
pub async fn register_submit(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    if form.password != form.confirm_password {
        return Redirect::to("/register?error=password_mismatch").into_response();
    }

    match state.auth.register(&form.email, &form.password, &form.name).await {
        Ok((_, session)) => signed_in(&state, &session.id),
        Err(e) => Redirect::to(&format!("/register?error={}", error_code(&e))).into_response(),
    }
}

/// POST /login
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.auth.login(&form.email, &form.password).await {
        Ok((_, session)) => signed_in(&state, &session.id),
        Err(e) => Redirect::to(&format!("/login?error={}", error_code(&e))).into_response(),
    }
}

/// POST /logout
pub async fn logout_submit(State(state): State<AppState>, headers: axum::http::HeaderMap) -> Response {
    if let Some(token) = extract_session_token(&headers) {
        if let Err(e) = state.auth.logout(&token).await {
            warn!("Failed to delete session on logout: {}", e);
        }
    }

    (
        [(SET_COOKIE, clear_session_cookie(&state.cookies))],
        Redirect::to("/"),
    )
        .into_response()
}

/// GET /dashboard
pub async fn dashboard_page(CurrentUser(user): CurrentUser) -> Html<String> {
    let body = format!(
        "<h1>Dashboard</h1><p>Signed in as {} ({})</p>\
         <form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>",
        escape_html(&user.name),
        escape_html(&user.email)
    );
    layout("Dashboard", &body)
}
