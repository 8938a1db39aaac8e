use axum::{
    extract::Extension,
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;

use crate::auth::{
    cookies::{extract_cookie, SESSION_COOKIE_NAME},
    SessionAuthority,
};

#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 302, description = "Session cleared; redirect to the login page")
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, auth: Extension<Arc<SessionAuthority>>) -> impl IntoResponse {
    let token = extract_cookie(&headers, SESSION_COOKIE_NAME);

    // Always clear the cookie, even if the session record was missing.
    let mut response_headers = HeaderMap::new();
    match auth.destroy_session(token.as_deref()).await {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }
    response_headers.insert(LOCATION, HeaderValue::from_static("/login"));

    (StatusCode::FOUND, response_headers)
}
