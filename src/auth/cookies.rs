//! Cookie header helpers for the `session` and `csrf` cookies.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

pub const SESSION_COOKIE_NAME: &str = "session";
pub const CSRF_COOKIE_NAME: &str = "csrf";

/// Build an `HttpOnly`, `SameSite=Strict` cookie scoped to `/`.
///
/// # Errors
/// Returns `InvalidHeaderValue` if `value` contains characters not allowed in a header.
pub fn build_cookie(
    name: &str,
    value: &str,
    max_age_seconds: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_seconds}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build a cookie that tells the browser to drop `name` immediately.
///
/// # Errors
/// Returns `InvalidHeaderValue` if `name` is not a valid header token.
pub fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    build_cookie(name, "", 0, secure)
}

/// Find a cookie by name across all `Cookie` headers. Empty values count as absent.
#[must_use]
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| val.trim().to_string())
        })
        .find(|val| !val.is_empty())
}
