//! Session guard for the admin area.

use axum::{
    extract::{Extension, Request},
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error};
use url::form_urlencoded;

use crate::auth::{
    cookies::{extract_cookie, SESSION_COOKIE_NAME},
    SessionAuthority, SessionCheck,
};

const PROTECTED_PREFIXES: &[&str] = &["/admin"];

#[must_use]
pub fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Let requests for protected paths through only with a valid session.
/// Everything else is redirected to `/login?redirectTo=<path>`.
pub async fn require_session(
    Extension(auth): Extension<Arc<SessionAuthority>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !is_protected(&path) {
        return next.run(request).await;
    }

    let token = extract_cookie(request.headers(), SESSION_COOKIE_NAME);
    match auth.validate_session(token.as_deref()).await {
        SessionCheck::Valid => next.run(request).await,
        check => {
            debug!("Redirecting {path} to login: {check:?}");
            let mut headers = HeaderMap::new();
            if check == SessionCheck::Expired {
                match auth.clear_session_cookie() {
                    Ok(cookie) => {
                        headers.insert(SET_COOKIE, cookie);
                    }
                    Err(err) => error!("Failed to build session cookie: {err}"),
                }
            }
            match login_location(&path).parse() {
                Ok(location) => {
                    headers.insert(LOCATION, location);
                }
                Err(err) => error!("Invalid login redirect: {err}"),
            }
            (StatusCode::FOUND, headers).into_response()
        }
    }
}

fn login_location(path: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
    format!("/login?redirectTo={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_paths_are_protected() {
        assert!(is_protected("/admin"));
        assert!(is_protected("/admin/menu/42"));
        assert!(!is_protected("/"));
        assert!(!is_protected("/login"));
        assert!(!is_protected("/health"));
    }

    #[test]
    fn login_location_encodes_path() {
        assert_eq!(login_location("/admin"), "/login?redirectTo=%2Fadmin");
        assert_eq!(
            login_location("/admin/menu items"),
            "/login?redirectTo=%2Fadmin%2Fmenu+items"
        );
    }
}
