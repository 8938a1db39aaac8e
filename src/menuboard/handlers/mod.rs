pub mod admin;
pub mod health;
pub mod login;
pub mod logout;
pub mod root;

// common functions for the handlers
use axum::http::HeaderMap;
use std::net::SocketAddr;

const DEFAULT_REDIRECT: &str = "/admin";
const UNKNOWN_CLIENT: &str = "unknown";

/// Client address for rate limiting.
///
/// Proxy headers are only consulted when `trust_proxy_headers` is set; any
/// client can put whatever it likes in them. Otherwise the socket peer is used.
pub(crate) fn client_address(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    let peer = peer.map(|addr| addr.ip().to_string());
    if !trust_proxy_headers {
        return peer.unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
    }

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(forwarded) = forwarded {
        return forwarded.to_string();
    }

    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or(peer)
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Only same-site absolute paths are accepted as post-login destinations.
pub(crate) fn safe_redirect_target(target: Option<&str>) -> String {
    match target.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => DEFAULT_REDIRECT.to_string(),
    }
}

pub(crate) fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
