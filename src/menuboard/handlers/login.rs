//! Login form and login submission.

use axum::{
    extract::{ConnectInfo, Extension, Query},
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    Form,
};
use secrecy::SecretString;
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use super::{client_address, escape_html, safe_redirect_target};
use crate::auth::{
    cookies::{extract_cookie, CSRF_COOKIE_NAME},
    LoginAttempt, LoginOutcome, SessionAuthority, CSRF_FORM_FIELD,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    /// Local path to return to after a successful login.
    #[serde(rename = "redirectTo")]
    redirect_to: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginForm {
    username: Option<String>,
    #[schema(format = Password)]
    password: Option<String>,
    csrf_token: Option<String>,
    #[serde(rename = "redirectTo")]
    redirect_to: Option<String>,
}

#[utoipa::path(
    get,
    path = "/login",
    params(LoginQuery),
    responses(
        (status = 200, description = "Login form with a fresh CSRF token", content_type = "text/html"),
        (status = 500, description = "Token generation failed")
    ),
    tag = "auth"
)]
pub async fn login_form(
    auth: Extension<Arc<SessionAuthority>>,
    Query(query): Query<LoginQuery>,
) -> Response {
    let csrf = match auth.create_csrf_token() {
        Ok(csrf) => csrf,
        Err(err) => {
            error!("Failed to create CSRF token: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let redirect_to = safe_redirect_target(query.redirect_to.as_deref());
    let page = render_login_form(&csrf.token, &redirect_to);

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, csrf.set_cookie);

    (headers, Html(page)).into_response()
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in; session cookie set"),
        (status = 400, description = "Username and password are required"),
        (status = 401, description = "Invalid username or password"),
        (status = 403, description = "Invalid CSRF token"),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "auth"
)]
pub async fn login_submit(
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    auth: Extension<Arc<SessionAuthority>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let attempt = LoginAttempt {
        client: client_address(
            &headers,
            connect_info.map(|ConnectInfo(addr)| addr),
            auth.config().trust_proxy_headers(),
        ),
        csrf_cookie: extract_cookie(&headers, CSRF_COOKIE_NAME),
        csrf_form: form.csrf_token,
        username: form.username,
        password: form.password.map(SecretString::from),
    };

    match auth.login(attempt).await {
        Ok(LoginOutcome::Success(session)) => {
            let location = safe_redirect_target(form.redirect_to.as_deref());
            let mut response_headers = HeaderMap::new();
            response_headers.insert(SET_COOKIE, session.set_cookie);
            match location.parse() {
                Ok(location) => {
                    response_headers.insert(LOCATION, location);
                }
                Err(err) => {
                    error!("Invalid redirect location: {err}");
                }
            }
            (StatusCode::SEE_OTHER, response_headers).into_response()
        }
        Ok(LoginOutcome::InvalidCsrf) => (StatusCode::FORBIDDEN, "Invalid request").into_response(),
        Ok(LoginOutcome::RateLimited) => (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many login attempts. Please try again later.",
        )
            .into_response(),
        Ok(LoginOutcome::MissingFields) => (
            StatusCode::BAD_REQUEST,
            "Username and password are required",
        )
            .into_response(),
        Ok(LoginOutcome::InvalidCredentials) => {
            (StatusCode::UNAUTHORIZED, "Invalid username or password").into_response()
        }
        Err(err) => {
            error!("Failed to complete login: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn render_login_form(csrf_token: &str, redirect_to: &str) -> String {
    let redirect_to = escape_html(redirect_to);
    format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Admin login</title></head>
<body>
<h1>Admin login</h1>
<form method="post" action="/login">
<input type="hidden" name="{CSRF_FORM_FIELD}" value="{csrf_token}">
<input type="hidden" name="redirectTo" value="{redirect_to}">
<label>Username <input name="username" autocomplete="username" required></label>
<label>Password <input type="password" name="password" autocomplete="current-password" required></label>
<button type="submit">Sign in</button>
</form>
</body>
</html>
"#
    )
}
