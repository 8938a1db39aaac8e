use crate::auth::SessionAuthority;
use anyhow::Result;
use axum::{
    body::Body,
    extract::{Extension, MatchedPath},
    http::{HeaderName, HeaderValue, Request},
    middleware::from_fn,
    response::Json,
    routing::get,
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;

pub mod handlers;
pub mod middleware;
mod openapi;

pub use openapi::openapi;

use self::handlers::{admin, health, login, logout, root};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the application router around a shared `SessionAuthority`.
#[must_use]
pub fn router(auth: Arc<SessionAuthority>) -> Router {
    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health))
        .route("/openapi.json", get(|| async { Json(openapi()) }))
        .route("/login", get(login::login_form).post(login::login_submit))
        .route("/logout", get(logout::logout))
        .route("/admin", get(admin::admin))
        .route("/admin/*path", get(admin::admin))
        .layer(from_fn(middleware::require_session))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID_HEADER),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID_HEADER,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(auth)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(port: u16, auth: Arc<SessionAuthority>) -> Result<()> {
    auth.start();

    let app = router(auth.clone());

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    auth.stop();

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Gracefully shutdown"),
        Err(err) => {
            error!("Failed to listen for shutdown signal: {err}");
            std::future::pending::<()>().await;
        }
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
