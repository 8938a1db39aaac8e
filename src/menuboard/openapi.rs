use super::handlers::{admin, health, login, logout};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "menuboard",
        description = "Restaurant menu admin authentication"
    ),
    paths(
        health::health,
        login::login_form,
        login::login_submit,
        logout::logout,
        admin::admin,
    ),
    components(schemas(health::Health, login::LoginForm)),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Admin login and logout"),
        (name = "admin", description = "Session-protected admin pages")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    // Keep the document version in step with the crate.
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_auth_routes() {
        let doc = openapi();
        for path in ["/health", "/login", "/logout", "/admin"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));
    }
}
