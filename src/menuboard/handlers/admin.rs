use axum::response::{Html, IntoResponse};

// Menu editing itself is served by the content backend; this page only
// proves the session and links out.
const ADMIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Menu administration</title></head>
<body>
<h1>Menu administration</h1>
<p>You are signed in.</p>
<p><a href="/logout">Sign out</a></p>
</body>
</html>
"#;

#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Admin landing page", content_type = "text/html"),
        (status = 302, description = "No valid session; redirect to /login")
    ),
    tag = "admin"
)]
pub async fn admin() -> impl IntoResponse {
    Html(ADMIN_PAGE)
}
