//! Local page server for fetch and scrape tests.

use axum::http::{header::USER_AGENT, HeaderMap, StatusCode};
use axum::response::Html;
use axum::routing::get;
use axum::Router;

pub(crate) const ARTICLE_PAGE: &str = r#"<html>
<head><script>var tracking = true;</script></head>
<body>
<nav><a href="/">Home</a></nav>
<main>
<h1>Borrow   checker</h1>


<p>Every value has a single owner.</p>
</main>
<footer>Copyright</footer>
</body>
</html>"#;

/// Serve `/article` (200 HTML), `/gone` (404) and `/agent` (echoes the
/// User-Agent header) on an ephemeral port. Returns the base URL.
pub(crate) async fn serve_pages() -> String {
    let app = Router::new()
        .route("/article", get(|| async { Html(ARTICLE_PAGE) }))
        .route("/gone", get(|| async { (StatusCode::NOT_FOUND, "gone") }))
        .route(
            "/agent",
            get(|headers: HeaderMap| async move {
                headers
                    .get(USER_AGENT)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}
