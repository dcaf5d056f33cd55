use std::sync::Arc;

use axum::{
    http::header,
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// The document is rendered once at router build time.
pub async fn serve_openapi(doc: Arc<Value>) -> Response {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json((*doc).clone()),
    )
        .into_response()
}

pub async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Tasks API Docs</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}

pub async fn not_found(uri: axum::http::Uri) -> modkit::ProblemResponse {
    let mut resp = modkit::not_found(format!("No route for {}", uri.path()));
    resp.0 = resp.0.with_instance(uri.path()).with_code("ROUTE_NOT_FOUND");
    resp
}
