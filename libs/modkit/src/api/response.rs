use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// 200 OK + JSON
pub fn ok_json<T: serde::Serialize>(value: T) -> impl IntoResponse {
    (StatusCode::OK, Json(value))
}

/// 201 Created + `Location` + JSON
///
/// An unrepresentable location is dropped from the headers (and logged)
/// rather than failing a write that already happened.
pub fn created_json<T: serde::Serialize>(location: &str, value: T) -> Response {
    let mut resp = (StatusCode::CREATED, Json(value)).into_response();
    match HeaderValue::from_str(location) {
        Ok(v) => {
            resp.headers_mut().insert(header::LOCATION, v);
        }
        Err(e) => tracing::warn!(%location, error = %e, "Invalid Location header value"),
    }
    resp
}

/// 204 No Content
pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
