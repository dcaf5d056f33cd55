//! Request body decoding for create/update.
//!
//! Accepts JSON objects and `application/x-www-form-urlencoded` forms and
//! hands the mutation validator a plain field map.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use modkit::{Problem, ProblemResponse};
use serde_json::Value;

use crate::contract::model::RawFields;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BodyError {
    #[error("Request body is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("Request body must be a JSON object.")]
    NotAnObject,
}

/// Empty bodies decode to an empty map; form values are always strings and
/// a repeated key keeps its last value.
pub fn decode_body(bytes: &[u8], is_form: bool) -> Result<RawFields, BodyError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(RawFields::new());
    }

    if is_form {
        return Ok(url::form_urlencoded::parse(bytes)
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(BodyError::NotAnObject),
        Err(e) => Err(BodyError::InvalidJson(e.to_string())),
    }
}

/// Extractor for a task write body.
#[derive(Debug, Clone, Default)]
pub struct TaskBody(pub RawFields);

impl<S> FromRequest<S> for TaskBody
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE));
        let instance = req.uri().path().to_owned();

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            let status = rejection.status();
            ProblemResponse(
                Problem::new(
                    status,
                    status.canonical_reason().unwrap_or("Bad Request"),
                    rejection.body_text(),
                )
                .with_code("TASKS_BODY_UNREADABLE")
                .with_instance(instance.clone()),
            )
        })?;

        decode_body(&bytes, is_form).map(TaskBody).map_err(|e| {
            ProblemResponse(
                modkit::bad_request(e.to_string())
                    .0
                    .with_code("TASKS_BODY_MALFORMED")
                    .with_instance(instance),
            )
        })
    }
}
