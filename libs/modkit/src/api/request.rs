//! Per-request context for error documents.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::api::problem::Problem;

/// Request id from `x-request-id`, falling back to `x-trace-id`.
pub fn extract_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .or_else(|| headers.get("x-trace-id"))
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// What a handler needs to stamp a [`Problem`]: the request path for
/// `instance` and the request id, when there is one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemCtx {
    pub instance: String,
    pub request_id: Option<String>,
}

impl ProblemCtx {
    pub fn apply(&self, problem: Problem) -> Problem {
        let problem = problem.with_instance(self.instance.clone());
        match &self.request_id {
            Some(id) => problem.with_request_id(id.clone()),
            None => problem,
        }
    }
}

impl<S> FromRequestParts<S> for ProblemCtx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            instance: parts.uri.path().to_owned(),
            request_id: extract_request_id(&parts.headers),
        })
    }
}
