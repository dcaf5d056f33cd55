//! # ModKit - shared HTTP toolkit
//!
//! Types every module's REST layer reaches for: RFC 9457 problem documents,
//! response helpers and page-number pagination with RFC 5988 links.

pub mod api;

pub use api::pagination::{PageLinks, PageWindow};
pub use api::request::ProblemCtx;
pub use api::problem::{
    bad_request, internal_error, not_found, unprocessable, FieldErrors, Problem, ProblemResponse,
};
