//! HTTP building blocks shared by module REST layers
//!
//! Problem documents for errors, small response helpers and page-number
//! pagination with navigation links.

pub mod pagination;
pub mod problem;
pub mod request;
pub mod response;

pub use pagination::{PageLinks, PageWindow};
pub use problem::{FieldErrors, Problem, ProblemResponse};
pub use request::ProblemCtx;
