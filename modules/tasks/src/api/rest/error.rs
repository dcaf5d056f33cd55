use axum::http::StatusCode;
use modkit::{FieldErrors, Problem, ProblemCtx, ProblemResponse};

use crate::domain::error::DomainError;

pub const TASK_NOT_FOUND: &str = "Task not found.";

/// Stamp the task error code, its type URI and the request context on a problem.
pub fn scoped(problem: Problem, code: &str, ctx: &ProblemCtx) -> ProblemResponse {
    ProblemResponse(ctx.apply(
        problem
            .with_type(format!("https://errors.example.com/{code}"))
            .with_code(code),
    ))
}

pub fn task_not_found(ctx: &ProblemCtx) -> ProblemResponse {
    scoped(modkit::not_found(TASK_NOT_FOUND).0, "TASKS_NOT_FOUND", ctx)
}

pub fn validation_failed(errors: FieldErrors, ctx: &ProblemCtx) -> ProblemResponse {
    scoped(
        modkit::unprocessable("One or more fields are invalid.", errors).0,
        "TASKS_VALIDATION",
        ctx,
    )
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, ctx: &ProblemCtx) -> ProblemResponse {
    match e {
        DomainError::NotFound { .. } => task_not_found(ctx),
        DomainError::Validation { errors } => validation_failed(errors.clone(), ctx),
        DomainError::Persistence { message } => {
            tracing::warn!(error = %message, "Storage rejected write");
            scoped(
                Problem::new(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Persistence error",
                    message.clone(),
                ),
                "TASKS_PERSISTENCE",
                ctx,
            )
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            scoped(
                modkit::internal_error("An internal database error occurred").0,
                "TASKS_INTERNAL_DB",
                ctx,
            )
        }
    }
}
