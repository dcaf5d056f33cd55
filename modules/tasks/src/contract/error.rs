use modkit::FieldErrors;
use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TasksError {
    #[error("Task not found: {id}")]
    NotFound { id: i64 },

    #[error("Validation error: {} invalid field(s)", errors.len())]
    Validation { errors: FieldErrors },

    #[error("Rejected by storage: {message}")]
    Rejected { message: String },

    #[error("Internal error")]
    Internal,
}

impl TasksError {
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation { errors }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for TasksError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            NotFound { id } => Self::not_found(id),
            Validation { errors } => Self::validation(errors),
            Persistence { message } => Self::rejected(message),
            Database { .. } => Self::internal(),
        }
    }
}
