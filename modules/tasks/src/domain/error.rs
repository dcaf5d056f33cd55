use modkit::FieldErrors;
use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Task not found: {id}")]
    NotFound { id: i64 },

    #[error("Validation failed for: {}", field_list(errors))]
    Validation { errors: FieldErrors },

    /// Storage refused a write that passed validation.
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Storage failed on a read path.
    #[error("Database error: {message}")]
    Database { message: String },
}

fn field_list(errors: &FieldErrors) -> String {
    errors.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
}

impl DomainError {
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation { errors }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<FieldErrors> for DomainError {
    fn from(errors: FieldErrors) -> Self {
        Self::validation(errors)
    }
}
