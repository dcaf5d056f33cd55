//! Create/update input validation.

use modkit::FieldErrors;
use serde_json::Value;

use crate::contract::model::{NewTask, RawFields, TaskPatch};
use crate::domain::rules::{self, TITLE_MAX_CHARS, TITLE_MIN_CHARS};

pub const INVALID_COMPLETED: &str = "invalid value for completed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
}

/// Validated writable fields. Keys the client did not send stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl FieldSet {
    /// `None` when the title is missing, which a successful create rules out.
    pub fn into_new_task(self) -> Option<NewTask> {
        Some(NewTask {
            title: self.title?,
            completed: self.completed.unwrap_or(false),
        })
    }

    pub fn into_patch(self) -> TaskPatch {
        TaskPatch {
            title: self.title,
            completed: self.completed,
        }
    }
}

/// Validate a raw body for create or update.
///
/// All-or-nothing: either every present field is valid, or the full set of
/// field errors comes back. Keys other than `title` and `completed` are ignored.
pub fn normalize_mutation(raw: &RawFields, kind: MutationKind) -> Result<FieldSet, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut fields = FieldSet::default();

    if let Some(value) = raw.get("completed") {
        match rules::resolve_bool_value(value) {
            Some(b) => fields.completed = Some(b),
            None => {
                errors.insert("completed".into(), INVALID_COMPLETED.into());
            }
        }
    }

    match check_title(raw.get("title"), kind) {
        Ok(title) => fields.title = title,
        Err(msg) => {
            errors.insert("title".into(), msg);
        }
    }

    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(errors)
    }
}

fn check_title(value: Option<&Value>, kind: MutationKind) -> Result<Option<String>, String> {
    let required = || "The title field is required.".to_string();

    let title = match (value, kind) {
        (None, MutationKind::Update) => return Ok(None),
        (None | Some(Value::Null), MutationKind::Create) => return Err(required()),
        (Some(Value::String(s)), _) => s,
        (Some(_), _) => return Err("The title field must be a string.".to_string()),
    };

    if kind == MutationKind::Create && title.trim().is_empty() {
        return Err(required());
    }
    if !rules::title_length_ok(title) {
        return Err(format!(
            "The title field must be between {TITLE_MIN_CHARS} and {TITLE_MAX_CHARS} characters."
        ));
    }
    Ok(Some(title.clone()))
}
