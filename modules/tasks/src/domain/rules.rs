//! Field rules shared by the list normalizer and the mutation validator.

use std::fmt;

use serde_json::Value;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 255;
pub const SEARCH_MAX_CHARS: usize = 255;

/// Tokens accepted wherever a boolean is expected, in display order.
pub const BOOL_TOKENS: [&str; 8] = ["0", "1", "true", "false", "on", "off", "yes", "no"];

/// Case-insensitive: `1 true on yes` are true, `0 false off no` are false,
/// anything else (the empty string included) is unresolved.
pub fn resolve_bool(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// JSON flavour of [`resolve_bool`]: native booleans, the integers 0 and 1,
/// and token strings.
pub fn resolve_bool_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => resolve_bool(s),
        _ => None,
    }
}

/// ASCII digits only; no sign, no whitespace, no overflow, at least 1.
pub fn parse_positive(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u64>().ok().filter(|n| *n >= 1)
}

pub fn title_length_ok(title: &str) -> bool {
    (TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title.chars().count())
}

pub fn search_length_ok(search: &str) -> bool {
    (1..=SEARCH_MAX_CHARS).contains(&search.chars().count())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    Title,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "created_at" => Some(Self::CreatedAt),
            "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort order; a leading `-` in the token means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl Sort {
    /// Every accepted `sort` token.
    pub const TOKENS: [&'static str; 8] = [
        "id",
        "-id",
        "title",
        "-title",
        "created_at",
        "-created_at",
        "updated_at",
        "-updated_at",
    ];

    /// Exact, case-sensitive match against [`Sort::TOKENS`].
    pub fn parse(token: &str) -> Option<Self> {
        let (direction, name) = match token.strip_prefix('-') {
            Some(rest) => (SortDirection::Desc, rest),
            None => (SortDirection::Asc, token),
        };
        SortField::from_name(name).map(|field| Self { field, direction })
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.direction == SortDirection::Desc {
            f.write_str("-")?;
        }
        f.write_str(self.field.as_str())
    }
}
