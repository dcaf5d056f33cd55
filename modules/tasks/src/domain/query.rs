//! List-query normalization: raw query pairs in, a typed [`QuerySpec`] out.

use std::collections::HashMap;

use modkit::{FieldErrors, PageLinks, PageWindow};

use crate::contract::model::{Task, TaskPage};
use crate::domain::rules::{self, Sort, BOOL_TOKENS, SEARCH_MAX_CHARS};

/// Page-size bounds applied by [`normalize_list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimits {
    pub default_per_page: u64,
    pub max_per_page: u64,
}

impl Default for ListLimits {
    fn default() -> Self {
        Self {
            default_per_page: 10,
            max_per_page: 100,
        }
    }
}

/// Row filter; `None` fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of `title`, matched literally.
    pub search: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub window: PageWindow,
    pub filter: TaskFilter,
    pub sort: Sort,
}

/// Validate list parameters, reporting every invalid one at once.
///
/// Repeated keys resolve to their last occurrence; unknown keys are ignored.
pub fn normalize_list(
    raw: &[(String, String)],
    limits: ListLimits,
) -> Result<QuerySpec, FieldErrors> {
    let params: HashMap<&str, &str> = raw.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let mut errors = FieldErrors::new();

    let page = match params.get("page") {
        None => Some(1),
        Some(v) => rules::parse_positive(v),
    };
    if page.is_none() {
        errors.insert(
            "page".into(),
            "The page field must be a positive integer.".into(),
        );
    }

    let per_page = match params.get("per_page") {
        None => Some(limits.default_per_page),
        Some(v) => rules::parse_positive(v).filter(|n| *n <= limits.max_per_page),
    };
    if per_page.is_none() {
        errors.insert(
            "per_page".into(),
            format!(
                "The per_page field must be an integer between 1 and {}.",
                limits.max_per_page
            ),
        );
    }

    let search = params.get("search").map(|s| s.to_string());
    if matches!(&search, Some(s) if !rules::search_length_ok(s)) {
        errors.insert(
            "search".into(),
            format!("The search field must be between 1 and {SEARCH_MAX_CHARS} characters."),
        );
    }

    let completed = params.get("completed").map(|v| rules::resolve_bool(v));
    if matches!(completed, Some(None)) {
        errors.insert(
            "completed".into(),
            format!("The completed field must be one of: {}.", BOOL_TOKENS.join(", ")),
        );
    }

    let sort = match params.get("sort") {
        None => Some(Sort::default()),
        Some(v) => Sort::parse(v),
    };
    if sort.is_none() {
        errors.insert(
            "sort".into(),
            format!("The sort field must be one of: {}.", Sort::TOKENS.join(", ")),
        );
    }

    match (page, per_page, sort) {
        (Some(page), Some(per_page), Some(sort)) if errors.is_empty() => Ok(QuerySpec {
            window: PageWindow::new(page, per_page),
            filter: TaskFilter {
                search,
                completed: completed.flatten(),
            },
            sort,
        }),
        _ => Err(errors),
    }
}

/// A page of rows together with the query that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub query: QuerySpec,
    pub items: Vec<Task>,
    /// Rows matching the filter, ignoring pagination.
    pub total: u64,
    pub total_pages: u64,
}

impl PageResult {
    pub fn new(query: QuerySpec, items: Vec<Task>, total: u64) -> Self {
        let total_pages = query.window.total_pages(total);
        Self {
            query,
            items,
            total,
            total_pages,
        }
    }

    /// Navigation links under `base`, carrying over the caller's query.
    pub fn links(&self, base: &str, raw_query: &[(String, String)]) -> PageLinks {
        PageLinks::build(base, raw_query, self.query.window, self.total_pages)
    }

    pub fn into_page(self) -> TaskPage {
        TaskPage {
            page: self.query.window.page,
            per_page: self.query.window.per_page,
            total: self.total,
            total_pages: self.total_pages,
            items: self.items,
        }
    }
}
