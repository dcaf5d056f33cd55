use chrono::{DateTime, Utc};
use modkit::PageLinks;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::Task;
use crate::domain::query::PageResult;

/// `YYYY-MM-DD HH:MM:SS`, always UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&dt.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// Booleans travel as 0/1.
pub mod flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(b: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*b))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match u8::deserialize(d)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(de::Error::custom(format!("expected 0 or 1, got {other}"))),
        }
    }
}

/// REST representation of a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskDto {
    pub id: i64,
    pub title: String,
    #[serde(with = "flag")]
    #[schema(value_type = u8, minimum = 0, maximum = 1)]
    pub completed: bool,
    #[serde(with = "timestamp")]
    #[schema(value_type = String, example = "2025-01-31 09:30:00")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    #[schema(value_type = String, example = "2025-01-31 09:30:00")]
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskDto {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            completed: t.completed,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Body accepted by `POST /tasks`. Decoding is lenient; see the handler.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTaskReq {
    /// 3 to 255 characters.
    pub title: String,
    /// Boolean, 0/1, or one of `true false on off yes no` in any case.
    #[schema(value_type = Option<String>, example = "false")]
    pub completed: Option<serde_json::Value>,
}

/// Body accepted by `PUT`/`PATCH /tasks/{id}`; every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTaskReq {
    pub title: Option<String>,
    #[schema(value_type = Option<String>, example = "yes")]
    pub completed: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListFiltersDto {
    pub search: Option<String>,
    /// The resolved `completed` filter as a boolean: `?completed=yes` echoes
    /// `true`, not the raw token.
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListMetaDto {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
    /// Effective sort token, e.g. `-created_at`.
    pub sort: String,
    pub filters: ListFiltersDto,
}

/// Envelope returned by `GET /tasks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskListDto {
    pub data: Vec<TaskDto>,
    pub meta: ListMetaDto,
    pub links: PageLinks,
}

impl TaskListDto {
    pub fn new(page: PageResult, links: PageLinks) -> Self {
        let meta = ListMetaDto {
            page: page.query.window.page,
            per_page: page.query.window.per_page,
            total: page.total,
            total_pages: page.total_pages,
            sort: page.query.sort.to_string(),
            filters: ListFiltersDto {
                search: page.query.filter.search,
                completed: page.query.filter.completed,
            },
        };
        Self {
            data: page.items.into_iter().map(TaskDto::from).collect(),
            meta,
            links,
        }
    }
}
