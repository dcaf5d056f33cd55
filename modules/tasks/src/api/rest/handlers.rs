use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Extension,
};
use modkit::api::response::{created_json, no_content, ok_json};
use modkit::{ProblemCtx, ProblemResponse};
use tracing::{debug, info, warn};

use crate::api::rest::body::TaskBody;
use crate::api::rest::dto::{CreateTaskReq, TaskDto, TaskListDto, UpdateTaskReq};
use crate::api::rest::error::{map_domain_error, task_not_found};
use crate::domain::rules;
use crate::domain::service::Service;

pub const X_TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

/// Absolute (or path-relative) URLs for link building; `public_url` is
/// prepended to every route path.
#[derive(Clone, Debug, Default)]
pub struct PublicUrls {
    base: Arc<str>,
}

impl PublicUrls {
    pub fn new(public_url: &str) -> Self {
        Self {
            base: public_url.trim_end_matches('/').into(),
        }
    }

    pub fn collection(&self) -> String {
        format!("{}/tasks", self.base)
    }

    pub fn task(&self, id: i64) -> String {
        format!("{}/tasks/{id}", self.base)
    }
}

/// Positive decimal ids only; anything else cannot name a task.
fn parse_task_id(raw: &str) -> Option<i64> {
    rules::parse_positive(raw).and_then(|n| i64::try_from(n).ok())
}

fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// List tasks
#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    operation_id = "tasks.list_tasks",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number (default 1)"),
        ("per_page" = Option<u64>, Query, description = "Page size, 1 to 100 (default 10)"),
        ("search" = Option<String>, Query, description = "Case-insensitive substring of title"),
        ("completed" = Option<String>, Query, description = "0, 1, true, false, on, off, yes or no"),
        ("sort" = Option<String>, Query, description = "id, title, created_at or updated_at; prefix with - for descending (default -created_at)"),
    ),
    responses(
        (status = 200, description = "One page of tasks", body = TaskListDto,
            headers(
                ("X-Total-Count" = u64, description = "Tasks matching the filter"),
                ("Link" = String, description = "RFC 5988 next, prev, first and last links"),
            )),
        (status = 422, description = "Invalid query parameters", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_tasks(
    Extension(svc): Extension<Arc<Service>>,
    Extension(urls): Extension<PublicUrls>,
    ctx: ProblemCtx,
    RawQuery(raw): RawQuery,
) -> Result<Response, ProblemResponse> {
    let query = parse_query(raw.as_deref());
    debug!("Listing tasks with query: {:?}", query);

    let page = svc.list(&query).await.map_err(|e| {
        debug!(error = %e, "Failed to list tasks");
        map_domain_error(&e, &ctx)
    })?;

    let links = page.links(&urls.collection(), &query);
    let link_header = links.link_header();
    let total = page.total;

    let mut resp = ok_json(TaskListDto::new(page, links)).into_response();
    let headers = resp.headers_mut();
    headers.insert(X_TOTAL_COUNT, HeaderValue::from(total));
    match HeaderValue::from_str(&link_header) {
        Ok(v) => {
            headers.insert(header::LINK, v);
        }
        Err(e) => warn!(error = %e, "Link header not representable, omitted"),
    }
    Ok(resp)
}

/// Get a task by id
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "tasks",
    operation_id = "tasks.get_task",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task found", body = TaskDto),
        (status = 404, description = "Not Found", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_task(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemCtx,
    Path(raw_id): Path<String>,
) -> Result<Response, ProblemResponse> {
    let id = parse_task_id(&raw_id).ok_or_else(|| task_not_found(&ctx))?;
    debug!("Getting task with id: {}", id);

    match svc.get(id).await {
        Ok(task) => Ok(ok_json(TaskDto::from(task)).into_response()),
        Err(e) => {
            debug!("Failed to get task {}: {}", id, e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Create a task
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    operation_id = "tasks.create_task",
    request_body(content = CreateTaskReq, description = "JSON object or urlencoded form"),
    responses(
        (status = 201, description = "Created task", body = TaskDto,
            headers(("Location" = String, description = "URL of the new task"))),
        (status = 400, description = "Malformed body", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 422, description = "Validation failed", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_task(
    Extension(svc): Extension<Arc<Service>>,
    Extension(urls): Extension<PublicUrls>,
    ctx: ProblemCtx,
    TaskBody(fields): TaskBody,
) -> Result<Response, ProblemResponse> {
    info!("Creating task");

    match svc.create(&fields).await {
        Ok(task) => {
            let location = urls.task(task.id);
            Ok(created_json(&location, TaskDto::from(task)))
        }
        Err(e) => {
            debug!("Failed to create task: {}", e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Update a task (partial)
#[utoipa::path(
    method(put, patch),
    path = "/tasks/{id}",
    tag = "tasks",
    operation_id = "tasks.update_task",
    params(("id" = i64, Path, description = "Task id")),
    request_body(content = UpdateTaskReq, description = "Fields to change; absent fields are kept"),
    responses(
        (status = 200, description = "Updated task", body = TaskDto),
        (status = 400, description = "Malformed body", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 422, description = "Validation failed", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_task(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemCtx,
    Path(raw_id): Path<String>,
    TaskBody(fields): TaskBody,
) -> Result<Response, ProblemResponse> {
    let id = parse_task_id(&raw_id).ok_or_else(|| task_not_found(&ctx))?;
    info!("Updating task {}", id);

    match svc.update(id, &fields).await {
        Ok(task) => Ok(ok_json(TaskDto::from(task)).into_response()),
        Err(e) => {
            debug!("Failed to update task {}: {}", id, e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "tasks",
    operation_id = "tasks.delete_task",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn delete_task(
    Extension(svc): Extension<Arc<Service>>,
    ctx: ProblemCtx,
    Path(raw_id): Path<String>,
) -> Result<Response, ProblemResponse> {
    let id = parse_task_id(&raw_id).ok_or_else(|| task_not_found(&ctx))?;
    info!("Deleting task {}", id);

    match svc.delete(id).await {
        Ok(()) => Ok(no_content().into_response()),
        Err(e) => {
            debug!("Failed to delete task {}: {}", id, e);
            Err(map_domain_error(&e, &ctx))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_ids_must_be_positive_decimals() {
        assert_eq!(parse_task_id("12"), Some(12));
        assert_eq!(parse_task_id("0"), None);
        assert_eq!(parse_task_id("-3"), None);
        assert_eq!(parse_task_id("abc"), None);
        assert_eq!(parse_task_id("9223372036854775808"), None);
    }

    #[test]
    fn public_urls_prefix_paths() {
        let rel = PublicUrls::new("");
        assert_eq!(rel.collection(), "/tasks");
        assert_eq!(rel.task(5), "/tasks/5");

        let abs = PublicUrls::new("https://api.example.com/v1/");
        assert_eq!(abs.collection(), "https://api.example.com/v1/tasks");
        assert_eq!(abs.task(5), "https://api.example.com/v1/tasks/5");
    }

    #[test]
    fn query_pairs_keep_order_and_decode() {
        let q = parse_query(Some("search=milk%20run&page=2&search=x+y"));
        assert_eq!(
            q,
            vec![
                ("search".to_string(), "milk run".to_string()),
                ("page".to_string(), "2".to_string()),
                ("search".to_string(), "x y".to_string()),
            ]
        );
        assert!(parse_query(None).is_empty());
    }
}
