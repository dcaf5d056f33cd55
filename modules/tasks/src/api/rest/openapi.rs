use utoipa::OpenApi;

use crate::api::rest::dto::{
    CreateTaskReq, ListFiltersDto, ListMetaDto, TaskDto, TaskListDto, UpdateTaskReq,
};
use crate::api::rest::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tasks API",
        description = "Task CRUD with paginated, filterable listing"
    ),
    paths(
        handlers::list_tasks,
        handlers::create_task,
        handlers::get_task,
        handlers::update_task,
        handlers::delete_task,
    ),
    components(schemas(
        TaskDto,
        TaskListDto,
        ListMetaDto,
        ListFiltersDto,
        CreateTaskReq,
        UpdateTaskReq,
        modkit::Problem,
        modkit::PageLinks,
    )),
    tags((name = "tasks", description = "Task management"))
)]
pub struct TasksApiDoc;
