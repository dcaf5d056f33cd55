use async_trait::async_trait;

use crate::contract::{
    error::TasksError,
    model::{RawFields, Task, TaskPage},
};

/// In-process API of the tasks module.
///
/// Inputs are the same loose shapes the REST layer receives (ordered query
/// pairs, a field map); validation happens behind this trait.
#[async_trait]
pub trait TasksApi: Send + Sync {
    async fn list_tasks(&self, query: &[(String, String)]) -> Result<TaskPage, TasksError>;

    async fn get_task(&self, id: i64) -> Result<Task, TasksError>;

    async fn create_task(&self, fields: RawFields) -> Result<Task, TasksError>;

    async fn update_task(&self, id: i64, fields: RawFields) -> Result<Task, TasksError>;

    async fn delete_task(&self, id: i64) -> Result<(), TasksError>;
}
