use async_trait::async_trait;

use crate::contract::model::{NewTask, Task, TaskPatch};
use crate::domain::query::TaskFilter;
use crate::domain::rules::Sort;

/// Port for the domain layer: the persistence operations the service needs.
///
/// Storage owns ids and timestamps: `store` assigns both, `update` refreshes
/// `updated_at`.
#[async_trait]
pub trait TasksRepository: Send + Sync {
    /// Insert and return the assigned id.
    async fn store(&self, task: NewTask) -> anyhow::Result<i64>;
    async fn find(&self, id: i64) -> anyhow::Result<Option<Task>>;
    /// Apply the set fields. Returns false if no row has that id.
    async fn update(&self, id: i64, patch: TaskPatch) -> anyhow::Result<bool>;
    /// Returns false if no row has that id.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
    /// One window of filtered, sorted rows plus the filtered total.
    async fn query(
        &self,
        filter: &TaskFilter,
        sort: Sort,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<(Vec<Task>, u64)>;
}
