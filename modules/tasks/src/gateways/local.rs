use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::TasksApi,
    error::TasksError,
    model::{RawFields, Task, TaskPage},
};
use crate::domain::service::Service;

/// Local implementation of the TasksApi trait that delegates to the domain service
pub struct TasksLocalClient {
    service: Arc<Service>,
}

impl TasksLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TasksApi for TasksLocalClient {
    async fn list_tasks(&self, query: &[(String, String)]) -> Result<TaskPage, TasksError> {
        self.service
            .list(query)
            .await
            .map(|page| page.into_page())
            .map_err(Into::into)
    }

    async fn get_task(&self, id: i64) -> Result<Task, TasksError> {
        self.service.get(id).await.map_err(Into::into)
    }

    async fn create_task(&self, fields: RawFields) -> Result<Task, TasksError> {
        self.service.create(&fields).await.map_err(Into::into)
    }

    async fn update_task(&self, id: i64, fields: RawFields) -> Result<Task, TasksError> {
        self.service.update(id, &fields).await.map_err(Into::into)
    }

    async fn delete_task(&self, id: i64) -> Result<(), TasksError> {
        self.service.delete(id).await.map_err(Into::into)
    }
}
