use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::contract::model::{RawFields, Task};
use crate::domain::error::DomainError;
use crate::domain::mutation::{normalize_mutation, MutationKind};
use crate::domain::query::{normalize_list, ListLimits, PageResult};
use crate::domain::repo::TasksRepository;

/// Domain service for tasks.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn TasksRepository>,
    config: ServiceConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub limits: ListLimits,
}

impl Service {
    pub fn new(repo: Arc<dyn TasksRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "tasks.service.list", skip(self, raw_query))]
    pub async fn list(&self, raw_query: &[(String, String)]) -> Result<PageResult, DomainError> {
        let query = normalize_list(raw_query, self.config.limits)?;
        debug!(
            page = query.window.page,
            per_page = query.window.per_page,
            sort = %query.sort,
            "Listing tasks"
        );

        let (items, total) = self
            .repo
            .query(
                &query.filter,
                query.sort,
                query.window.limit(),
                query.window.offset(),
            )
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;

        debug!("Listed {} of {} tasks", items.len(), total);
        Ok(PageResult::new(query, items, total))
    }

    #[instrument(name = "tasks.service.get", skip(self), fields(task_id = id))]
    pub async fn get(&self, id: i64) -> Result<Task, DomainError> {
        self.find_existing(id).await
    }

    #[instrument(name = "tasks.service.create", skip(self, raw))]
    pub async fn create(&self, raw: &RawFields) -> Result<Task, DomainError> {
        let new_task = normalize_mutation(raw, MutationKind::Create)?
            .into_new_task()
            .ok_or_else(|| DomainError::persistence("title missing after validation"))?;

        let id = self
            .repo
            .store(new_task)
            .await
            .map_err(|e| DomainError::persistence(format!("{e:#}")))?;

        let task = self
            .repo
            .find(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?
            .ok_or_else(|| DomainError::persistence(format!("task {id} was not readable after insert")))?;

        info!(task_id = task.id, "Created task");
        Ok(task)
    }

    /// Existence is checked before the body is validated, so an unknown id is
    /// always a not-found regardless of the payload.
    #[instrument(name = "tasks.service.update", skip(self, raw), fields(task_id = id))]
    pub async fn update(&self, id: i64, raw: &RawFields) -> Result<Task, DomainError> {
        let current = self.find_existing(id).await?;

        let patch = normalize_mutation(raw, MutationKind::Update)?.into_patch();
        if patch.is_empty() {
            debug!("No writable fields in update, returning current state");
            return Ok(current);
        }

        let updated = self
            .repo
            .update(id, patch)
            .await
            .map_err(|e| DomainError::persistence(format!("{e:#}")))?;
        if !updated {
            warn!("Task disappeared before update");
            return Err(DomainError::not_found(id));
        }

        let task = self.find_existing(id).await?;
        info!("Updated task");
        Ok(task)
    }

    #[instrument(name = "tasks.service.delete", skip(self), fields(task_id = id))]
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.find_existing(id).await?;

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::persistence(format!("{e:#}")))?;
        if !deleted {
            return Err(DomainError::not_found(id));
        }

        info!("Deleted task");
        Ok(())
    }

    async fn find_existing(&self, id: i64) -> Result<Task, DomainError> {
        self.repo
            .find(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?
            .ok_or_else(|| DomainError::not_found(id))
    }
}
