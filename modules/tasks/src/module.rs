use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::api::rest::{openapi::TasksApiDoc, routes};
use crate::config::TasksConfig;
use crate::contract::client::TasksApi;
use crate::domain::query::ListLimits;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::TasksLocalClient;
use crate::infra::storage::{Migrator, SeaOrmTasksRepository};

/// The tasks module: wires storage, domain service, REST routes and the
/// in-process client together.
#[derive(Clone)]
pub struct TasksModule {
    service: Arc<Service>,
    config: TasksConfig,
}

impl TasksModule {
    pub fn new(db: DatabaseConnection, config: TasksConfig) -> anyhow::Result<Self> {
        info!("Initializing tasks module");
        config.validate()?;
        debug!(
            "Loaded tasks config: default_per_page={}, max_per_page={}, public_url={:?}",
            config.default_per_page, config.max_per_page, config.public_url
        );

        // Wire repository (infra) to domain service (port)
        let repo = SeaOrmTasksRepository::new(db);
        let service_config = ServiceConfig {
            limits: ListLimits {
                default_per_page: config.default_per_page,
                max_per_page: config.max_per_page,
            },
        };
        let service = Service::new(Arc::new(repo), service_config);

        Ok(Self {
            service: Arc::new(service),
            config,
        })
    }

    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running tasks database migrations");
        Migrator::up(db, None).await?;
        info!("Tasks database migrations completed successfully");
        Ok(())
    }

    pub fn router(&self) -> Router {
        info!("Registering tasks REST routes");
        routes::register_routes(Router::new(), self.service.clone(), &self.config.public_url)
    }

    pub fn client(&self) -> Arc<dyn TasksApi> {
        Arc::new(TasksLocalClient::new(self.service.clone()))
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        TasksApiDoc::openapi()
    }
}
