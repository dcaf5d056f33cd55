use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::api::rest::handlers::{self, PublicUrls};
use crate::domain::service::Service;

pub const COLLECTION_PATH: &str = "/tasks";
pub const ITEM_PATH: &str = "/tasks/{id}";

/// Mount the task routes. PATCH is an alias of PUT.
pub fn register_routes(router: Router, service: Arc<Service>, public_url: &str) -> Router {
    router
        .route(
            COLLECTION_PATH,
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            ITEM_PATH,
            get(handlers::get_task)
                .put(handlers::update_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .layer(Extension(service))
        .layer(Extension(PublicUrls::new(public_url)))
}
