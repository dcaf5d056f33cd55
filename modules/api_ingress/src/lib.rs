//! HTTP host for the server: owns the middleware stack, the operational
//! routes (health, OpenAPI, docs) and the listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
mod web;

pub use config::{ApiIngressConfig, DEFAULT_BODY_LIMIT_BYTES};

/// Handler timeout used when `server.timeout_sec` is 0.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    request_timeout: Duration,
    openapi: Option<Arc<serde_json::Value>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default(), DEFAULT_REQUEST_TIMEOUT)
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig, request_timeout: Duration) -> Self {
        let request_timeout = if request_timeout.is_zero() {
            DEFAULT_REQUEST_TIMEOUT
        } else {
            request_timeout
        };
        Self {
            config: ArcSwap::from_pointee(config),
            request_timeout,
            openapi: None,
        }
    }

    /// Attach the OpenAPI document served at `/openapi.json` when docs are enabled.
    pub fn with_openapi(mut self, doc: &utoipa::openapi::OpenApi) -> Result<Self> {
        let value = serde_json::to_value(doc).context("failed to render OpenAPI document")?;
        self.openapi = Some(Arc::new(value));
        Ok(self)
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    pub fn set_config(&self, config: ApiIngressConfig) {
        self.config.store(Arc::new(config));
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Wrap module routes into the served router.
    ///
    /// Request flow (outermost first): SetRequestId -> PropagateRequestId ->
    /// Trace -> Timeout -> CORS -> BodyLimit. Handlers read the id from the
    /// `x-request-id` header, e.g. through `modkit::ProblemCtx`.
    /// `Router::layer` wraps what is already there, so the calls below run
    /// innermost first.
    pub fn build_router(&self, routes: Router) -> Router {
        let config = self.get_config();

        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .route("/healthz", get(web::healthz))
            .merge(routes)
            .fallback(web::not_found);

        if config.enable_docs {
            if let Some(doc) = self.openapi.clone() {
                router = router
                    .route("/openapi.json", get(move || web::serve_openapi(doc.clone())))
                    .route("/docs", get(web::serve_docs));
            } else {
                tracing::debug!("docs enabled but no OpenAPI document attached");
            }
        }

        router = router
            .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
            .layer(DefaultBodyLimit::max(config.body_limit_bytes));

        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        let x_request_id = request_id::header();
        router
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(request_id::create_trace_layer())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    /// Bind `addr` and serve `router` until `cancel` fires.
    pub async fn serve(
        &self,
        router: Router,
        addr: SocketAddr,
        cancel: CancellationToken,
    ) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind HTTP listener on {addr}"))?;
        tracing::info!("HTTP server bound on {}", addr);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")
    }
}
