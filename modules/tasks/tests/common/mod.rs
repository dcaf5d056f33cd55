#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tasks::{config::TasksConfig, TasksModule};
use tower::ServiceExt;

/// One connection so every query sees the same in-memory database.
pub async fn memory_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite");
    TasksModule::migrate(&db).await.expect("migrate");
    db
}

pub async fn module_with(config: TasksConfig) -> TasksModule {
    TasksModule::new(memory_db().await, config).expect("module")
}

pub async fn app() -> Router {
    module_with(TasksConfig::default()).await.router()
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Reply {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> Reply {
    let resp = app.clone().oneshot(req).await.expect("infallible");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    Reply {
        status,
        headers,
        body,
    }
}

pub async fn call(app: &Router, method: Method, uri: &str, json: Option<Value>) -> Reply {
    let builder = Request::builder().method(method).uri(uri);
    let req = match json {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    send(app, req).await
}

pub async fn call_raw(app: &Router, method: Method, uri: &str, content_type: &str, body: &str) -> Reply {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_owned()))
        .expect("request");
    send(app, req).await
}

pub async fn create(app: &Router, json: Value) -> Value {
    let reply = call(app, Method::POST, "/tasks", Some(json)).await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body
}
