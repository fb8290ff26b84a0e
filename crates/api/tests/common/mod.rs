#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use maintrack_core::photos::DEFAULT_MAX_UPLOAD_BYTES;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use maintrack_api::config::{ServerConfig, StorageConfig};
use maintrack_api::router::build_app_router;
use maintrack_api::state::AppState;
use maintrack_api::storage;
use maintrack_api::ws::WsManager;

pub const PUBLIC_BASE_URL: &str = "http://localhost:3000/photos";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and local photo storage under `photo_dir`.
pub fn test_config(photo_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        storage: StorageConfig::Local {
            dir: photo_dir.to_string_lossy().into_owned(),
            public_base_url: PUBLIC_BASE_URL.to_string(),
        },
    }
}

/// Build the full application router over `pool`, going through
/// [`build_app_router`] so tests hit the production middleware stack.
///
/// Photos land in the returned [`TempDir`]; keep it bound for as long as the
/// router is in use. The directory is removed when it drops.
pub async fn build_test_app(pool: PgPool) -> (Router, TempDir) {
    let photo_dir = tempfile::Builder::new()
        .prefix("maintrack-photos-")
        .tempdir()
        .expect("create temp photo dir");
    let config = test_config(photo_dir.path());
    let storage = storage::from_config(&config.storage)
        .await
        .expect("create test storage dir");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        storage,
    };

    (build_app_router(state, &config), photo_dir)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, body)).await
}

/// POST with no body and no content type.
pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a multipart body with a single `file` field.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Response<Body> {
    let boundary = "maintrack-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a machine through the API and return its id.
pub async fn create_machine(pool: &PgPool, name: &str) -> i64 {
    let (app, _photos) = build_test_app(pool.clone()).await;
    let response = post_json(
        app,
        "/api/v1/machines",
        serde_json::json!({"name": name, "location": "Line 1"}),
    )
    .await;
    let json = body_json(response).await;
    json["data"]["id"].as_i64().unwrap()
}
