use api_lib::adapters::MemoryBlobStore;
use api_lib::config::Config;
use api_lib::web::{api_router, AppState};
use axum::body::{Body, Bytes};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use std::sync::Arc;

/// Router backed by a fresh in-memory store and default configuration.
pub fn create_test_app() -> (Router, Arc<MemoryBlobStore>) {
    let config = Config::from_lookup(|_| None).expect("default config is valid");
    let store = Arc::new(MemoryBlobStore::new());
    let state = Arc::new(AppState::new(store.clone(), Arc::new(config)));
    (api_router(state), store)
}

pub fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, user: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

pub async fn read_body(response: Response<Body>) -> (StatusCode, Bytes) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes)
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = read_body(response).await;
    let json = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        panic!(
            "expected JSON body, got: {}",
            String::from_utf8_lossy(&bytes)
        )
    });
    (status, json)
}
