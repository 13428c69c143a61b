//! Test helpers for driving the API router in-process

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tracker::services::MemoryAdapter;
use tracker::{Tracker, WeightMode};
use webserver::WebServer;

const BODY_LIMIT: usize = 1024 * 1024;

/// Router over a fresh memory-backed tracker
pub async fn test_router() -> (Router, JoinHandle<()>) {
    let (tracker, handle) = Tracker::new(MemoryAdapter::new(), WeightMode::Exact);
    let worker = tracker.start().await.unwrap();

    let address: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let router = WebServer::new(address, handle, "memory").build_router();
    (router, worker)
}

/// Send one request and decode the JSON answer
pub async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
