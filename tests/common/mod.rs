// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{Request, StatusCode};
use predik_engagement::config::Config;
use predik_engagement::routes::create_router;
use predik_engagement::store::MemStore;
use predik_engagement::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Matches `Config::test_default()`.
#[allow(dead_code)]
pub const ADMIN_TOKEN: &str = "test_admin_token";

/// Create a test app backed by the in-memory store.
/// Returns the router and a handle to the store for direct seeding.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<MemStore>) {
    let config = Config::test_default();
    let store = Arc::new(MemStore::new());

    let state = Arc::new(AppState {
        config,
        store: store.clone(),
    });

    (create_router(state), store)
}

/// Send a JSON request and decode the JSON response.
#[allow(dead_code)]
pub async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    admin_token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = admin_token {
        builder = builder.header("x-admin-token", token);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Create a user through the API and return the response body.
#[allow(dead_code)]
pub async fn create_user(app: &axum::Router, wallet: &str) -> Value {
    let (status, body) = request(
        app,
        "POST",
        "/api/users",
        Some(serde_json::json!({ "walletAddress": wallet })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

/// Create a task through the admin API and return its id.
#[allow(dead_code)]
pub async fn create_task(app: &axum::Router, task: Value) -> i64 {
    let (status, body) = request(app, "POST", "/api/tasks", Some(task), Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

/// Complete a task for a wallet via the global completion endpoint.
#[allow(dead_code)]
pub async fn complete_task(
    app: &axum::Router,
    wallet: &str,
    task_id: i64,
) -> (StatusCode, Value) {
    request(
        app,
        "POST",
        "/api/tasks/complete",
        Some(serde_json::json!({ "walletAddress": wallet, "taskId": task_id })),
        None,
    )
    .await
}
