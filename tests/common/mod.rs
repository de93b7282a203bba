// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use scooter_store::config::Config;
use scooter_store::db::Datastore;
use scooter_store::middleware::auth::create_jwt;
use scooter_store::routes::create_router;
use scooter_store::services::KmsService;
use scooter_store::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test app on the in-memory store with mock KMS.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        config,
        Datastore::in_memory(),
        KmsService::new_mock(),
    ));
    (create_router(state.clone()), state)
}

/// Session token for `principal`, signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(principal: &str) -> String {
    create_jwt(principal, &Config::test_default().jwt_signing_key).unwrap()
}

/// Send a JSON request and return status plus parsed body (`Null` if empty).
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Register `principal` and return its token.
#[allow(dead_code)]
pub async fn register(app: &Router, principal: &str) -> String {
    let token = create_test_jwt(principal);
    let (status, _) = send(app, Method::POST, "/api/access/initialize", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    token
}

/// Register `principal` and save a profile so gated actions are allowed.
#[allow(dead_code)]
pub async fn register_with_profile(app: &Router, principal: &str) -> String {
    let token = register(app, principal).await;
    let (status, _) = send(
        app,
        Method::PUT,
        "/api/profile",
        Some(&token),
        Some(json!({
            "name": format!("{} Rider", principal),
            "email": format!("{}@example.com", principal),
            "phone": "555-0100"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    token
}

/// Add a scooter model as admin and return its id.
#[allow(dead_code)]
pub async fn add_model(app: &Router, admin_token: &str, name: &str, price: u64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/scooters",
        Some(admin_token),
        Some(json!({
            "name": name,
            "range": 60,
            "topSpeed": 35,
            "chargingTime": 5,
            "price": price,
            "image": "https://cdn.example.com/scooter.png"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add model failed: {}", body);
    body["id"].as_str().unwrap().to_string()
}

/// A booking date safely in the future.
#[allow(dead_code)]
pub fn future_date() -> String {
    (chrono::Utc::now().date_naive() + chrono::Days::new(7))
        .format("%Y-%m-%d")
        .to_string()
}
