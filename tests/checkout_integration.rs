// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Checkout against a fake Stripe API served on a local port.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use scooter_store::config::Config;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

mod common;
use common::{create_test_app_with, register, register_with_profile, send};

const SECRET_KEY: &str = "sk_test_fake_123456";

#[derive(Default)]
struct FakeStripe {
    /// Form bodies received on session creation
    created: Mutex<Vec<HashMap<String, String>>>,
    /// Authorization headers seen
    auth: Mutex<Vec<String>>,
}

async fn create_session(
    State(fake): State<Arc<FakeStripe>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    fake.auth.lock().unwrap().push(auth);
    fake.created.lock().unwrap().push(form);
    Json(json!({
        "id": "cs_test_fake",
        "object": "checkout.session",
        "url": "https://checkout.stripe.test/c/pay/cs_test_fake"
    }))
}

async fn get_session(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    match id.as_str() {
        "cs_paid" => (
            StatusCode::OK,
            Json(json!({
                "id": "cs_paid",
                "status": "complete",
                "payment_status": "paid",
                "client_reference_id": "alice"
            })),
        ),
        "cs_open" => (
            StatusCode::OK,
            Json(json!({ "id": "cs_open", "status": "open", "client_reference_id": "alice" })),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "message": "No such checkout.session" } })),
        ),
    }
}

/// Start the fake Stripe server and return its base URL.
async fn spawn_fake_stripe() -> (String, Arc<FakeStripe>) {
    let fake = Arc::new(FakeStripe::default());
    let app = Router::new()
        .route("/v1/checkout/sessions", post(create_session))
        .route("/v1/checkout/sessions/{id}", get(get_session))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1", addr), fake)
}

async fn configured_app() -> (Router, Arc<FakeStripe>, String) {
    let (base, fake) = spawn_fake_stripe().await;
    let config = Config {
        stripe_api_base: base,
        ..Config::test_default()
    };
    let (app, _) = create_test_app_with(config);

    let admin = register(&app, "owner").await;
    let (status, _) = send(
        &app,
        axum::http::Method::PUT,
        "/api/admin/payments/stripe",
        Some(&admin),
        Some(json!({ "secretKey": SECRET_KEY, "allowedCountries": ["us", "ca"] })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    (app, fake, admin)
}

fn cart() -> Value {
    json!({
        "items": [
            {
                "productName": "Volt X1",
                "productDescription": "City scooter",
                "priceInCents": 89900,
                "quantity": 1,
                "currency": "usd"
            },
            {
                "productName": "Helmet",
                "productDescription": "",
                "priceInCents": 4900,
                "quantity": 2,
                "currency": "usd"
            }
        ],
        "successUrl": "https://shop.example.com/payment-success",
        "cancelUrl": "https://shop.example.com/payment-failure"
    })
}

#[tokio::test]
async fn test_checkout_session_created() {
    let (app, fake, _) = configured_app().await;
    let alice = register_with_profile(&app, "alice").await;

    let (_, body) = send(&app, axum::http::Method::GET, "/api/payments/stripe", None, None).await;
    assert_eq!(body["configured"], true);

    let (status, body) = send(
        &app,
        axum::http::Method::POST,
        "/api/payments/checkout",
        Some(&alice),
        Some(cart()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["id"], "cs_test_fake");
    assert_eq!(body["url"], "https://checkout.stripe.test/c/pay/cs_test_fake");

    let created = fake.created.lock().unwrap();
    let form = &created[0];
    assert_eq!(form["mode"], "payment");
    assert_eq!(form["client_reference_id"], "alice");
    assert_eq!(
        form["success_url"],
        "https://shop.example.com/payment-success?session_id={CHECKOUT_SESSION_ID}"
    );
    assert_eq!(form["line_items[1][quantity]"], "2");
    assert_eq!(form["shipping_address_collection[allowed_countries][0]"], "US");
    assert_eq!(form["shipping_address_collection[allowed_countries][1]"], "CA");

    // Decrypted key reached Stripe
    assert_eq!(
        fake.auth.lock().unwrap()[0],
        format!("Bearer {}", SECRET_KEY)
    );
}

#[tokio::test]
async fn test_session_status_from_stripe() {
    let (app, _, _) = configured_app().await;
    let alice = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        axum::http::Method::GET,
        "/api/payments/checkout/cs_paid",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "completed");
    assert_eq!(body["userPrincipal"], "alice");
    assert!(body["response"].as_str().unwrap().contains("cs_paid"));

    let (_, body) = send(
        &app,
        axum::http::Method::GET,
        "/api/payments/checkout/cs_open",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(body["kind"], "failed");

    let (status, body) = send(
        &app,
        axum::http::Method::GET,
        "/api/payments/checkout/cs_unknown",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "payment_gateway_error");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("No such checkout.session"));
}

#[tokio::test]
async fn test_session_status_limited_to_owner() {
    let (app, _, admin) = configured_app().await;
    let bob = register(&app, "bob").await;

    let (status, body) = send(
        &app,
        axum::http::Method::GET,
        "/api/payments/checkout/cs_paid",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert!(body.get("response").is_none());

    let (status, body) = send(
        &app,
        axum::http::Method::GET,
        "/api/payments/checkout/cs_paid",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userPrincipal"], "alice");

    // Never forwarded to Stripe
    let (status, _) = send(
        &app,
        axum::http::Method::GET,
        "/api/payments/checkout/cs_paid%2F..%2Fx",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_requires_configuration() {
    let (app, _) = create_test_app_with(Config::test_default());
    let _admin = register(&app, "owner").await;
    let alice = register_with_profile(&app, "alice").await;

    let (status, body) = send(
        &app,
        axum::http::Method::POST,
        "/api/payments/checkout",
        Some(&alice),
        Some(cart()),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "payment_not_configured");
}

#[tokio::test]
async fn test_checkout_requires_profile() {
    let (app, _, _) = configured_app().await;
    let bob = register(&app, "bob").await;

    let (status, _) = send(
        &app,
        axum::http::Method::POST,
        "/api/payments/checkout",
        Some(&bob),
        Some(cart()),
    )
    .await;
    assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
}
