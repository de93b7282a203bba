// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook route for Stripe events.

use crate::error::AppError;
use crate::services::stripe::verify_webhook_signature;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

const SIGNATURE_HEADER: &str = "stripe-signature";

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhooks/stripe", post(handle_event))
}

/// Stripe event envelope.
#[derive(Deserialize, Debug)]
struct StripeEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: StripeEventData,
}

#[derive(Deserialize, Debug)]
struct StripeEventData {
    object: serde_json::Value,
}

/// Handle incoming webhook events (POST).
///
/// The raw body is needed for signature verification, so it is parsed only
/// after the signature checks out.
async fn handle_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(secret) = state.config.stripe_webhook_secret.as_deref() else {
        return StatusCode::NOT_FOUND;
    };

    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        tracing::warn!("Stripe webhook without signature header");
        return StatusCode::BAD_REQUEST;
    };

    let now = chrono::Utc::now().timestamp();
    if let Err(reason) = verify_webhook_signature(signature, &body, secret, now) {
        tracing::warn!(reason, "Security Alert: Stripe webhook signature rejected");
        return StatusCode::BAD_REQUEST;
    }

    let event: StripeEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed Stripe event");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::info!(event_id = %event.id, event_type = %event.event_type, "Stripe webhook received");

    match event.event_type.as_str() {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
            match state.payments.record_completed(&event.data.object).await {
                Ok(()) => StatusCode::OK,
                Err(AppError::BadRequest(msg)) => {
                    tracing::warn!(event_id = %event.id, error = %msg, "Unusable checkout event");
                    StatusCode::BAD_REQUEST
                }
                Err(e) => {
                    tracing::error!(event_id = %event.id, error = %e, "Failed to record checkout");
                    // Non-2xx makes Stripe redeliver
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
        other => {
            tracing::debug!(event_type = other, "Ignoring Stripe event");
            StatusCode::OK
        }
    }
}
