// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stripe configuration and checkout routes.

use crate::error::Result;
use crate::middleware::Caller;
use crate::models::payment::{CheckoutRequest, StripeConfiguration};
use crate::models::{CheckoutSession, StripeSessionStatus};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/payments/stripe", get(is_stripe_configured))
        .route("/api/admin/payments/stripe", put(configure_stripe))
        .route("/api/payments/checkout", post(create_checkout_session))
        .route(
            "/api/payments/checkout/{session_id}",
            get(get_checkout_status),
        )
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StripeConfiguredResponse {
    pub configured: bool,
}

async fn is_stripe_configured(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StripeConfiguredResponse>> {
    let configured = state.payments.is_configured().await?;
    Ok(Json(StripeConfiguredResponse { configured }))
}

async fn configure_stripe(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(config): Json<StripeConfiguration>,
) -> Result<StatusCode> {
    let admin = caller.require("Please login to configure payments")?;
    state.access.require_admin(&admin, "configure payments").await?;
    state.payments.configure(config).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_checkout_session(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutSession>> {
    let user = caller.require("Please login to purchase")?;
    state.access.require_profile(&user, "check out").await?;
    Ok(Json(state.payments.create_checkout(&user, request).await?))
}

async fn get_checkout_status(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(session_id): Path<String>,
) -> Result<Json<StripeSessionStatus>> {
    let user = caller.require("Please login to view payment status")?;
    let is_admin = state.access.is_admin(Some(user.principal.as_str())).await?;
    Ok(Json(
        state
            .payments
            .session_status(&user, is_admin, &session_id)
            .await?,
    ))
}
