// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Purchase order routes.

use crate::error::Result;
use crate::middleware::Caller;
use crate::models::order::{NewOrder, OrderStatusUpdate};
use crate::models::PurchaseOrder;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/orders", get(list_my_orders).post(create_order))
        .route("/api/admin/orders", get(list_all_orders))
        .route("/api/admin/orders/{id}/status", put(update_order_status))
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(input): Json<NewOrder>,
) -> Result<(StatusCode, Json<PurchaseOrder>)> {
    let user = caller.require("Please login to purchase")?;
    state.access.require_profile(&user, "place orders").await?;

    let order = state.workflow.place_order(&user, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_my_orders(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Vec<PurchaseOrder>>> {
    let user = caller.require("Please login to view your orders")?;
    state.access.require_user(&user, "view orders").await?;
    Ok(Json(state.db.list_orders_for(&user.principal).await?))
}

async fn list_all_orders(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Vec<PurchaseOrder>>> {
    let admin = caller.require("Please login to view orders")?;
    state.access.require_admin(&admin, "view all orders").await?;
    Ok(Json(state.db.list_orders().await?))
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    Json(update): Json<OrderStatusUpdate>,
) -> Result<Json<PurchaseOrder>> {
    let admin = caller.require("Please login to update orders")?;
    state.access.require_admin(&admin, "update order status").await?;
    Ok(Json(state.workflow.update_order_status(&id, update.status).await?))
}
