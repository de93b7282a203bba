// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Test ride and service appointment routes.

use crate::error::Result;
use crate::middleware::Caller;
use crate::models::booking::{BookingStatusUpdate, NewServiceAppointment, NewTestRide};
use crate::models::{ServiceAppointment, TestRideBooking};
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
        .route("/api/test-rides", get(list_my_test_rides).post(book_test_ride))
        .route("/api/admin/test-rides", get(list_all_test_rides))
        .route(
            "/api/admin/test-rides/{id}/status",
            put(update_test_ride_status),
        )
        .route(
            "/api/service-appointments",
            get(list_my_service_appointments).post(book_service),
        )
        .route(
            "/api/admin/service-appointments",
            get(list_all_service_appointments),
        )
        .route(
            "/api/admin/service-appointments/{id}/status",
            put(update_service_status),
        )
}

// ─── Test Rides ──────────────────────────────────────────────

async fn book_test_ride(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(input): Json<NewTestRide>,
) -> Result<(StatusCode, Json<TestRideBooking>)> {
    let user = caller.require("Please login to book a test ride")?;
    state.access.require_profile(&user, "book test rides").await?;

    let booking = state.workflow.book_test_ride(&user, input).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn list_my_test_rides(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Vec<TestRideBooking>>> {
    let user = caller.require("Please login to view your test rides")?;
    state.access.require_user(&user, "view test rides").await?;
    Ok(Json(state.db.list_test_rides_for(&user.principal).await?))
}

async fn list_all_test_rides(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Vec<TestRideBooking>>> {
    let admin = caller.require("Please login to view test rides")?;
    state.access.require_admin(&admin, "view all test rides").await?;
    Ok(Json(state.db.list_test_rides().await?))
}

async fn update_test_ride_status(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    Json(update): Json<BookingStatusUpdate>,
) -> Result<Json<TestRideBooking>> {
    let admin = caller.require("Please login to update test rides")?;
    state
        .access
        .require_admin(&admin, "update test ride status")
        .await?;
    let status = update.normalized()?;
    Ok(Json(state.workflow.update_test_ride_status(&id, status).await?))
}

// ─── Service Appointments ────────────────────────────────────

async fn book_service(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(input): Json<NewServiceAppointment>,
) -> Result<(StatusCode, Json<ServiceAppointment>)> {
    let user = caller.require("Please login to book a service")?;
    state.access.require_profile(&user, "book services").await?;

    let appointment = state.workflow.book_service(&user, input).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn list_my_service_appointments(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Vec<ServiceAppointment>>> {
    let user = caller.require("Please login to view your service appointments")?;
    state
        .access
        .require_user(&user, "view service appointments")
        .await?;
    Ok(Json(
        state
            .db
            .list_service_appointments_for(&user.principal)
            .await?,
    ))
}

async fn list_all_service_appointments(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Vec<ServiceAppointment>>> {
    let admin = caller.require("Please login to view service appointments")?;
    state
        .access
        .require_admin(&admin, "view all service appointments")
        .await?;
    Ok(Json(state.db.list_service_appointments().await?))
}

async fn update_service_status(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    Json(update): Json<BookingStatusUpdate>,
) -> Result<Json<ServiceAppointment>> {
    let admin = caller.require("Please login to update service appointments")?;
    state
        .access
        .require_admin(&admin, "update service status")
        .await?;
    let status = update.normalized()?;
    Ok(Json(state.workflow.update_service_status(&id, status).await?))
}
