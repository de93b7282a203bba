// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scooter catalog routes. Browsing is public; changes are admin-only.

use crate::error::{AppError, Result};
use crate::ids;
use crate::middleware::Caller;
use crate::models::booking::TIME_SLOTS;
use crate::models::catalog::ScooterModelInput;
use crate::models::ScooterModel;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/scooters", get(list_scooters).post(add_scooter))
        .route(
            "/api/scooters/{id}",
            get(get_scooter).put(update_scooter).delete(delete_scooter),
        )
        .route("/api/time-slots", get(list_time_slots))
}

async fn list_scooters(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ScooterModel>>> {
    Ok(Json(state.db.list_scooters().await?))
}

async fn get_scooter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ScooterModel>> {
    state
        .db
        .get_scooter(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Scooter model {} not found", id)))
}

async fn add_scooter(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(input): Json<ScooterModelInput>,
) -> Result<(StatusCode, Json<ScooterModel>)> {
    let admin = caller.require("Please login to manage the catalog")?;
    state.access.require_admin(&admin, "manage the catalog").await?;
    input.validate()?;

    let id = match input.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => {
            if state.db.get_scooter(id).await?.is_some() {
                return Err(AppError::Conflict(format!(
                    "Scooter model {} already exists",
                    id
                )));
            }
            id.to_string()
        }
        _ => ids::new_id(ids::MODEL)?,
    };

    let model = input.into_model(id);
    state.db.put_scooter(&model).await?;

    tracing::info!(admin = %admin.principal, model_id = %model.id, "Scooter model added");
    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_scooter(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    Json(input): Json<ScooterModelInput>,
) -> Result<Json<ScooterModel>> {
    let admin = caller.require("Please login to manage the catalog")?;
    state.access.require_admin(&admin, "manage the catalog").await?;
    input.validate()?;

    if state.db.get_scooter(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Scooter model {} not found", id)));
    }

    let model = input.into_model(id);
    state.db.put_scooter(&model).await?;

    tracing::info!(admin = %admin.principal, model_id = %model.id, "Scooter model updated");
    Ok(Json(model))
}

async fn delete_scooter(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let admin = caller.require("Please login to manage the catalog")?;
    state.access.require_admin(&admin, "manage the catalog").await?;

    if state.db.get_scooter(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Scooter model {} not found", id)));
    }
    state.db.delete_scooter(&id).await?;

    tracing::info!(admin = %admin.principal, model_id = %id, "Scooter model deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_time_slots() -> Json<Vec<&'static str>> {
    Json(TIME_SLOTS.to_vec())
}
