// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session, access control and profile routes.

use crate::error::{AppError, Result};
use crate::middleware::Caller;
use crate::models::{SessionState, UserProfile, UserRole};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Session, role and profile routes. Identity is resolved in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/access/initialize", post(initialize_access))
        .route("/api/access/role", get(get_role))
        .route("/api/access/admin", get(get_is_admin))
        .route("/api/access/roles", put(assign_role))
        .route("/api/profile", get(get_profile).put(save_profile))
        .route("/api/users/{principal}/profile", get(get_user_profile))
}

// ─── Session ─────────────────────────────────────────────────

async fn get_session(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<SessionState>> {
    Ok(Json(state.access.session(&caller).await?))
}

// ─── Access Control ──────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RoleResponse {
    pub role: UserRole,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AdminResponse {
    pub is_admin: bool,
}

#[derive(Deserialize)]
pub struct AssignRoleRequest {
    pub principal: String,
    pub role: UserRole,
}

/// Register the caller; the first one becomes admin.
async fn initialize_access(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<RoleResponse>> {
    let user = caller.require("Please login to continue")?;
    let role = state.access.initialize(&user).await?;
    Ok(Json(RoleResponse { role }))
}

async fn get_role(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<RoleResponse>> {
    let role = state.access.role_of(caller.principal()).await?;
    Ok(Json(RoleResponse { role }))
}

async fn get_is_admin(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<AdminResponse>> {
    let is_admin = state.access.is_admin(caller.principal()).await?;
    Ok(Json(AdminResponse { is_admin }))
}

async fn assign_role(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(request): Json<AssignRoleRequest>,
) -> Result<Json<RoleResponse>> {
    let admin = caller.require("Please login to manage roles")?;
    state
        .access
        .assign_role(&admin, &request.principal, request.role)
        .await?;
    Ok(Json(RoleResponse { role: request.role }))
}

// ─── Profiles ────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub profile: Option<UserProfile>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SaveProfileResponse {
    pub profile: UserProfile,
    /// True only when this save created the profile.
    pub created: bool,
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<ProfileResponse>> {
    let user = caller.require("Please login to view your profile")?;
    let profile = state.access.caller_profile(&user).await?;
    Ok(Json(ProfileResponse { profile }))
}

async fn save_profile(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(profile): Json<UserProfile>,
) -> Result<Json<SaveProfileResponse>> {
    let user = caller.require("Please login to save your profile")?;
    let created = state.access.save_profile(&user, profile).await?;

    let profile = state
        .access
        .caller_profile(&user)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Profile missing after save")))?;

    Ok(Json(SaveProfileResponse { profile, created }))
}

async fn get_user_profile(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(principal): Path<String>,
) -> Result<Json<ProfileResponse>> {
    let user = caller.require("Please login to view profiles")?;
    let profile = state.access.user_profile(&user, &principal).await?;
    Ok(Json(ProfileResponse { profile }))
}
