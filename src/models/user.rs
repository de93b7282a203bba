// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile, role and session-gate models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Contact details a signed-in customer provides once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 3, max = 32))]
    pub phone: String,
}

impl UserProfile {
    /// Strip surrounding whitespace from every field.
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

/// Profile document as stored (keyed by principal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub principal: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ProfileRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Coarse access classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

impl UserRole {
    /// Admins may do everything a user may do.
    pub fn is_user(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::User)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
            UserRole::Guest => "guest",
        }
    }
}

/// Role registration document (keyed by principal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub principal: String,
    pub role: UserRole,
    pub assigned_at: String,
}

/// What the client needs to decide whether to show the setup prompt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionState {
    pub authenticated: bool,
    pub principal: Option<String>,
    pub role: UserRole,
    pub profile: Option<UserProfile>,
    pub profile_setup_required: bool,
}
