// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access control and the profile setup gate.
//!
//! Callers start as guests. `initialize` registers them: the first one
//! becomes admin (restricted to `BOOTSTRAP_ADMIN` when configured), everyone
//! after that becomes a user. Placing orders and booking additionally
//! require a saved profile.

use crate::db::Datastore;
use crate::error::{AppError, Result};
use crate::middleware::auth::{AuthUser, Caller};
use crate::models::{ProfileRecord, RoleAssignment, SessionState, UserProfile, UserRole};
use crate::time_utils::now_rfc3339;
use tokio::sync::Mutex;
use validator::Validate;

pub struct AccessControl {
    db: Datastore,
    bootstrap_admin: Option<String>,
    /// Serializes registration so two first callers cannot both become admin
    /// within this process.
    init_lock: Mutex<()>,
}

impl AccessControl {
    pub fn new(db: Datastore, bootstrap_admin: Option<String>) -> Self {
        Self {
            db,
            bootstrap_admin,
            init_lock: Mutex::new(()),
        }
    }

    // ─── Roles ───────────────────────────────────────────────────

    /// Register the caller if needed and return its role.
    pub async fn initialize(&self, user: &AuthUser) -> Result<UserRole> {
        let _guard = self.init_lock.lock().await;

        if let Some(existing) = self.db.get_role(&user.principal).await? {
            return Ok(existing.role);
        }

        let role = if self.may_bootstrap(&user.principal) && !self.db.has_admin().await? {
            UserRole::Admin
        } else {
            UserRole::User
        };

        self.db
            .set_role(&RoleAssignment {
                principal: user.principal.clone(),
                role,
                assigned_at: now_rfc3339(),
            })
            .await?;

        tracing::info!(principal = %user.principal, role = role.as_str(), "Registered caller");
        Ok(role)
    }

    fn may_bootstrap(&self, principal: &str) -> bool {
        match &self.bootstrap_admin {
            Some(admin) => admin == principal,
            None => true,
        }
    }

    /// Role of a principal; anonymous and unregistered callers are guests.
    pub async fn role_of(&self, principal: Option<&str>) -> Result<UserRole> {
        let Some(principal) = principal else {
            return Ok(UserRole::Guest);
        };
        Ok(self
            .db
            .get_role(principal)
            .await?
            .map(|a| a.role)
            .unwrap_or(UserRole::Guest))
    }

    pub async fn is_admin(&self, principal: Option<&str>) -> Result<bool> {
        Ok(self.role_of(principal).await? == UserRole::Admin)
    }

    /// Require the user (or admin) role. `action` completes "Only users can ...".
    pub async fn require_user(&self, user: &AuthUser, action: &str) -> Result<UserRole> {
        let role = self.role_of(Some(&user.principal)).await?;
        if !role.is_user() {
            return Err(AppError::Forbidden(format!("Only users can {}", action)));
        }
        Ok(role)
    }

    /// Require the admin role. `action` completes "Only admins can ...".
    pub async fn require_admin(&self, user: &AuthUser, action: &str) -> Result<()> {
        if !self.is_admin(Some(&user.principal)).await? {
            tracing::warn!(principal = %user.principal, action, "Non-admin attempted admin action");
            return Err(AppError::Forbidden(format!("Only admins can {}", action)));
        }
        Ok(())
    }

    /// Admin-only role change. Assigning `guest` removes the registration.
    pub async fn assign_role(&self, admin: &AuthUser, target: &str, role: UserRole) -> Result<()> {
        self.require_admin(admin, "assign roles").await?;

        let target = target.trim();
        if target.is_empty() {
            return Err(AppError::BadRequest("Principal must not be empty".to_string()));
        }

        let _guard = self.init_lock.lock().await;

        if role != UserRole::Admin {
            let admins = self.db.list_admins().await?;
            if admins.len() == 1 && admins[0].principal == target {
                return Err(AppError::Conflict(
                    "Cannot remove the last admin".to_string(),
                ));
            }
        }

        if role == UserRole::Guest {
            self.db.delete_role(target).await?;
        } else {
            self.db
                .set_role(&RoleAssignment {
                    principal: target.to_string(),
                    role,
                    assigned_at: now_rfc3339(),
                })
                .await?;
        }

        tracing::info!(
            admin = %admin.principal,
            principal = %target,
            role = role.as_str(),
            "Role assigned"
        );
        Ok(())
    }

    // ─── Profiles ────────────────────────────────────────────────

    pub async fn caller_profile(&self, user: &AuthUser) -> Result<Option<UserProfile>> {
        self.require_user(user, "view profiles").await?;
        Ok(self
            .db
            .get_profile(&user.principal)
            .await?
            .map(|r| r.profile()))
    }

    /// Save the caller's profile. Returns `true` only when it did not exist
    /// before, i.e. when this call cleared the setup gate.
    pub async fn save_profile(&self, user: &AuthUser, profile: UserProfile) -> Result<bool> {
        self.require_user(user, "save profiles").await?;

        let profile = profile.trimmed();
        profile.validate()?;

        let now = now_rfc3339();
        let existing = self.db.get_profile(&user.principal).await?;
        let created = existing.is_none();

        let record = ProfileRecord {
            principal: user.principal.clone(),
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            created_at: existing.map(|r| r.created_at).unwrap_or_else(|| now.clone()),
            updated_at: now,
        };
        self.db.put_profile(&record).await?;

        tracing::info!(principal = %user.principal, created, "Profile saved");
        Ok(created)
    }

    /// Another principal's profile; only for that principal or an admin.
    pub async fn user_profile(&self, caller: &AuthUser, target: &str) -> Result<Option<UserProfile>> {
        if caller.principal != target && !self.is_admin(Some(&caller.principal)).await? {
            return Err(AppError::Forbidden(
                "Can only view your own profile".to_string(),
            ));
        }
        Ok(self.db.get_profile(target).await?.map(|r| r.profile()))
    }

    /// Gate for actions that need a registered caller with a saved profile.
    pub async fn require_profile(&self, user: &AuthUser, action: &str) -> Result<ProfileRecord> {
        self.require_user(user, action).await?;
        self.db
            .get_profile(&user.principal)
            .await?
            .ok_or(AppError::ProfileRequired)
    }

    // ─── Session Gate ────────────────────────────────────────────

    pub async fn session(&self, caller: &Caller) -> Result<SessionState> {
        let Some(user) = caller.0.as_ref() else {
            return Ok(SessionState {
                authenticated: false,
                principal: None,
                role: UserRole::Guest,
                profile: None,
                profile_setup_required: false,
            });
        };

        let role = self.role_of(Some(&user.principal)).await?;
        let profile = self
            .db
            .get_profile(&user.principal)
            .await?
            .map(|r| r.profile());

        Ok(SessionState {
            authenticated: true,
            principal: Some(user.principal.clone()),
            role,
            profile_setup_required: profile.is_none(),
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(principal: &str) -> AuthUser {
        AuthUser {
            principal: principal.to_string(),
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_caller_becomes_admin() {
        let access = AccessControl::new(Datastore::in_memory(), None);

        assert_eq!(access.initialize(&user("first")).await.unwrap(), UserRole::Admin);
        assert_eq!(access.initialize(&user("second")).await.unwrap(), UserRole::User);
        // Idempotent
        assert_eq!(access.initialize(&user("first")).await.unwrap(), UserRole::Admin);
        assert_eq!(access.role_of(Some("nobody")).await.unwrap(), UserRole::Guest);
        assert_eq!(access.role_of(None).await.unwrap(), UserRole::Guest);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_restricts_first_admin() {
        let access = AccessControl::new(Datastore::in_memory(), Some("owner".to_string()));

        assert_eq!(access.initialize(&user("early")).await.unwrap(), UserRole::User);
        assert_eq!(access.initialize(&user("owner")).await.unwrap(), UserRole::Admin);
    }

    #[tokio::test]
    async fn test_cannot_demote_last_admin() {
        let access = AccessControl::new(Datastore::in_memory(), None);
        let admin = user("admin");
        access.initialize(&admin).await.unwrap();

        let result = access.assign_role(&admin, "admin", UserRole::User).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        access.assign_role(&admin, "deputy", UserRole::Admin).await.unwrap();
        access.assign_role(&admin, "admin", UserRole::User).await.unwrap();
        assert_eq!(access.role_of(Some("admin")).await.unwrap(), UserRole::User);
    }

    #[tokio::test]
    async fn test_profile_gate_clears_once() {
        let access = AccessControl::new(Datastore::in_memory(), None);
        let alice = user("alice");
        let caller = Caller(Some(alice.clone()));

        // Unregistered callers cannot save profiles
        assert!(matches!(
            access.save_profile(&alice, profile()).await,
            Err(AppError::Forbidden(_))
        ));

        access.initialize(&alice).await.unwrap();
        assert!(access.session(&caller).await.unwrap().profile_setup_required);
        assert!(matches!(
            access.require_profile(&alice, "place orders").await,
            Err(AppError::ProfileRequired)
        ));

        assert!(access.save_profile(&alice, profile()).await.unwrap());
        assert!(!access.session(&caller).await.unwrap().profile_setup_required);
        assert!(!access.save_profile(&alice, profile()).await.unwrap());
        assert!(access.require_profile(&alice, "place orders").await.is_ok());
    }

    #[tokio::test]
    async fn test_user_profile_visibility() {
        let access = AccessControl::new(Datastore::in_memory(), None);
        let admin = user("admin");
        let alice = user("alice");
        let bob = user("bob");
        for u in [&admin, &alice, &bob] {
            access.initialize(u).await.unwrap();
        }
        access.save_profile(&alice, profile()).await.unwrap();

        assert!(access.user_profile(&alice, "alice").await.unwrap().is_some());
        assert!(access.user_profile(&admin, "alice").await.unwrap().is_some());
        assert!(matches!(
            access.user_profile(&bob, "alice").await,
            Err(AppError::Forbidden(_))
        ));
    }
}
