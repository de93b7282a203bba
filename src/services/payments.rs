// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Payment session bridge between the storefront cart and Stripe Checkout.

use crate::db::Datastore;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::payment::{
    CheckoutRecord, CheckoutRequest, StoredStripeConfig, StripeConfiguration, StripeCredentials,
};
use crate::models::{CheckoutSession, StripeSessionStatus};
use crate::services::kms::KmsService;
use crate::services::stripe::{checkout_form_params, StripeClient};
use crate::time_utils::now_rfc3339;
use validator::Validate;

/// AAD binding the encrypted secret key to the settings document.
const STRIPE_CONFIG_AAD: &[u8] = b"stripe-config";

/// Stripe's `status` for a finished session.
const STRIPE_STATUS_COMPLETE: &str = "complete";

/// `payment_status` values meaning the funds are settled.
const SETTLED_PAYMENT_STATUSES: [&str; 2] = ["paid", "no_payment_required"];

pub struct PaymentService {
    db: Datastore,
    kms: KmsService,
    stripe: StripeClient,
}

impl PaymentService {
    pub fn new(db: Datastore, kms: KmsService, stripe: StripeClient) -> Self {
        Self { db, kms, stripe }
    }

    /// Store Stripe settings. The caller must already be checked as admin.
    pub async fn configure(&self, config: StripeConfiguration) -> Result<()> {
        config.validate()?;
        let allowed_countries = config
            .normalized_countries()
            .map_err(AppError::BadRequest)?;

        let secret_key_encrypted = self
            .kms
            .encrypt(config.secret_key.trim(), STRIPE_CONFIG_AAD)
            .await?;

        self.db
            .put_stripe_config(&StoredStripeConfig {
                secret_key_encrypted,
                allowed_countries,
                updated_at: now_rfc3339(),
            })
            .await?;

        tracing::info!(
            countries = ?config.allowed_countries,
            "Stripe configuration updated"
        );
        Ok(())
    }

    pub async fn is_configured(&self) -> Result<bool> {
        Ok(self.db.get_stripe_config().await?.is_some())
    }

    async fn credentials(&self) -> Result<StripeCredentials> {
        let stored = self
            .db
            .get_stripe_config()
            .await?
            .ok_or(AppError::PaymentNotConfigured)?;

        let secret_key = self
            .kms
            .decrypt(&stored.secret_key_encrypted, STRIPE_CONFIG_AAD)
            .await?;

        Ok(StripeCredentials {
            secret_key,
            allowed_countries: stored.allowed_countries,
        })
    }

    /// Create a hosted checkout session for the caller's cart.
    pub async fn create_checkout(
        &self,
        user: &AuthUser,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession> {
        request.validate()?;

        if let Some(first) = request.items.first() {
            let currency = first.currency.to_ascii_lowercase();
            if request
                .items
                .iter()
                .any(|item| item.currency.to_ascii_lowercase() != currency)
            {
                return Err(AppError::BadRequest(
                    "All items must use the same currency".to_string(),
                ));
            }
        }

        let credentials = self.credentials().await?;
        let params = checkout_form_params(
            &request.items,
            &request.success_url,
            &request.cancel_url,
            &user.principal,
            &credentials.allowed_countries,
        );

        let session = self
            .stripe
            .create_checkout_session(&credentials.secret_key, &params)
            .await?;

        tracing::info!(
            principal = %user.principal,
            session_id = %session.id,
            items = request.items.len(),
            "Checkout session created"
        );
        Ok(session)
    }

    /// Completion recorded by the webhook wins; otherwise ask Stripe.
    ///
    /// Only the session's own customer or an admin may see it.
    pub async fn session_status(
        &self,
        caller: &AuthUser,
        is_admin: bool,
        session_id: &str,
    ) -> Result<StripeSessionStatus> {
        if !crate::db::is_record_id(session_id) {
            return Err(AppError::NotFound(format!(
                "Checkout session {} not found",
                session_id
            )));
        }

        if let Some(record) = self.db.get_checkout_record(session_id).await? {
            if record.status == STRIPE_STATUS_COMPLETE {
                check_session_owner(caller, is_admin, record.principal.as_deref())?;
                return Ok(StripeSessionStatus::Completed {
                    response: record.response,
                    user_principal: record.principal,
                });
            }
        }

        let credentials = self.credentials().await?;
        let session = self.stripe.get_session(&credentials.secret_key, session_id).await?;
        check_session_owner(caller, is_admin, session["client_reference_id"].as_str())?;
        Ok(session_status_from(&session))
    }

    /// Record a finished checkout session from a webhook event payload.
    ///
    /// Sessions whose payment is still pending (delayed payment methods)
    /// are stored under their `payment_status` and not as completed.
    pub async fn record_completed(&self, session: &serde_json::Value) -> Result<()> {
        let session_id = session["id"]
            .as_str()
            .ok_or_else(|| AppError::BadRequest("Checkout session without id".to_string()))?;
        if !crate::db::is_record_id(session_id) {
            return Err(AppError::BadRequest(format!(
                "Invalid checkout session id {}",
                session_id
            )));
        }

        let status = if is_settled(session) {
            STRIPE_STATUS_COMPLETE
        } else {
            session["payment_status"].as_str().unwrap_or("unpaid")
        };

        let record = CheckoutRecord {
            session_id: session_id.to_string(),
            principal: session["client_reference_id"].as_str().map(str::to_string),
            status: status.to_string(),
            response: session.to_string(),
            updated_at: now_rfc3339(),
        };
        self.db.put_checkout_record(&record).await?;

        if status == STRIPE_STATUS_COMPLETE {
            tracing::info!(
                session_id,
                principal = ?record.principal,
                "Checkout session completed"
            );
        } else {
            tracing::info!(session_id, status, "Checkout session awaiting payment");
        }
        Ok(())
    }
}

fn is_settled(session: &serde_json::Value) -> bool {
    session["payment_status"]
        .as_str()
        .is_some_and(|p| SETTLED_PAYMENT_STATUSES.contains(&p))
}

fn check_session_owner(caller: &AuthUser, is_admin: bool, owner: Option<&str>) -> Result<()> {
    if is_admin || owner == Some(caller.principal.as_str()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Checkout session belongs to another customer".to_string(),
        ))
    }
}

fn session_status_from(session: &serde_json::Value) -> StripeSessionStatus {
    match session["status"].as_str() {
        Some(STRIPE_STATUS_COMPLETE) if is_settled(session) => StripeSessionStatus::Completed {
            response: session.to_string(),
            user_principal: session["client_reference_id"].as_str().map(str::to_string),
        },
        Some(STRIPE_STATUS_COMPLETE) => StripeSessionStatus::Failed {
            error: format!(
                "Checkout session payment is {}",
                session["payment_status"].as_str().unwrap_or("unpaid")
            ),
        },
        Some(other) => StripeSessionStatus::Failed {
            error: format!("Checkout session is {}", other),
        },
        None => StripeSessionStatus::Failed {
            error: "Checkout session has no status".to_string(),
        },
    }
}
