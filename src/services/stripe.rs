// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stripe REST client for hosted checkout sessions.
//!
//! Handles:
//! - Checkout session creation (form-encoded, `mode=payment`)
//! - Session retrieval
//! - Webhook signature verification

use crate::error::AppError;
use crate::models::{CheckoutSession, ShoppingItem};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a webhook signature timestamp, in seconds.
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Placeholder Stripe substitutes with the session id on redirect.
const SESSION_ID_PLACEHOLDER: &str = "session_id={CHECKOUT_SESSION_ID}";

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    base_url: String,
}

impl StripeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a hosted checkout session.
    pub async fn create_checkout_session(
        &self,
        secret_key: &str,
        params: &[(String, String)],
    ) -> Result<CheckoutSession, AppError> {
        let url = format!("{}/checkout/sessions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(secret_key)
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::PaymentGateway(format!("Stripe request failed: {}", e)))?;

        let body = self.check_response_json(response).await?;

        let id = body["id"].as_str();
        let url = body["url"].as_str();
        match (id, url) {
            (Some(id), Some(url)) => Ok(CheckoutSession {
                id: id.to_string(),
                url: url.to_string(),
            }),
            _ => Err(AppError::PaymentGateway(
                "Stripe response missing session id or url".to_string(),
            )),
        }
    }

    /// Fetch a checkout session as raw JSON.
    pub async fn get_session(
        &self,
        secret_key: &str,
        session_id: &str,
    ) -> Result<serde_json::Value, AppError> {
        let url = format!(
            "{}/checkout/sessions/{}",
            self.base_url,
            urlencoding::encode(session_id)
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(secret_key)
            .send()
            .await
            .map_err(|e| AppError::PaymentGateway(format!("Stripe request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    async fn check_response_json(
        &self,
        response: reqwest::Response,
    ) -> Result<serde_json::Value, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(body);

            if status.as_u16() == 429 {
                tracing::warn!("Stripe rate limit hit (429)");
            }
            return Err(AppError::PaymentGateway(format!(
                "HTTP {}: {}",
                status, message
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::PaymentGateway(format!("Invalid Stripe response: {}", e)))
    }
}

/// Form parameters for `POST /checkout/sessions`.
pub fn checkout_form_params(
    items: &[ShoppingItem],
    success_url: &str,
    cancel_url: &str,
    principal: &str,
    allowed_countries: &[String],
) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), with_session_placeholder(success_url)),
        ("cancel_url".to_string(), cancel_url.to_string()),
        ("client_reference_id".to_string(), principal.to_string()),
    ];

    for (i, item) in items.iter().enumerate() {
        let prefix = format!("line_items[{}]", i);
        params.push((
            format!("{}[price_data][currency]", prefix),
            item.currency.to_ascii_lowercase(),
        ));
        params.push((
            format!("{}[price_data][product_data][name]", prefix),
            item.product_name.clone(),
        ));
        if !item.product_description.is_empty() {
            params.push((
                format!("{}[price_data][product_data][description]", prefix),
                item.product_description.clone(),
            ));
        }
        params.push((
            format!("{}[price_data][unit_amount]", prefix),
            item.price_in_cents.to_string(),
        ));
        params.push((format!("{}[quantity]", prefix), item.quantity.to_string()));
    }

    for (i, country) in allowed_countries.iter().enumerate() {
        params.push((
            format!("shipping_address_collection[allowed_countries][{}]", i),
            country.clone(),
        ));
    }

    params
}

fn with_session_placeholder(url: &str) -> String {
    if url.contains("session_id=") {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&{}", url, SESSION_ID_PLACEHOLDER)
    } else {
        format!("{}?{}", url, SESSION_ID_PLACEHOLDER)
    }
}

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=...]`).
///
/// Any `v1` entry matching HMAC-SHA256(secret, "{t}.{payload}") is accepted
/// as long as `t` is within [`WEBHOOK_TOLERANCE_SECS`] of `now_secs`.
pub fn verify_webhook_signature(
    header: &str,
    payload: &[u8],
    secret: &str,
    now_secs: i64,
) -> Result<(), &'static str> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", t)) => timestamp = Some(t),
            Some(("v1", v)) => signatures.push(v),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or("Missing timestamp")?;
    if signatures.is_empty() {
        return Err("Missing v1 signature");
    }

    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    let skew = now_secs.checked_sub(ts).map(i64::unsigned_abs);
    if !matches!(skew, Some(s) if s <= WEBHOOK_TOLERANCE_SECS.unsigned_abs()) {
        return Err("Timestamp outside tolerance");
    }

    let expected = sign_payload(timestamp, payload, secret)?;

    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| bool::from(bytes.ct_eq(&expected)))
            .unwrap_or(false)
    });
    if matched {
        Ok(())
    } else {
        Err("Signature mismatch")
    }
}

/// Raw HMAC-SHA256 of `"{timestamp}.{payload}"`.
pub fn sign_payload(timestamp: &str, payload: &[u8], secret: &str) -> Result<Vec<u8>, &'static str> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}
