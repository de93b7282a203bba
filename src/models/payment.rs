// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Payment models: cart items, checkout sessions, Stripe configuration.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// One cart line item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ShoppingItem {
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    #[validate(length(max = 500))]
    pub product_description: String,
    #[validate(range(min = 1))]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub price_in_cents: u64,
    #[validate(range(min = 1, max = 99))]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub quantity: u64,
    /// ISO 4217 code, e.g. "usd"
    #[validate(custom(function = "validate_currency"))]
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 20), nested)]
    pub items: Vec<ShoppingItem>,
    #[validate(length(max = 2048), custom(function = "validate_redirect_url"))]
    pub success_url: String,
    #[validate(length(max = 2048), custom(function = "validate_redirect_url"))]
    pub cancel_url: String,
}

/// Hosted checkout page to redirect the browser to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Outcome of a checkout session lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum StripeSessionStatus {
    Completed {
        /// Raw session JSON from Stripe
        response: String,
        #[serde(rename = "userPrincipal", skip_serializing_if = "Option::is_none")]
        user_principal: Option<String>,
    },
    Failed {
        error: String,
    },
}

/// Admin input for configuring Stripe.
#[derive(Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StripeConfiguration {
    #[validate(length(min = 8, max = 255), custom(function = "validate_secret_key"))]
    pub secret_key: String,
    #[validate(length(min = 1, max = 50))]
    pub allowed_countries: Vec<String>,
}

impl std::fmt::Debug for StripeConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfiguration")
            .field("secret_key", &"<redacted>")
            .field("allowed_countries", &self.allowed_countries)
            .finish()
    }
}

impl StripeConfiguration {
    /// Upper-case, trimmed, de-duplicated country codes. Errors name the first
    /// entry that is not a two-letter code.
    pub fn normalized_countries(&self) -> Result<Vec<String>, String> {
        let mut countries: Vec<String> = Vec::with_capacity(self.allowed_countries.len());
        for raw in &self.allowed_countries {
            let code = raw.trim().to_ascii_uppercase();
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(format!("Invalid country code '{}'", raw));
            }
            if !countries.contains(&code) {
                countries.push(code);
            }
        }
        Ok(countries)
    }
}

/// Stripe settings as stored; the key is KMS ciphertext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredStripeConfig {
    pub secret_key_encrypted: String,
    pub allowed_countries: Vec<String>,
    pub updated_at: String,
}

/// Decrypted settings used to call Stripe.
#[derive(Clone)]
pub struct StripeCredentials {
    pub secret_key: String,
    pub allowed_countries: Vec<String>,
}

/// Checkout session completion recorded from the webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRecord {
    pub session_id: String,
    pub principal: Option<String>,
    pub status: String,
    /// Raw session JSON from the webhook event
    pub response: String,
    pub updated_at: String,
}

fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::new("currency"))
    }
}

fn validate_redirect_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ValidationError::new("redirect_url"))
    }
}

fn validate_secret_key(key: &str) -> Result<(), ValidationError> {
    if key.trim().starts_with("sk_") {
        Ok(())
    } else {
        Err(ValidationError::new("stripe_secret_key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> ShoppingItem {
        ShoppingItem {
            product_name: "Volt X1".to_string(),
            product_description: "Electric scooter with 60km range".to_string(),
            price_in_cents: 89_900,
            quantity: 1,
            currency: "usd".to_string(),
        }
    }

    #[test]
    fn test_checkout_request_validation() {
        let request = CheckoutRequest {
            items: vec![item()],
            success_url: "https://shop.example.com/payment-success".to_string(),
            cancel_url: "https://shop.example.com/payment-failure".to_string(),
        };
        assert!(request.validate().is_ok());

        let empty = CheckoutRequest {
            items: vec![],
            ..request.clone()
        };
        assert!(empty.validate().is_err());

        let bad_item = CheckoutRequest {
            items: vec![ShoppingItem {
                currency: "dollars".to_string(),
                ..item()
            }],
            ..request.clone()
        };
        assert!(bad_item.validate().is_err());

        let bad_url = CheckoutRequest {
            success_url: "javascript:void(0)".to_string(),
            ..request
        };
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_session_status_wire_format() {
        let completed = StripeSessionStatus::Completed {
            response: "{}".to_string(),
            user_principal: Some("user-1".to_string()),
        };
        let json = serde_json::to_value(&completed).unwrap();
        assert_eq!(json["kind"], "completed");
        assert_eq!(json["userPrincipal"], "user-1");

        let failed = StripeSessionStatus::Failed {
            error: "expired".to_string(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["kind"], "failed");
        assert_eq!(json["error"], "expired");
    }

    #[test]
    fn test_country_normalization() {
        let config = StripeConfiguration {
            secret_key: "sk_test_123456".to_string(),
            allowed_countries: vec!["us".to_string(), " CA".to_string(), "US".to_string()],
        };
        assert_eq!(config.normalized_countries().unwrap(), vec!["US", "CA"]);

        let bad = StripeConfiguration {
            allowed_countries: vec!["USA".to_string()],
            ..config
        };
        assert!(bad.normalized_countries().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = StripeConfiguration {
            secret_key: "sk_live_super_secret".to_string(),
            allowed_countries: vec!["US".to_string()],
        };
        assert!(!format!("{:?}", config).contains("super_secret"));
    }
}
