// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scooter catalog models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// A purchasable scooter model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScooterModel {
    pub id: String,
    pub name: String,
    /// Range on a full charge (km)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub range: u64,
    /// Top speed (km/h)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub top_speed: u64,
    /// Full charge time (hours)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub charging_time: u64,
    /// Unit price in whole dollars
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub price: u64,
    /// Image URL
    pub image: String,
}

/// Admin input for adding or replacing a model.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScooterModelInput {
    /// Optional on create; generated when absent. Ignored on update.
    #[serde(default)]
    #[validate(length(max = 64), custom(function = "validate_model_id"))]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 1))]
    pub range: u64,
    #[validate(range(min = 1))]
    pub top_speed: u64,
    #[validate(range(min = 1))]
    pub charging_time: u64,
    #[validate(range(min = 1))]
    pub price: u64,
    #[validate(length(min = 1, max = 2048), custom(function = "validate_image_ref"))]
    pub image: String,
}

impl ScooterModelInput {
    pub fn into_model(self, id: String) -> ScooterModel {
        ScooterModel {
            id,
            name: self.name.trim().to_string(),
            range: self.range,
            top_speed: self.top_speed,
            charging_time: self.charging_time,
            price: self.price,
            image: self.image.trim().to_string(),
        }
    }
}

/// Model ids end up in URL paths and document ids.
fn validate_model_id(id: &str) -> Result<(), ValidationError> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("model_id"))
    }
}

/// Absolute http(s) URL or a site-relative asset path.
fn validate_image_ref(image: &str) -> Result<(), ValidationError> {
    let image = image.trim();
    if image.starts_with("https://") || image.starts_with("http://") || image.starts_with('/') {
        Ok(())
    } else {
        Err(ValidationError::new("image_url"))
    }
}
