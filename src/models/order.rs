// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Purchase order models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Maximum scooters in a single order.
pub const MAX_ORDER_QUANTITY: u64 = 10;

/// Order lifecycle status. Any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// A customer's order for one scooter model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PurchaseOrder {
    pub id: String,
    pub status: OrderStatus,
    /// Principal that placed the order
    pub customer: String,
    pub scooter_model_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub quantity: u64,
    /// Unit price times quantity, in whole dollars
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_price: u64,
    /// Creation time (Unix ms)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub timestamp: u64,
}

/// Customer input for placing an order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[validate(length(min = 1, max = 64))]
    pub scooter_model_id: String,
    #[validate(range(min = 1, max = MAX_ORDER_QUANTITY))]
    pub quantity: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}
