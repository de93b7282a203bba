// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Test ride and service appointment models.
//!
//! Booking statuses are free text by convention ("pending", "confirmed",
//! "completed", ...). Only the initial value is fixed.

use crate::error::AppError;
use crate::time_utils::parse_calendar_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Status given to every new booking.
pub const INITIAL_BOOKING_STATUS: &str = "pending";

const MAX_STATUS_LEN: usize = 32;

/// Bookable slots, shared by test rides and service appointments.
pub const TIME_SLOTS: [&str; 8] = [
    "09:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "02:00 PM", "03:00 PM", "04:00 PM", "05:00 PM",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ServiceType {
    Maintenance,
    Repairs,
    BatteryReplacement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TestRideBooking {
    pub id: String,
    pub status: String,
    pub customer: String,
    pub scooter_model_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub time_slot: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ServiceAppointment {
    pub id: String,
    pub status: String,
    pub service_type: ServiceType,
    pub customer: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub time_slot: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub timestamp: u64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTestRide {
    #[validate(length(min = 1, max = 64))]
    pub scooter_model_id: String,
    pub date: String,
    pub time_slot: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceAppointment {
    pub service_type: ServiceType,
    pub date: String,
    pub time_slot: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingStatusUpdate {
    pub status: String,
}

impl BookingStatusUpdate {
    /// Trimmed status, or a bad request if empty or overlong.
    pub fn normalized(&self) -> Result<String, AppError> {
        let status = self.status.trim();
        if status.is_empty() || status.chars().count() > MAX_STATUS_LEN {
            return Err(AppError::BadRequest(format!(
                "Status must be 1 to {} characters",
                MAX_STATUS_LEN
            )));
        }
        Ok(status.to_string())
    }
}

/// Check a requested date and slot. Returns the normalized date.
pub fn validate_schedule(date: &str, time_slot: &str, today: NaiveDate) -> Result<String, AppError> {
    let parsed = parse_calendar_date(date)
        .ok_or_else(|| AppError::BadRequest("Date must be formatted YYYY-MM-DD".to_string()))?;

    if parsed < today {
        return Err(AppError::BadRequest(
            "Date must not be in the past".to_string(),
        ));
    }

    if !TIME_SLOTS.contains(&time_slot) {
        return Err(AppError::BadRequest(format!(
            "Unknown time slot '{}'",
            time_slot
        )));
    }

    Ok(parsed.format("%Y-%m-%d").to_string())
}
