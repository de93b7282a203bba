// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod booking;
pub mod catalog;
pub mod order;
pub mod payment;
pub mod user;

pub use booking::{ServiceAppointment, ServiceType, TestRideBooking};
pub use catalog::ScooterModel;
pub use order::{OrderStatus, PurchaseOrder};
pub use payment::{CheckoutSession, ShoppingItem, StripeSessionStatus};
pub use user::{ProfileRecord, RoleAssignment, SessionState, UserProfile, UserRole};
