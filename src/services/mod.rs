// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod access;
pub mod kms;
pub mod payments;
pub mod stripe;
pub mod workflow;

pub use access::AccessControl;
pub use kms::KmsService;
pub use payments::PaymentService;
pub use stripe::StripeClient;
pub use workflow::WorkflowService;
