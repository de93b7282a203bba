// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Scooter Store: backend for an electric scooter storefront
//!
//! This crate provides the HTTP API for browsing the scooter catalog,
//! placing orders, booking test rides and service appointments, and paying
//! through Stripe Checkout.

pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Datastore;
use services::{AccessControl, PaymentService, WorkflowService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Datastore,
    pub access: AccessControl,
    pub workflow: WorkflowService,
    pub payments: PaymentService,
}

impl AppState {
    /// Wire the services over a datastore and KMS key.
    pub fn new(config: Config, db: Datastore, kms: services::KmsService) -> Self {
        let stripe = services::StripeClient::new(config.stripe_api_base.clone());
        Self {
            access: AccessControl::new(db.clone(), config.bootstrap_admin.clone()),
            workflow: WorkflowService::new(db.clone()),
            payments: PaymentService::new(db.clone(), kms, stripe),
            config,
            db,
        }
    }
}
