// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scooter Store API Server
//!
//! Backend for an electric scooter storefront: catalog, orders, test rides,
//! service appointments and Stripe Checkout payments.

use scooter_store::{
    config::{Config, StoreBackend},
    db::Datastore,
    services::KmsService,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// KMS key protecting the Stripe secret key.
const PAYMENT_KEY_NAME: &str = "payment-secrets";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        "Starting Scooter Store API"
    );

    let db = match config.store_backend {
        StoreBackend::Firestore => Datastore::firestore(&config.gcp_project_id).await?,
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory datastore; data is lost on restart");
            Datastore::in_memory()
        }
    };

    let kms = init_kms(&config).await?;

    if config.stripe_webhook_secret.is_none() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set; Stripe webhook disabled");
    }

    let state = Arc::new(AppState::new(config.clone(), db, kms));

    // Build router
    let app = scooter_store::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Cloud KMS in production. Debug builds running on the memory backend use
/// the offline mock so local development needs no GCP credentials.
async fn init_kms(config: &Config) -> Result<KmsService, Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    {
        if config.store_backend == StoreBackend::Memory {
            tracing::warn!("Using mock KMS (debug build, memory backend)");
            return Ok(KmsService::new_mock());
        }
    }

    let kms = KmsService::new(&config.gcp_project_id, &config.gcp_region, PAYMENT_KEY_NAME).await?;
    Ok(kms)
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scooter_store=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
