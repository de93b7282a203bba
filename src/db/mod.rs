// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Datastore layer (Firestore, or in-process memory for dev/tests).

pub mod firestore;
pub mod memory;
pub mod store;

pub use store::Datastore;

/// Collection names as constants.
pub mod collections {
    pub const USER_ROLES: &str = "user_roles";
    pub const USER_PROFILES: &str = "user_profiles";
    pub const SCOOTER_MODELS: &str = "scooter_models";
    pub const PURCHASE_ORDERS: &str = "purchase_orders";
    pub const TEST_RIDES: &str = "test_rides";
    pub const SERVICE_APPOINTMENTS: &str = "service_appointments";
    /// Singleton settings documents (Stripe configuration)
    pub const SETTINGS: &str = "settings";
    /// Checkout sessions completed via webhook (keyed by session id)
    pub const CHECKOUT_SESSIONS: &str = "checkout_sessions";
}

/// Document id for principal-keyed documents. Principals come from the
/// identity provider and may contain characters Firestore rejects in ids.
pub fn principal_doc_id(principal: &str) -> String {
    urlencoding::encode(principal).into_owned()
}

/// Whether `id` can name a record document. Record ids are generated by the
/// server, chosen by an admin, or issued by Stripe, and never need more than
/// ASCII alphanumerics, `-` and `_`. Anything else cannot exist in the store.
pub fn is_record_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 255
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
