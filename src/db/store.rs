// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed datastore operations over either backend.
//!
//! Provides high-level operations for:
//! - Roles and profiles (keyed by principal)
//! - Scooter catalog
//! - Orders, test rides and service appointments
//! - Stripe settings and completed checkout sessions

use super::firestore::FirestoreStore;
use super::memory::MemoryStore;
use super::{collections, is_record_id, principal_doc_id};
use crate::error::AppError;
use crate::models::payment::{CheckoutRecord, StoredStripeConfig};
use crate::models::{
    ProfileRecord, PurchaseOrder, RoleAssignment, ScooterModel, ServiceAppointment,
    TestRideBooking, UserRole,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

const STRIPE_SETTINGS_DOC: &str = "stripe";

#[derive(Clone)]
enum Backend {
    Firestore(FirestoreStore),
    Memory(Arc<MemoryStore>),
}

/// Application datastore.
#[derive(Clone)]
pub struct Datastore {
    backend: Backend,
}

impl Datastore {
    /// Connect to Firestore (or the emulator when FIRESTORE_EMULATOR_HOST is set).
    pub async fn firestore(project_id: &str) -> Result<Self, AppError> {
        Ok(Self {
            backend: Backend::Firestore(FirestoreStore::new(project_id).await?),
        })
    }

    /// Empty in-process store.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::new())),
        }
    }

    // ─── Generic Document Operations ─────────────────────────────

    async fn get<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(db) => db.get(collection, id).await,
            Backend::Memory(mem) => mem.get(collection, id),
        }
    }

    async fn put<T>(&self, collection: &str, id: &str, doc: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        match &self.backend {
            Backend::Firestore(db) => db.put(collection, id, doc).await,
            Backend::Memory(mem) => mem.put(collection, id, doc),
        }
    }

    /// Fetch a record by caller-supplied id; malformed ids are simply absent.
    async fn get_record<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        if !is_record_id(id) {
            return Ok(None);
        }
        self.get(collection, id).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.delete(collection, id).await,
            Backend::Memory(mem) => {
                mem.delete(collection, id);
                Ok(())
            }
        }
    }

    async fn list<T>(&self, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(db) => db.list(collection).await,
            Backend::Memory(mem) => mem.list(collection),
        }
    }

    async fn list_where<T>(
        &self,
        collection: &str,
        field: &'static str,
        value: &str,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(db) => db.list_where(collection, field, value).await,
            Backend::Memory(mem) => mem.list_where(collection, field, value),
        }
    }

    // ─── Role Operations ─────────────────────────────────────────

    pub async fn get_role(&self, principal: &str) -> Result<Option<RoleAssignment>, AppError> {
        self.get(collections::USER_ROLES, &principal_doc_id(principal))
            .await
    }

    pub async fn set_role(&self, assignment: &RoleAssignment) -> Result<(), AppError> {
        self.put(
            collections::USER_ROLES,
            &principal_doc_id(&assignment.principal),
            assignment,
        )
        .await
    }

    pub async fn delete_role(&self, principal: &str) -> Result<(), AppError> {
        self.delete(collections::USER_ROLES, &principal_doc_id(principal))
            .await
    }

    /// All principals currently holding the admin role.
    pub async fn list_admins(&self) -> Result<Vec<RoleAssignment>, AppError> {
        self.list_where(collections::USER_ROLES, "role", UserRole::Admin.as_str())
            .await
    }

    /// Whether any principal currently holds the admin role.
    pub async fn has_admin(&self) -> Result<bool, AppError> {
        Ok(!self.list_admins().await?.is_empty())
    }

    // ─── Profile Operations ──────────────────────────────────────

    pub async fn get_profile(&self, principal: &str) -> Result<Option<ProfileRecord>, AppError> {
        self.get(collections::USER_PROFILES, &principal_doc_id(principal))
            .await
    }

    pub async fn put_profile(&self, record: &ProfileRecord) -> Result<(), AppError> {
        self.put(
            collections::USER_PROFILES,
            &principal_doc_id(&record.principal),
            record,
        )
        .await
    }

    // ─── Catalog Operations ──────────────────────────────────────

    pub async fn get_scooter(&self, id: &str) -> Result<Option<ScooterModel>, AppError> {
        self.get_record(collections::SCOOTER_MODELS, id).await
    }

    /// All scooter models, sorted by name.
    pub async fn list_scooters(&self) -> Result<Vec<ScooterModel>, AppError> {
        let mut models: Vec<ScooterModel> = self.list(collections::SCOOTER_MODELS).await?;
        models.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(models)
    }

    pub async fn put_scooter(&self, model: &ScooterModel) -> Result<(), AppError> {
        self.put(collections::SCOOTER_MODELS, &model.id, model).await
    }

    pub async fn delete_scooter(&self, id: &str) -> Result<(), AppError> {
        if !is_record_id(id) {
            return Ok(());
        }
        self.delete(collections::SCOOTER_MODELS, id).await
    }

    // ─── Order Operations ────────────────────────────────────────

    pub async fn get_order(&self, id: &str) -> Result<Option<PurchaseOrder>, AppError> {
        self.get_record(collections::PURCHASE_ORDERS, id).await
    }

    pub async fn put_order(&self, order: &PurchaseOrder) -> Result<(), AppError> {
        self.put(collections::PURCHASE_ORDERS, &order.id, order).await
    }

    pub async fn list_orders(&self) -> Result<Vec<PurchaseOrder>, AppError> {
        let mut orders: Vec<PurchaseOrder> = self.list(collections::PURCHASE_ORDERS).await?;
        newest_first(&mut orders, |o| (o.timestamp, o.id.as_str()));
        Ok(orders)
    }

    pub async fn list_orders_for(&self, principal: &str) -> Result<Vec<PurchaseOrder>, AppError> {
        let mut orders: Vec<PurchaseOrder> = self
            .list_where(collections::PURCHASE_ORDERS, "customer", principal)
            .await?;
        newest_first(&mut orders, |o| (o.timestamp, o.id.as_str()));
        Ok(orders)
    }

    // ─── Test Ride Operations ────────────────────────────────────

    pub async fn get_test_ride(&self, id: &str) -> Result<Option<TestRideBooking>, AppError> {
        self.get_record(collections::TEST_RIDES, id).await
    }

    pub async fn put_test_ride(&self, booking: &TestRideBooking) -> Result<(), AppError> {
        self.put(collections::TEST_RIDES, &booking.id, booking).await
    }

    pub async fn list_test_rides(&self) -> Result<Vec<TestRideBooking>, AppError> {
        let mut rides: Vec<TestRideBooking> = self.list(collections::TEST_RIDES).await?;
        newest_first(&mut rides, |r| (r.timestamp, r.id.as_str()));
        Ok(rides)
    }

    pub async fn list_test_rides_for(
        &self,
        principal: &str,
    ) -> Result<Vec<TestRideBooking>, AppError> {
        let mut rides: Vec<TestRideBooking> = self
            .list_where(collections::TEST_RIDES, "customer", principal)
            .await?;
        newest_first(&mut rides, |r| (r.timestamp, r.id.as_str()));
        Ok(rides)
    }

    // ─── Service Appointment Operations ──────────────────────────

    pub async fn get_service_appointment(
        &self,
        id: &str,
    ) -> Result<Option<ServiceAppointment>, AppError> {
        self.get_record(collections::SERVICE_APPOINTMENTS, id).await
    }

    pub async fn put_service_appointment(
        &self,
        appointment: &ServiceAppointment,
    ) -> Result<(), AppError> {
        self.put(
            collections::SERVICE_APPOINTMENTS,
            &appointment.id,
            appointment,
        )
        .await
    }

    pub async fn list_service_appointments(&self) -> Result<Vec<ServiceAppointment>, AppError> {
        let mut appointments: Vec<ServiceAppointment> =
            self.list(collections::SERVICE_APPOINTMENTS).await?;
        newest_first(&mut appointments, |a| (a.timestamp, a.id.as_str()));
        Ok(appointments)
    }

    pub async fn list_service_appointments_for(
        &self,
        principal: &str,
    ) -> Result<Vec<ServiceAppointment>, AppError> {
        let mut appointments: Vec<ServiceAppointment> = self
            .list_where(collections::SERVICE_APPOINTMENTS, "customer", principal)
            .await?;
        newest_first(&mut appointments, |a| (a.timestamp, a.id.as_str()));
        Ok(appointments)
    }

    // ─── Payment Settings ────────────────────────────────────────

    pub async fn get_stripe_config(&self) -> Result<Option<StoredStripeConfig>, AppError> {
        self.get(collections::SETTINGS, STRIPE_SETTINGS_DOC).await
    }

    pub async fn put_stripe_config(&self, config: &StoredStripeConfig) -> Result<(), AppError> {
        self.put(collections::SETTINGS, STRIPE_SETTINGS_DOC, config)
            .await
    }

    pub async fn get_checkout_record(
        &self,
        session_id: &str,
    ) -> Result<Option<CheckoutRecord>, AppError> {
        self.get_record(collections::CHECKOUT_SESSIONS, session_id).await
    }

    pub async fn put_checkout_record(&self, record: &CheckoutRecord) -> Result<(), AppError> {
        self.put(collections::CHECKOUT_SESSIONS, &record.session_id, record)
            .await
    }
}

/// Sort by timestamp descending, ties broken by id descending.
fn newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (u64, &str),
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}
