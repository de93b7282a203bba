// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Orders and bookings: creation and status updates.
//!
//! Handles:
//! - Server-side ids, timestamps, owner and totals on creation
//! - Schedule validation for test rides and service appointments
//! - Unrestricted status transitions (caller privilege is checked upstream)

use crate::db::Datastore;
use crate::error::{AppError, Result};
use crate::ids;
use crate::middleware::auth::AuthUser;
use crate::models::booking::{
    validate_schedule, NewServiceAppointment, NewTestRide, INITIAL_BOOKING_STATUS,
};
use crate::models::order::NewOrder;
use crate::models::{
    OrderStatus, PurchaseOrder, ScooterModel, ServiceAppointment, TestRideBooking,
};
use crate::time_utils::now_millis;
use chrono::{NaiveDate, Utc};
use validator::Validate;

#[derive(Clone)]
pub struct WorkflowService {
    db: Datastore,
}

impl WorkflowService {
    pub fn new(db: Datastore) -> Self {
        Self { db }
    }

    async fn scooter(&self, id: &str) -> Result<ScooterModel> {
        self.db
            .get_scooter(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Scooter model {} not found", id)))
    }

    // ─── Orders ──────────────────────────────────────────────────

    pub async fn place_order(&self, customer: &AuthUser, input: NewOrder) -> Result<PurchaseOrder> {
        input.validate()?;
        let model = self.scooter(&input.scooter_model_id).await?;

        let total_price = model
            .price
            .checked_mul(input.quantity)
            .ok_or_else(|| AppError::BadRequest("Order total is too large".to_string()))?;

        let order = PurchaseOrder {
            id: ids::new_id(ids::ORDER)?,
            status: OrderStatus::Pending,
            customer: customer.principal.clone(),
            scooter_model_id: model.id,
            quantity: input.quantity,
            total_price,
            timestamp: now_millis(),
        };
        self.db.put_order(&order).await?;

        tracing::info!(
            principal = %order.customer,
            order_id = %order.id,
            scooter_model_id = %order.scooter_model_id,
            quantity = order.quantity,
            total_price = order.total_price,
            "Order placed"
        );
        Ok(order)
    }

    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<PurchaseOrder> {
        let mut order = self
            .db
            .get_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;

        let previous = order.status;
        order.status = status;
        self.db.put_order(&order).await?;

        tracing::info!(order_id, ?previous, ?status, "Order status updated");
        Ok(order)
    }

    // ─── Test Rides ──────────────────────────────────────────────

    pub async fn book_test_ride(
        &self,
        customer: &AuthUser,
        input: NewTestRide,
    ) -> Result<TestRideBooking> {
        self.book_test_ride_on(customer, input, today()).await
    }

    async fn book_test_ride_on(
        &self,
        customer: &AuthUser,
        input: NewTestRide,
        today: NaiveDate,
    ) -> Result<TestRideBooking> {
        input.validate()?;
        let date = validate_schedule(&input.date, &input.time_slot, today)?;
        let model = self.scooter(&input.scooter_model_id).await?;

        let booking = TestRideBooking {
            id: ids::new_id(ids::TEST_RIDE)?,
            status: INITIAL_BOOKING_STATUS.to_string(),
            customer: customer.principal.clone(),
            scooter_model_id: model.id,
            date,
            time_slot: input.time_slot,
            timestamp: now_millis(),
        };
        self.db.put_test_ride(&booking).await?;

        tracing::info!(
            principal = %booking.customer,
            booking_id = %booking.id,
            date = %booking.date,
            time_slot = %booking.time_slot,
            "Test ride booked"
        );
        Ok(booking)
    }

    pub async fn update_test_ride_status(
        &self,
        booking_id: &str,
        status: String,
    ) -> Result<TestRideBooking> {
        let mut booking = self
            .db
            .get_test_ride(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test ride {} not found", booking_id)))?;

        booking.status = status;
        self.db.put_test_ride(&booking).await?;

        tracing::info!(booking_id, status = %booking.status, "Test ride status updated");
        Ok(booking)
    }

    // ─── Service Appointments ────────────────────────────────────

    pub async fn book_service(
        &self,
        customer: &AuthUser,
        input: NewServiceAppointment,
    ) -> Result<ServiceAppointment> {
        let date = validate_schedule(&input.date, &input.time_slot, today())?;

        let appointment = ServiceAppointment {
            id: ids::new_id(ids::SERVICE)?,
            status: INITIAL_BOOKING_STATUS.to_string(),
            service_type: input.service_type,
            customer: customer.principal.clone(),
            date,
            time_slot: input.time_slot,
            timestamp: now_millis(),
        };
        self.db.put_service_appointment(&appointment).await?;

        tracing::info!(
            principal = %appointment.customer,
            appointment_id = %appointment.id,
            service_type = ?appointment.service_type,
            date = %appointment.date,
            "Service appointment booked"
        );
        Ok(appointment)
    }

    pub async fn update_service_status(
        &self,
        appointment_id: &str,
        status: String,
    ) -> Result<ServiceAppointment> {
        let mut appointment = self
            .db
            .get_service_appointment(appointment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Service appointment {} not found", appointment_id))
            })?;

        appointment.status = status;
        self.db.put_service_appointment(&appointment).await?;

        tracing::info!(
            appointment_id,
            status = %appointment.status,
            "Service appointment status updated"
        );
        Ok(appointment)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AuthUser {
        AuthUser {
            principal: "alice".to_string(),
        }
    }

    async fn seeded() -> WorkflowService {
        let db = Datastore::in_memory();
        db.put_scooter(&ScooterModel {
            id: "model-x1".to_string(),
            name: "Volt X1".to_string(),
            range: 60,
            top_speed: 35,
            charging_time: 5,
            price: 899,
            image: "https://cdn.example.com/x1.png".to_string(),
        })
        .await
        .unwrap();
        WorkflowService::new(db)
    }

    #[tokio::test]
    async fn test_place_order_computes_total() {
        let workflow = seeded().await;
        let order = workflow
            .place_order(
                &alice(),
                NewOrder {
                    scooter_model_id: "model-x1".to_string(),
                    quantity: 3,
                },
            )
            .await
            .unwrap();

        assert_eq!(order.total_price, 2697);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer, "alice");
        assert!(order.id.starts_with("order-"));
    }

    #[tokio::test]
    async fn test_place_order_unknown_model() {
        let workflow = seeded().await;
        let result = workflow
            .place_order(
                &alice(),
                NewOrder {
                    scooter_model_id: "model-missing".to_string(),
                    quantity: 1,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_status_transitions_unrestricted() {
        let workflow = seeded().await;
        let order = workflow
            .place_order(
                &alice(),
                NewOrder {
                    scooter_model_id: "model-x1".to_string(),
                    quantity: 1,
                },
            )
            .await
            .unwrap();

        for status in [
            OrderStatus::Delivered,
            OrderStatus::Pending,
            OrderStatus::Cancelled,
            OrderStatus::Shipped,
        ] {
            let updated = workflow.update_order_status(&order.id, status).await.unwrap();
            assert_eq!(updated.status, status);
        }
    }

    #[tokio::test]
    async fn test_book_test_ride_validates_schedule() {
        let workflow = seeded().await;
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        let booking = workflow
            .book_test_ride_on(
                &alice(),
                NewTestRide {
                    scooter_model_id: "model-x1".to_string(),
                    date: "2026-10-20".to_string(),
                    time_slot: "10:00 AM".to_string(),
                },
                today,
            )
            .await
            .unwrap();
        assert_eq!(booking.status, INITIAL_BOOKING_STATUS);

        let past = workflow
            .book_test_ride_on(
                &alice(),
                NewTestRide {
                    scooter_model_id: "model-x1".to_string(),
                    date: "2026-10-01".to_string(),
                    time_slot: "10:00 AM".to_string(),
                },
                today,
            )
            .await;
        assert!(matches!(past, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_missing_booking() {
        let workflow = seeded().await;
        let result = workflow
            .update_test_ride_status("test-ride-missing", "confirmed".to_string())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = workflow
            .update_service_status("service-missing", "confirmed".to_string())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
