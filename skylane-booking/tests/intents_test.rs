mod support;

use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use skylane_booking::gateway::MockPaymentGateway;
use skylane_booking::PaymentIntents;
use skylane_core::booking::BookingPaymentStatus;
use skylane_core::error::PaymentError;
use skylane_core::identity::{Actor, Role};
use skylane_core::payment::PaymentStatus;
use skylane_core::repository::{BookingRepository, PaymentRepository};

use support::{seeded_booking, MemoryStore};

fn intents(store: &Arc<MemoryStore>) -> PaymentIntents {
    PaymentIntents::new(
        store.clone(),
        store.clone(),
        Arc::new(MockPaymentGateway::new()),
        "pk_test_skylane".to_string(),
    )
}

#[tokio::test]
async fn charges_booking_total_in_minor_units_when_no_override() {
    let store = MemoryStore::new();
    let booking = seeded_booking(&store, 1, Decimal::new(50000, 2)); // 500.00

    let created = intents(&store)
        .create(booking.id, None, None, Actor::customer(booking.user_id))
        .await
        .unwrap();

    assert_eq!(created.amount, 50000);
    assert_eq!(created.currency, "SGD");
    assert!(created.payment_intent_id.starts_with("pi_"));
    assert!(created.client_secret.is_some());
}

#[tokio::test]
async fn positive_override_replaces_booking_total() {
    let store = MemoryStore::new();
    let booking = seeded_booking(&store, 1, Decimal::new(50000, 2));

    let created = intents(&store)
        .create(
            booking.id,
            Some(Decimal::new(100, 2)), // 1.00
            None,
            Actor::customer(booking.user_id),
        )
        .await
        .unwrap();

    assert_eq!(created.amount, 100);
}

#[tokio::test]
async fn zero_or_negative_override_is_rejected() {
    let store = MemoryStore::new();
    let booking = seeded_booking(&store, 1, Decimal::new(50000, 2));
    let svc = intents(&store);

    let err = svc
        .create(
            booking.id,
            Some(Decimal::ZERO),
            None,
            Actor::customer(booking.user_id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::InvalidAmount(_)));

    let err = svc
        .create(
            booking.id,
            Some(Decimal::new(-500, 2)),
            None,
            Actor::customer(booking.user_id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::InvalidAmount(_)));
}

#[tokio::test]
async fn local_payment_row_exists_before_client_secret_is_returned() {
    let store = MemoryStore::new();
    let booking = seeded_booking(&store, 1, Decimal::new(30000, 2));

    let created = intents(&store)
        .create(booking.id, None, None, Actor::customer(booking.user_id))
        .await
        .unwrap();

    // The join key for webhook correlation is already persisted.
    let payment = store
        .get_by_transaction_id(&created.payment_intent_id)
        .await
        .unwrap()
        .expect("payment row persisted at intent creation");
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.booking_id, booking.id);
    assert_eq!(payment.amount, Decimal::new(30000, 2));
}

#[tokio::test]
async fn unknown_booking_is_rejected() {
    let store = MemoryStore::new();
    let err = intents(&store)
        .create(Uuid::new_v4(), None, None, Actor::customer(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::BookingNotFound(_)));
}

#[tokio::test]
async fn non_owner_customer_is_rejected_but_staff_allowed() {
    let store = MemoryStore::new();
    let booking = seeded_booking(&store, 1, Decimal::new(30000, 2));
    let svc = intents(&store);

    let err = svc
        .create(booking.id, None, None, Actor::customer(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::NotAuthorized));

    let created = svc
        .create(
            booking.id,
            None,
            None,
            Actor::staff(Uuid::new_v4(), Role::Agent),
        )
        .await
        .unwrap();
    assert_eq!(created.amount, 30000);
}

#[tokio::test]
async fn confirmed_booking_cannot_take_another_intent() {
    let store = MemoryStore::new();
    let booking = seeded_booking(&store, 1, Decimal::new(30000, 2));
    store
        .update_payment_status(booking.id, BookingPaymentStatus::Confirmed)
        .await
        .unwrap();

    let err = intents(&store)
        .create(booking.id, None, None, Actor::customer(booking.user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::BookingNotPending(_)));
}
