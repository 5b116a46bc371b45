use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use skylane_core::payment::{Payment, PaymentStatus};
use skylane_core::repository::PaymentRepository;

pub struct StorePaymentRepository {
    pool: PgPool,
}

impl StorePaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    booking_id: Uuid,
    amount: Decimal,
    currency: String,
    method: Option<String>,
    status: String,
    transaction_id: Option<String>,
    transacted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>> {
        let status = PaymentStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown payment status: {}", self.status))?;
        Ok(Payment {
            id: self.id,
            booking_id: self.booking_id,
            amount: self.amount,
            currency: self.currency,
            method: self.method,
            status,
            transaction_id: self.transaction_id,
            transacted_at: self.transacted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_PAYMENT: &str = "SELECT id, booking_id, amount, currency, method, status, \
     transaction_id, transacted_at, created_at, updated_at FROM payments";

#[async_trait]
impl PaymentRepository for StorePaymentRepository {
    async fn create(
        &self,
        payment: &Payment,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "INSERT INTO payments (id, booking_id, amount, currency, method, status, \
             transaction_id, transacted_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(payment.id)
        .bind(payment.booking_id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.method)
        .bind(payment.status.as_str())
        .bind(&payment.transaction_id)
        .bind(payment.transacted_at)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Payment>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<PaymentRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_PAYMENT))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(PaymentRow::into_payment).transpose()
    }

    async fn get_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<PaymentRow> =
            sqlx::query_as(&format!("{} WHERE transaction_id = $1", SELECT_PAYMENT))
                .bind(transaction_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(PaymentRow::into_payment).transpose()
    }

    async fn latest_pending_for_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<Payment>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "{} WHERE booking_id = $1 AND status = 'PENDING' ORDER BY created_at DESC LIMIT 1",
            SELECT_PAYMENT
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(PaymentRow::into_payment).transpose()
    }

    async fn set_transaction_id(
        &self,
        id: Uuid,
        transaction_id: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE payments SET transaction_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(transaction_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // The affected-row count is the concurrency guard: of any number of
    // concurrent callers, exactly one sees the row still PENDING.
    async fn mark_succeeded(
        &self,
        id: Uuid,
        method: Option<&str>,
        transacted_at: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            "UPDATE payments SET status = 'SUCCESS', method = COALESCE($2, method), \
             transacted_at = $3, updated_at = NOW() \
             WHERE id = $1 AND status = 'PENDING'",
        )
        .bind(id)
        .bind(method)
        .bind(transacted_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_failed(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            "UPDATE payments SET status = 'FAILED', updated_at = NOW() \
             WHERE id = $1 AND status = 'PENDING'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_refunded(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            "UPDATE payments SET status = 'REFUNDED', updated_at = NOW() \
             WHERE id = $1 AND status = 'SUCCESS'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
