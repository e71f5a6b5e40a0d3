// libs/infra/db/src/repositories/payments.rs

use paygate_domain_models::{Payment, PaymentStatus};
use sqlx::{Postgres, Row, Transaction};

use crate::errors::DbError;

pub struct PaymentsRepository<'a> {
    tx: &'a mut Transaction<'static, Postgres>,
}

impl<'a> PaymentsRepository<'a> {
    pub(crate) fn new(tx: &'a mut Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    pub async fn get(&mut self, payment_id: &str) -> Result<Option<Payment>, DbError> {
        let row = sqlx::query(SELECT_COLUMNS_WHERE_ID)
            .bind(payment_id)
            .fetch_optional(&mut **self.tx)
            .await?;
        row.map(row_to_payment).transpose()
    }

    pub async fn get_by_idempotency_key(
        &mut self,
        idempotency_key: &str,
    ) -> Result<Option<Payment>, DbError> {
        let row = sqlx::query(
            "SELECT id, idempotency_key, payer_account_id, payee_account_id, amount_cents,
                    currency, status, description, error_code, error_message,
                    created_at, updated_at
             FROM payments WHERE idempotency_key = $1",
        )
        .bind(idempotency_key)
        .fetch_optional(&mut **self.tx)
        .await?;
        row.map(row_to_payment).transpose()
    }

    pub async fn add(&mut self, payment: &Payment) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO payments
                (id, idempotency_key, payer_account_id, payee_account_id, amount_cents,
                 currency, status, description, error_code, error_message, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&payment.id)
        .bind(&payment.idempotency_key)
        .bind(&payment.payer_account_id)
        .bind(&payment.payee_account_id)
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(status_to_text(payment.status))
        .bind(&payment.description)
        .bind(&payment.error_code)
        .bind(&payment.error_message)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&mut **self.tx)
        .await?;
        Ok(())
    }

    /// Reserved for externally-driven state changes; the core happy
    /// path never mutates a payment after authorization commit.
    pub async fn update_status(
        &mut self,
        payment_id: &str,
        status: PaymentStatus,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE payments SET status = $1, updated_at = now() WHERE id = $2")
            .bind(status_to_text(status))
            .bind(payment_id)
            .execute(&mut **self.tx)
            .await?;
        Ok(())
    }
}

const SELECT_COLUMNS_WHERE_ID: &str = "SELECT id, idempotency_key, payer_account_id, payee_account_id, amount_cents,
                    currency, status, description, error_code, error_message,
                    created_at, updated_at
             FROM payments WHERE id = $1";

fn status_to_text(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Authorized => "AUTHORIZED",
        PaymentStatus::Declined => "DECLINED",
        PaymentStatus::Duplicate => "DUPLICATE",
    }
}

fn row_to_payment(row: sqlx::postgres::PgRow) -> Result<Payment, DbError> {
    let status_text: String = row.try_get("status").map_err(DbError::QueryError)?;
    let status = match status_text.as_str() {
        "AUTHORIZED" => PaymentStatus::Authorized,
        "DECLINED" => PaymentStatus::Declined,
        "DUPLICATE" => PaymentStatus::Duplicate,
        other => {
            return Err(DbError::MappingError(format!(
                "unrecognized payment status {other}"
            )))
        }
    };
    Ok(Payment {
        id: row.try_get("id").map_err(DbError::QueryError)?,
        idempotency_key: row.try_get("idempotency_key").map_err(DbError::QueryError)?,
        payer_account_id: row
            .try_get("payer_account_id")
            .map_err(DbError::QueryError)?,
        payee_account_id: row
            .try_get("payee_account_id")
            .map_err(DbError::QueryError)?,
        amount_cents: row.try_get("amount_cents").map_err(DbError::QueryError)?,
        currency: row.try_get("currency").map_err(DbError::QueryError)?,
        status,
        description: row.try_get("description").map_err(DbError::QueryError)?,
        error_code: row.try_get("error_code").map_err(DbError::QueryError)?,
        error_message: row.try_get("error_message").map_err(DbError::QueryError)?,
        created_at: row.try_get("created_at").map_err(DbError::QueryError)?,
        updated_at: row.try_get("updated_at").map_err(DbError::QueryError)?,
    })
}
