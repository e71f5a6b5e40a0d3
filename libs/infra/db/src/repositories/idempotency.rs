// libs/infra/db/src/repositories/idempotency.rs

use chrono::{DateTime, Utc};
use paygate_domain_models::{IdempotencyRecord, IdempotencyStatus};
use serde_json::Value;
use sqlx::{Postgres, Row, Transaction};

use crate::errors::DbError;

pub struct IdempotencyRepository<'a> {
    tx: &'a mut Transaction<'static, Postgres>,
}

impl<'a> IdempotencyRepository<'a> {
    pub(crate) fn new(tx: &'a mut Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    /// Returns the record iff it exists and hasn't expired.
    pub async fn get(&mut self, key: &str) -> Result<Option<IdempotencyRecord>, DbError> {
        let row = sqlx::query(
            "SELECT key, payment_id, response_data, status, created_at, expires_at
             FROM idempotency_keys WHERE key = $1 AND expires_at > now()",
        )
        .bind(key)
        .fetch_optional(&mut **self.tx)
        .await?;
        row.map(row_to_record).transpose()
    }

    /// Inserts a PENDING record; if the key already exists this is a
    /// no-op (never an error).
    pub async fn create(&mut self, key: &str, expires_at: DateTime<Utc>) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO idempotency_keys (key, status, created_at, expires_at)
             VALUES ($1, 'PENDING', now(), $2)
             ON CONFLICT (key) DO NOTHING",
        )
        .bind(key)
        .bind(expires_at)
        .execute(&mut **self.tx)
        .await?;
        Ok(())
    }

    pub async fn mark_completed(
        &mut self,
        key: &str,
        payment_id: &str,
        response: Option<Value>,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE idempotency_keys
             SET status = 'COMPLETED', payment_id = $1, response_data = $2
             WHERE key = $3",
        )
        .bind(payment_id)
        .bind(response)
        .bind(key)
        .execute(&mut **self.tx)
        .await?;
        Ok(())
    }

    pub async fn mark_failed(&mut self, key: &str) -> Result<(), DbError> {
        sqlx::query("UPDATE idempotency_keys SET status = 'FAILED' WHERE key = $1")
            .bind(key)
            .execute(&mut **self.tx)
            .await?;
        Ok(())
    }

    /// Prunes expired records, returning the number removed.
    pub async fn delete_expired(&mut self) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM idempotency_keys WHERE expires_at <= now()")
            .execute(&mut **self.tx)
            .await?;
        Ok(result.rows_affected())
    }
}

fn row_to_record(row: sqlx::postgres::PgRow) -> Result<IdempotencyRecord, DbError> {
    let status_text: String = row.try_get("status").map_err(DbError::QueryError)?;
    let status = match status_text.as_str() {
        "PENDING" => IdempotencyStatus::Pending,
        "COMPLETED" => IdempotencyStatus::Completed,
        "FAILED" => IdempotencyStatus::Failed,
        other => {
            return Err(DbError::MappingError(format!(
                "unrecognized idempotency status {other}"
            )))
        }
    };
    Ok(IdempotencyRecord {
        key: row.try_get("key").map_err(DbError::QueryError)?,
        status,
        payment_id: row.try_get("payment_id").map_err(DbError::QueryError)?,
        response_data: row.try_get("response_data").map_err(DbError::QueryError)?,
        created_at: row.try_get("created_at").map_err(DbError::QueryError)?,
        expires_at: row.try_get("expires_at").map_err(DbError::QueryError)?,
    })
}
