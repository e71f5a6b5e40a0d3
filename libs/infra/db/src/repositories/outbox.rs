// libs/infra/db/src/repositories/outbox.rs

use paygate_domain_models::OutboxEvent;
use serde_json::Value;
use sqlx::{Postgres, Row, Transaction};

use crate::errors::DbError;

pub struct OutboxRepository<'a> {
    tx: &'a mut Transaction<'static, Postgres>,
}

impl<'a> OutboxRepository<'a> {
    pub(crate) fn new(tx: &'a mut Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    pub async fn add(
        &mut self,
        id: &str,
        aggregate_type: &str,
        aggregate_id: &str,
        event_type: &str,
        payload: Value,
    ) -> Result<OutboxEvent, DbError> {
        let row = sqlx::query(
            "INSERT INTO outbox (id, aggregate_type, aggregate_id, event_type, payload)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, aggregate_type, aggregate_id, event_type, payload,
                       created_at, published_at, retry_count",
        )
        .bind(id)
        .bind(aggregate_type)
        .bind(aggregate_id)
        .bind(event_type)
        .bind(&payload)
        .fetch_one(&mut **self.tx)
        .await?;
        row_to_event(row)
    }

    /// Reads up to `limit` unpublished rows ordered by creation ascending,
    /// locking each and skipping rows already locked by a concurrent
    /// dispatcher.
    pub async fn get_unpublished(&mut self, limit: i64) -> Result<Vec<OutboxEvent>, DbError> {
        let rows = sqlx::query(
            "SELECT id, aggregate_type, aggregate_id, event_type, payload,
                    created_at, published_at, retry_count
             FROM outbox
             WHERE published_at IS NULL
             ORDER BY created_at ASC
             LIMIT $1
             FOR UPDATE SKIP LOCKED",
        )
        .bind(limit)
        .fetch_all(&mut **self.tx)
        .await?;
        rows.into_iter().map(row_to_event).collect()
    }

    pub async fn mark_published(&mut self, ids: &[String]) -> Result<(), DbError> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("UPDATE outbox SET published_at = now() WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut **self.tx)
            .await?;
        Ok(())
    }

    pub async fn increment_retry_count(&mut self, id: &str) -> Result<(), DbError> {
        sqlx::query("UPDATE outbox SET retry_count = retry_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&mut **self.tx)
            .await?;
        Ok(())
    }
}

fn row_to_event(row: sqlx::postgres::PgRow) -> Result<OutboxEvent, DbError> {
    Ok(OutboxEvent {
        id: row.try_get("id").map_err(DbError::QueryError)?,
        aggregate_type: row.try_get("aggregate_type").map_err(DbError::QueryError)?,
        aggregate_id: row.try_get("aggregate_id").map_err(DbError::QueryError)?,
        event_type: row.try_get("event_type").map_err(DbError::QueryError)?,
        payload: row.try_get("payload").map_err(DbError::QueryError)?,
        created_at: row.try_get("created_at").map_err(DbError::QueryError)?,
        published_at: row.try_get("published_at").map_err(DbError::QueryError)?,
        retry_count: row.try_get("retry_count").map_err(DbError::QueryError)?,
    })
}
