// libs/infra/db/src/repositories/ledger.rs

use paygate_domain_models::{EntryType, LedgerEntry};
use sqlx::{Postgres, Row, Transaction};

use crate::errors::DbError;

pub struct LedgerRepository<'a> {
    tx: &'a mut Transaction<'static, Postgres>,
}

impl<'a> LedgerRepository<'a> {
    pub(crate) fn new(tx: &'a mut Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    pub async fn add(&mut self, entry: &LedgerEntry) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO ledger_entries
                (id, payment_id, account_id, entry_type, amount_cents, currency,
                 balance_after_cents, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&entry.id)
        .bind(&entry.payment_id)
        .bind(&entry.account_id)
        .bind(entry_type_to_text(entry.entry_type))
        .bind(entry.amount_cents)
        .bind(&entry.currency)
        .bind(entry.balance_after_cents)
        .bind(entry.created_at)
        .execute(&mut **self.tx)
        .await?;
        Ok(())
    }

    pub async fn list_by_payment(
        &mut self,
        payment_id: &str,
    ) -> Result<Vec<LedgerEntry>, DbError> {
        let rows = sqlx::query(
            "SELECT id, payment_id, account_id, entry_type, amount_cents, currency,
                    balance_after_cents, created_at
             FROM ledger_entries WHERE payment_id = $1 ORDER BY created_at ASC",
        )
        .bind(payment_id)
        .fetch_all(&mut **self.tx)
        .await?;
        rows.into_iter().map(row_to_entry).collect()
    }

    pub async fn list_by_account(
        &mut self,
        account_id: &str,
        limit: i64,
    ) -> Result<Vec<LedgerEntry>, DbError> {
        let rows = sqlx::query(
            "SELECT id, payment_id, account_id, entry_type, amount_cents, currency,
                    balance_after_cents, created_at
             FROM ledger_entries WHERE account_id = $1
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(account_id)
        .bind(limit)
        .fetch_all(&mut **self.tx)
        .await?;
        rows.into_iter().map(row_to_entry).collect()
    }
}

fn entry_type_to_text(entry_type: EntryType) -> &'static str {
    match entry_type {
        EntryType::Debit => "DEBIT",
        EntryType::Credit => "CREDIT",
    }
}

fn row_to_entry(row: sqlx::postgres::PgRow) -> Result<LedgerEntry, DbError> {
    let entry_type_text: String = row.try_get("entry_type").map_err(DbError::QueryError)?;
    let entry_type = match entry_type_text.as_str() {
        "DEBIT" => EntryType::Debit,
        "CREDIT" => EntryType::Credit,
        other => {
            return Err(DbError::MappingError(format!(
                "unrecognized entry type {other}"
            )))
        }
    };
    Ok(LedgerEntry {
        id: row.try_get("id").map_err(DbError::QueryError)?,
        payment_id: row.try_get("payment_id").map_err(DbError::QueryError)?,
        account_id: row.try_get("account_id").map_err(DbError::QueryError)?,
        entry_type,
        amount_cents: row.try_get("amount_cents").map_err(DbError::QueryError)?,
        currency: row.try_get("currency").map_err(DbError::QueryError)?,
        balance_after_cents: row
            .try_get("balance_after_cents")
            .map_err(DbError::QueryError)?,
        created_at: row.try_get("created_at").map_err(DbError::QueryError)?,
    })
}
