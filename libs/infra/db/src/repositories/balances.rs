// libs/infra/db/src/repositories/balances.rs

use paygate_domain_models::AccountBalance;
use sqlx::{Postgres, Row, Transaction};

use crate::errors::DbError;

pub struct BalancesRepository<'a> {
    tx: &'a mut Transaction<'static, Postgres>,
}

impl<'a> BalancesRepository<'a> {
    pub(crate) fn new(tx: &'a mut Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    /// Snapshot read, no lock. Used for the pre-lock validation pass.
    pub async fn get(&mut self, account_id: &str) -> Result<Option<AccountBalance>, DbError> {
        let row = sqlx::query(
            "SELECT account_id, available_balance_cents, pending_balance_cents,
                    currency, version, updated_at
             FROM account_balances WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&mut **self.tx)
        .await?;

        row.map(row_to_balance).transpose()
    }

    /// Acquires a row-level exclusive lock held until the enclosing
    /// transaction ends. Callers are responsible for acquiring these in
    /// a globally consistent order across concurrent transfers.
    pub async fn get_for_update(
        &mut self,
        account_id: &str,
    ) -> Result<Option<AccountBalance>, DbError> {
        let row = sqlx::query(
            "SELECT account_id, available_balance_cents, pending_balance_cents,
                    currency, version, updated_at
             FROM account_balances WHERE account_id = $1
             FOR UPDATE",
        )
        .bind(account_id)
        .fetch_optional(&mut **self.tx)
        .await?;

        row.map(row_to_balance).transpose()
    }

    /// Conditionally sets `available_balance_cents` and increments
    /// `version` iff the stored version equals `expected_version`. An
    /// affected-row count of zero is an optimistic-lock conflict, which
    /// the caller must treat as fatal.
    pub async fn update(
        &mut self,
        account_id: &str,
        new_available_cents: i64,
        expected_version: i64,
    ) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE account_balances
             SET available_balance_cents = $1, version = version + 1, updated_at = now()
             WHERE account_id = $2 AND version = $3",
        )
        .bind(new_available_cents)
        .bind(account_id)
        .bind(expected_version)
        .execute(&mut **self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::OptimisticLock {
                entity: "AccountBalance".to_string(),
                entity_id: account_id.to_string(),
            });
        }
        Ok(())
    }

    /// Provisions the initial balance row for a new account. Not part of
    /// the authorization pipeline's own operation set; used at account
    /// onboarding time and by test fixtures.
    pub async fn create(&mut self, balance: &AccountBalance) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO account_balances
                (account_id, available_balance_cents, pending_balance_cents, currency, version, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&balance.account_id)
        .bind(balance.available_balance_cents)
        .bind(balance.pending_balance_cents)
        .bind(&balance.currency)
        .bind(balance.version)
        .bind(balance.updated_at)
        .execute(&mut **self.tx)
        .await?;
        Ok(())
    }
}

fn row_to_balance(row: sqlx::postgres::PgRow) -> Result<AccountBalance, DbError> {
    Ok(AccountBalance {
        account_id: row.try_get("account_id").map_err(DbError::QueryError)?,
        available_balance_cents: row
            .try_get("available_balance_cents")
            .map_err(DbError::QueryError)?,
        pending_balance_cents: row
            .try_get("pending_balance_cents")
            .map_err(DbError::QueryError)?,
        currency: row.try_get("currency").map_err(DbError::QueryError)?,
        version: row.try_get("version").map_err(DbError::QueryError)?,
        updated_at: row.try_get("updated_at").map_err(DbError::QueryError)?,
    })
}
