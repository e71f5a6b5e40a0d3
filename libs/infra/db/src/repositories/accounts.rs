// libs/infra/db/src/repositories/accounts.rs

use paygate_domain_models::{Account, AccountStatus};
use sqlx::{Postgres, Row, Transaction};

use crate::errors::DbError;

pub struct AccountsRepository<'a> {
    tx: &'a mut Transaction<'static, Postgres>,
}

impl<'a> AccountsRepository<'a> {
    pub(crate) fn new(tx: &'a mut Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    /// Returns the account, or `None` if it doesn't exist. Never returns
    /// an error for a missing row.
    pub async fn get(&mut self, account_id: &str) -> Result<Option<Account>, DbError> {
        let row = sqlx::query(
            "SELECT id, owner_id, currency, status, created_at, updated_at
             FROM accounts WHERE id = $1",
        )
        .bind(account_id)
        .fetch_optional(&mut **self.tx)
        .await?;

        row.map(row_to_account).transpose()
    }

    /// Accounts are provisioned externally; this core only ever inserts
    /// during test setup or administrative seeding.
    pub async fn add(&mut self, account: &Account) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO accounts (id, owner_id, currency, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&account.id)
        .bind(&account.owner_id)
        .bind(&account.currency)
        .bind(status_to_text(account.status))
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut **self.tx)
        .await?;
        Ok(())
    }

    pub async fn update_status(
        &mut self,
        account_id: &str,
        status: AccountStatus,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE accounts SET status = $1, updated_at = now() WHERE id = $2")
            .bind(status_to_text(status))
            .bind(account_id)
            .execute(&mut **self.tx)
            .await?;
        Ok(())
    }
}

fn status_to_text(status: AccountStatus) -> &'static str {
    match status {
        AccountStatus::Active => "ACTIVE",
        AccountStatus::Suspended => "SUSPENDED",
        AccountStatus::Closed => "CLOSED",
    }
}

fn row_to_account(row: sqlx::postgres::PgRow) -> Result<Account, DbError> {
    let status_text: String = row.try_get("status").map_err(DbError::QueryError)?;
    let status = match status_text.as_str() {
        "ACTIVE" => AccountStatus::Active,
        "SUSPENDED" => AccountStatus::Suspended,
        "CLOSED" => AccountStatus::Closed,
        other => {
            return Err(DbError::MappingError(format!(
                "unrecognized account status {other}"
            )))
        }
    };
    Ok(Account {
        id: row.try_get("id").map_err(DbError::QueryError)?,
        owner_id: row.try_get("owner_id").map_err(DbError::QueryError)?,
        currency: row.try_get("currency").map_err(DbError::QueryError)?,
        status,
        created_at: row.try_get("created_at").map_err(DbError::QueryError)?,
        updated_at: row.try_get("updated_at").map_err(DbError::QueryError)?,
    })
}
