// libs/infra/db/src/unit_of_work.rs
//
// Scopes one database transaction. Repositories never own the
// transaction themselves — each accessor method borrows it for the
// duration of one call, so two repository calls can never hold
// conflicting mutable borrows at once. This is the Rust-shaped version
// of a unit of work that, in a language without a borrow checker, would
// just hand every repository the same shared connection object.

use sqlx::{PgPool, Postgres, Transaction};

use crate::errors::DbError;
use crate::repositories::{
    AccountsRepository, BalancesRepository, IdempotencyRepository, LedgerRepository,
    OutboxRepository, PaymentsRepository,
};

pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork {
    pub async fn begin(pool: &PgPool) -> Result<Self, DbError> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    pub fn accounts(&mut self) -> AccountsRepository<'_> {
        AccountsRepository::new(&mut self.tx)
    }

    pub fn balances(&mut self) -> BalancesRepository<'_> {
        BalancesRepository::new(&mut self.tx)
    }

    pub fn payments(&mut self) -> PaymentsRepository<'_> {
        PaymentsRepository::new(&mut self.tx)
    }

    pub fn ledger(&mut self) -> LedgerRepository<'_> {
        LedgerRepository::new(&mut self.tx)
    }

    pub fn idempotency(&mut self) -> IdempotencyRepository<'_> {
        IdempotencyRepository::new(&mut self.tx)
    }

    pub fn outbox(&mut self) -> OutboxRepository<'_> {
        OutboxRepository::new(&mut self.tx)
    }

    /// Completes the transaction. No implicit commit happens on drop —
    /// a `UnitOfWork` dropped without an explicit commit rolls back via
    /// `sqlx::Transaction`'s own drop behavior.
    pub async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), DbError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
