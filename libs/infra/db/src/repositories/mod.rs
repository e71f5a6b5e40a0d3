// libs/infra/db/src/repositories/mod.rs
//
// Barrel file: each repository is a narrow interface bound to the
// transaction it was constructed from, re-exported here for callers that
// only need the public names.

pub mod accounts;
pub mod balances;
pub mod idempotency;
pub mod ledger;
pub mod outbox;
pub mod payments;

pub use accounts::AccountsRepository;
pub use balances::BalancesRepository;
pub use idempotency::IdempotencyRepository;
pub use ledger::LedgerRepository;
pub use outbox::OutboxRepository;
pub use payments::PaymentsRepository;
