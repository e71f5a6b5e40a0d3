pub mod commands;
pub mod errors;
pub mod money;
pub mod models;

pub use commands::{AuthorizePaymentCommand, AuthorizePaymentResult};
pub use errors::DomainError;
pub use money::Money;
pub use models::{
    Account, AccountBalance, EntryType, IdempotencyRecord, IdempotencyStatus, LedgerEntry,
    OutboxEvent, Payment, PaymentStatus,
};
