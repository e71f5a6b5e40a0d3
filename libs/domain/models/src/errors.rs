// libs/domain/models/src/errors.rs

use thiserror::Error;

/// Business-rule violations surfaced by the authorization pipeline.
///
/// Every variant here maps to a denial the caller can act on; anything
/// that isn't a domain rule (a dropped connection, a malformed row) is an
/// infrastructure error instead and never appears in this enum.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("account {account_id} has insufficient funds: requires {required} available {available}")]
    InsufficientFunds {
        account_id: String,
        required: i64,
        available: i64,
    },

    #[error("account {account_id} not found")]
    AccountNotFound { account_id: String },

    #[error("invalid amount {amount_cents}: {reason}")]
    InvalidAmount { amount_cents: i64, reason: String },

    #[error("payer and payee are the same account: {account_id}")]
    SameAccount { account_id: String },

    #[error("optimistic lock conflict on {entity} {entity_id}")]
    OptimisticLock { entity: String, entity_id: String },

    #[error("currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_message_carries_all_fields() {
        let error = DomainError::InsufficientFunds {
            account_id: "acct-1".to_string(),
            required: 500,
            available: 100,
        };
        let message = error.to_string();
        assert!(message.contains("acct-1"));
        assert!(message.contains("500"));
        assert!(message.contains("100"));
    }

    #[test]
    fn same_account_message_names_the_account() {
        let error = DomainError::SameAccount {
            account_id: "acct-2".to_string(),
        };
        assert!(error.to_string().contains("acct-2"));
    }
}
