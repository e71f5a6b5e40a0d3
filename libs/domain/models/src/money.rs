// libs/domain/models/src/money.rs

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// An amount in integer minor units (cents) of a specific currency.
///
/// Amounts are never represented as floating point: ledger conservation
/// invariants depend on exact integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money {
    pub amount_cents: i64,
    pub currency: [u8; 3],
}

impl Money {
    pub fn new(amount_cents: i64, currency: &str) -> Result<Self, DomainError> {
        if amount_cents < 0 {
            return Err(DomainError::InvalidAmount {
                amount_cents,
                reason: "amount must not be negative".to_string(),
            });
        }
        let bytes = currency.as_bytes();
        if bytes.len() != 3 {
            return Err(DomainError::InvalidAmount {
                amount_cents,
                reason: format!("currency code must be 3 characters, got {currency:?}"),
            });
        }
        let mut currency_bytes = [0u8; 3];
        currency_bytes.copy_from_slice(bytes);
        Ok(Self {
            amount_cents,
            currency: currency_bytes,
        })
    }

    pub fn positive(amount_cents: i64, currency: &str) -> Result<Self, DomainError> {
        if amount_cents <= 0 {
            return Err(DomainError::InvalidAmount {
                amount_cents,
                reason: "amount must be positive".to_string(),
            });
        }
        Self::new(amount_cents, currency)
    }

    pub fn currency_str(&self) -> String {
        String::from_utf8_lossy(&self.currency).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_amounts() {
        assert!(Money::new(-1, "USD").is_err());
    }

    #[test]
    fn rejects_non_three_letter_currency() {
        assert!(Money::new(100, "US").is_err());
        assert!(Money::new(100, "DOLLAR").is_err());
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(Money::positive(0, "USD").is_err());
        assert!(Money::positive(1, "USD").is_ok());
    }
}
