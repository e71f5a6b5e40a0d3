// libs/domain/models/src/commands.rs

use chrono::{DateTime, Utc};

use crate::models::PaymentStatus;

/// Input to the authorization pipeline's single operation.
#[derive(Debug, Clone)]
pub struct AuthorizePaymentCommand {
    pub idempotency_key: String,
    pub payer_account_id: String,
    pub payee_account_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub description: Option<String>,
}

/// Output of `authorize`. `payment_id` is the empty string for a decline
/// reached before a payment identifier was allocated.
#[derive(Debug, Clone)]
pub struct AuthorizePaymentResult {
    pub payment_id: String,
    pub status: PaymentStatus,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub processed_at: DateTime<Utc>,
}

impl AuthorizePaymentResult {
    pub fn declined(code: &str, message: String, processed_at: DateTime<Utc>) -> Self {
        Self {
            payment_id: String::new(),
            status: PaymentStatus::Declined,
            error_code: Some(code.to_string()),
            error_message: Some(message),
            processed_at,
        }
    }

    pub fn duplicate(payment_id: String, processed_at: DateTime<Utc>) -> Self {
        Self {
            payment_id,
            status: PaymentStatus::Duplicate,
            error_code: None,
            error_message: None,
            processed_at,
        }
    }

    pub fn authorized(payment_id: String, processed_at: DateTime<Utc>) -> Self {
        Self {
            payment_id,
            status: PaymentStatus::Authorized,
            error_code: None,
            error_message: None,
            processed_at,
        }
    }
}
