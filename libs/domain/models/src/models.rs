// libs/domain/models/src/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An owner's account. Created externally; the pipeline reads it but
/// never inserts or mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub owner_id: String,
    pub currency: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The only value the pipeline ever observes is `Active`; the other
/// variants are reserved for account lifecycle states this core does not
/// drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    Active,
    Suspended,
    Closed,
}

/// Per-account mutable balance, the row the pipeline locks and updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_id: String,
    pub available_balance_cents: i64,
    pub pending_balance_cents: i64,
    pub currency: String,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Authorized,
    Declined,
    Duplicate,
}

/// One per successful authorization. Never mutated after the
/// authorization commit in this core — reversals are out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub idempotency_key: String,
    pub payer_account_id: String,
    pub payee_account_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub description: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    Debit,
    Credit,
}

/// Append-only audit record. Every authorized payment produces exactly
/// two of these: one DEBIT on the payer, one CREDIT on the payee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub payment_id: String,
    pub account_id: String,
    pub entry_type: EntryType,
    pub amount_cents: i64,
    pub currency: String,
    pub balance_after_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdempotencyStatus {
    Pending,
    Completed,
    Failed,
}

/// Keyed by the caller-supplied idempotency string. At most one record
/// exists per key at any time; garbage-collectable after `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub key: String,
    pub status: IdempotencyStatus,
    pub payment_id: Option<String>,
    pub response_data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Durable intent to publish, written in the same transaction as the
/// business mutation it describes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: String,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    /// Opaque, event-specific structured payload. Deliberately untyped:
    /// the storage layer must not impose a closed schema on it.
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub retry_count: i32,
}
