// libs/infra/db/src/schema.rs
//
// Schema-as-code: tables are created idempotently at startup rather than
// through a separate migration tool. Out of scope for this core is the
// migration tooling itself (spec treats that as external plumbing); this
// module only needs enough to bring a fresh database up to the shape the
// repositories expect.

use sqlx::postgres::PgPool;
use tracing::{debug, info, instrument};

use crate::errors::DbError;

const TABLES: &[(&str, &str)] = &[
    (
        "accounts",
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            currency TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    ),
    (
        "account_balances",
        r#"
        CREATE TABLE IF NOT EXISTS account_balances (
            account_id TEXT PRIMARY KEY REFERENCES accounts(id),
            available_balance_cents BIGINT NOT NULL,
            pending_balance_cents BIGINT NOT NULL DEFAULT 0,
            currency TEXT NOT NULL,
            version BIGINT NOT NULL DEFAULT 0,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    ),
    (
        "payments",
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY,
            idempotency_key TEXT NOT NULL UNIQUE,
            payer_account_id TEXT NOT NULL,
            payee_account_id TEXT NOT NULL,
            amount_cents BIGINT NOT NULL,
            currency TEXT NOT NULL,
            status TEXT NOT NULL,
            description TEXT,
            error_code TEXT,
            error_message TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    ),
    (
        "ledger_entries",
        r#"
        CREATE TABLE IF NOT EXISTS ledger_entries (
            id TEXT PRIMARY KEY,
            payment_id TEXT NOT NULL,
            account_id TEXT NOT NULL,
            entry_type TEXT NOT NULL,
            amount_cents BIGINT NOT NULL,
            currency TEXT NOT NULL,
            balance_after_cents BIGINT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    ),
    (
        "idempotency_keys",
        r#"
        CREATE TABLE IF NOT EXISTS idempotency_keys (
            key TEXT PRIMARY KEY,
            payment_id TEXT,
            response_data JSONB,
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            expires_at TIMESTAMPTZ NOT NULL
        );
        "#,
    ),
    (
        "outbox",
        r#"
        CREATE TABLE IF NOT EXISTS outbox (
            id TEXT PRIMARY KEY,
            aggregate_type TEXT NOT NULL,
            aggregate_id TEXT NOT NULL,
            event_type TEXT NOT NULL,
            payload JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            published_at TIMESTAMPTZ,
            retry_count INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
];

const INDEXES: &[(&str, &str)] = &[
    (
        "idx_ledger_entries_payment",
        "CREATE INDEX IF NOT EXISTS idx_ledger_entries_payment ON ledger_entries(payment_id);",
    ),
    (
        "idx_ledger_entries_account",
        "CREATE INDEX IF NOT EXISTS idx_ledger_entries_account ON ledger_entries(account_id, created_at DESC);",
    ),
    (
        "idx_outbox_unpublished",
        "CREATE INDEX IF NOT EXISTS idx_outbox_unpublished ON outbox(created_at) WHERE published_at IS NULL;",
    ),
    (
        "idx_idempotency_expires",
        "CREATE INDEX IF NOT EXISTS idx_idempotency_expires ON idempotency_keys(expires_at);",
    ),
];

#[instrument(skip(pool))]
pub async fn apply_schema(pool: &PgPool) -> Result<(), DbError> {
    info!("applying database schema");
    for (name, ddl) in TABLES {
        debug!(table = *name, "creating table if absent");
        sqlx::query(ddl).execute(pool).await?;
    }
    for (name, ddl) in INDEXES {
        debug!(index = *name, "creating index if absent");
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}
