// libs/infra/db/src/pipeline.rs
//
// The payment authorization pipeline: one operation, `authorize`,
// orchestrating validation, balance mutation, ledger writing, outbox
// enqueue, and idempotency finalization inside one unit of work.

use chrono::{Duration, Utc};
use paygate_core_ids::IdGenerator;
use paygate_domain_models::{
    AuthorizePaymentCommand, AuthorizePaymentResult, DomainError, EntryType, IdempotencyStatus,
    LedgerEntry, Payment, PaymentStatus,
};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::errors::{DbError, PipelineError};
use crate::unit_of_work::UnitOfWork;

const IDEMPOTENCY_TTL_HOURS: i64 = 24;

#[instrument(
    skip(pool, ids, command),
    fields(
        idempotency_key = %command.idempotency_key,
        payer = %command.payer_account_id,
        payee = %command.payee_account_id,
        amount_cents = command.amount_cents,
    )
)]
pub async fn authorize(
    pool: &PgPool,
    ids: &IdGenerator,
    command: AuthorizePaymentCommand,
) -> Result<AuthorizePaymentResult, PipelineError> {
    let mut uow = UnitOfWork::begin(pool).await?;

    // 1. Idempotency lookup.
    let existing = uow.idempotency().get(&command.idempotency_key).await?;
    match existing.as_ref().map(|r| r.status) {
        Some(IdempotencyStatus::Completed) => {
            let record = existing.unwrap();
            uow.rollback().await?;
            let payment_id = record.payment_id.unwrap_or_default();
            info!(payment_id = %payment_id, "duplicate authorization request");
            return Ok(AuthorizePaymentResult::duplicate(
                payment_id,
                record.created_at,
            ));
        }
        Some(IdempotencyStatus::Pending) | Some(IdempotencyStatus::Failed) => {
            // Treated as no-record-present: the existing row is finalized
            // below without a re-insert.
        }
        None => {
            let expires_at = Utc::now() + Duration::hours(IDEMPOTENCY_TTL_HOURS);
            uow.idempotency()
                .create(&command.idempotency_key, expires_at)
                .await?;
        }
    }

    // 2. Validate without taking locks. Order is fixed and determines
    //    which error code a multiply-invalid request reports.
    if let Some(decline) = validate(&mut uow, &command).await? {
        // 3. Decline path: fail the idempotency record and commit.
        uow.idempotency()
            .mark_failed(&command.idempotency_key)
            .await?;
        uow.commit().await?;
        warn!(code = %decline.0, "authorization declined");
        return Ok(AuthorizePaymentResult::declined(
            decline.0,
            decline.1,
            Utc::now(),
        ));
    }

    // 4. Allocate the payment and record it as authorized.
    let payment_id = ids.next_id();
    let now = Utc::now();
    let payment = Payment {
        id: payment_id.clone(),
        idempotency_key: command.idempotency_key.clone(),
        payer_account_id: command.payer_account_id.clone(),
        payee_account_id: command.payee_account_id.clone(),
        amount_cents: command.amount_cents,
        currency: command.currency.clone(),
        status: PaymentStatus::Authorized,
        description: command.description.clone(),
        error_code: None,
        error_message: None,
        created_at: now,
        updated_at: now,
    };
    uow.payments().add(&payment).await?;

    // 5. Execute the transfer under row locks, acquired in a globally
    //    consistent order to eliminate pairwise deadlocks regardless of
    //    which account is payer and which is payee.
    let (first_id, second_id) = if command.payer_account_id < command.payee_account_id {
        (&command.payer_account_id, &command.payee_account_id)
    } else {
        (&command.payee_account_id, &command.payer_account_id)
    };
    let first_locked = uow.balances().get_for_update(first_id).await?.ok_or_else(|| {
        PipelineError::SerializationAnomaly(DomainError::AccountNotFound {
            account_id: first_id.clone(),
        })
    })?;
    let second_locked = uow
        .balances()
        .get_for_update(second_id)
        .await?
        .ok_or_else(|| {
            PipelineError::SerializationAnomaly(DomainError::AccountNotFound {
                account_id: second_id.clone(),
            })
        })?;

    let (payer_balance, payee_balance) = if first_id == &command.payer_account_id {
        (first_locked, second_locked)
    } else {
        (second_locked, first_locked)
    };

    if payer_balance.available_balance_cents < command.amount_cents {
        return Err(PipelineError::SerializationAnomaly(
            DomainError::InsufficientFunds {
                account_id: command.payer_account_id.clone(),
                required: command.amount_cents,
                available: payer_balance.available_balance_cents,
            },
        ));
    }

    let new_payer_available = payer_balance.available_balance_cents - command.amount_cents;
    let new_payee_available = payee_balance.available_balance_cents + command.amount_cents;

    let debit = LedgerEntry {
        id: ids.next_id(),
        payment_id: payment_id.clone(),
        account_id: command.payer_account_id.clone(),
        entry_type: EntryType::Debit,
        amount_cents: command.amount_cents,
        currency: command.currency.clone(),
        balance_after_cents: new_payer_available,
        created_at: now,
    };
    let credit = LedgerEntry {
        id: ids.next_id(),
        payment_id: payment_id.clone(),
        account_id: command.payee_account_id.clone(),
        entry_type: EntryType::Credit,
        amount_cents: command.amount_cents,
        currency: command.currency.clone(),
        balance_after_cents: new_payee_available,
        created_at: now,
    };
    uow.ledger().add(&debit).await?;
    uow.ledger().add(&credit).await?;

    uow.balances()
        .update(
            &command.payer_account_id,
            new_payer_available,
            payer_balance.version,
        )
        .await
        .map_err(PipelineError::Db)?;
    uow.balances()
        .update(
            &command.payee_account_id,
            new_payee_available,
            payee_balance.version,
        )
        .await
        .map_err(PipelineError::Db)?;

    // 6. Enqueue the domain event in the same transaction.
    let mut payload = json!({
        "payment_id": payment_id,
        "payer_account_id": command.payer_account_id,
        "payee_account_id": command.payee_account_id,
        "amount_cents": command.amount_cents,
        "currency": command.currency,
    });
    if let Some(description) = &command.description {
        payload["description"] = json!(description);
    }
    uow.outbox()
        .add(
            &ids.next_id(),
            "Payment",
            &payment_id,
            "PaymentAuthorized",
            payload,
        )
        .await?;

    // 7. Finalize idempotency.
    uow.idempotency()
        .mark_completed(&command.idempotency_key, &payment_id, None)
        .await?;

    // 8. Commit and return.
    uow.commit().await?;
    info!(payment_id = %payment_id, "payment authorized");
    Ok(AuthorizePaymentResult::authorized(payment_id, now))
}

/// Runs the pre-lock validation sequence in its fixed order, returning
/// `Some((code, message))` for the first failing check.
async fn validate(
    uow: &mut UnitOfWork,
    command: &AuthorizePaymentCommand,
) -> Result<Option<(&'static str, String)>, DbError> {
    if command.amount_cents <= 0 {
        return Ok(Some((
            "INVALID_AMOUNT",
            format!("amount_cents must be positive, got {}", command.amount_cents),
        )));
    }
    if command.payer_account_id == command.payee_account_id {
        return Ok(Some((
            "SAME_ACCOUNT",
            format!(
                "payer and payee are the same account: {}",
                command.payer_account_id
            ),
        )));
    }
    if uow.accounts().get(&command.payer_account_id).await?.is_none() {
        return Ok(Some((
            "ACCOUNT_NOT_FOUND",
            format!("payer account {} not found", command.payer_account_id),
        )));
    }
    if uow.accounts().get(&command.payee_account_id).await?.is_none() {
        return Ok(Some((
            "ACCOUNT_NOT_FOUND",
            format!("payee account {} not found", command.payee_account_id),
        )));
    }
    match uow.balances().get(&command.payer_account_id).await? {
        Some(balance) if balance.available_balance_cents >= command.amount_cents => Ok(None),
        Some(balance) => Ok(Some((
            "INSUFFICIENT_FUNDS",
            format!(
                "account {} has {} available, needs {}",
                command.payer_account_id, balance.available_balance_cents, command.amount_cents
            ),
        ))),
        None => Ok(Some((
            "INSUFFICIENT_FUNDS",
            format!("payer account {} has no balance row", command.payer_account_id),
        ))),
    }
}
