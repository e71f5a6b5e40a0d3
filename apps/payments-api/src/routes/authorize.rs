// apps/payments-api/src/routes/authorize.rs

use axum::extract::State;
use axum::Json;
use paygate_domain_models::AuthorizePaymentCommand;
use paygate_infra_db::authorize;
use serde::{Deserialize, Serialize};

use crate::error::HandlerError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    pub idempotency_key: String,
    pub payer_account_id: String,
    pub payee_account_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub payment_id: String,
    pub status: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub processed_at: chrono::DateTime<chrono::Utc>,
}

pub async fn handle(
    State(state): State<AppState>,
    Json(request): Json<AuthorizeRequest>,
) -> Result<Json<AuthorizeResponse>, HandlerError> {
    let command = AuthorizePaymentCommand {
        idempotency_key: request.idempotency_key,
        payer_account_id: request.payer_account_id,
        payee_account_id: request.payee_account_id,
        amount_cents: request.amount_cents,
        currency: request.currency,
        description: request.description,
    };

    let result = authorize(&state.pool, &state.ids, command).await?;

    Ok(Json(AuthorizeResponse {
        payment_id: result.payment_id,
        status: format!("{:?}", result.status).to_uppercase(),
        error_code: result.error_code,
        error_message: result.error_message,
        processed_at: result.processed_at,
    }))
}
