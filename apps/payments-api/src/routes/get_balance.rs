// apps/payments-api/src/routes/get_balance.rs

use axum::extract::{Path, State};
use axum::Json;
use paygate_domain_models::AccountBalance;
use paygate_infra_db::unit_of_work::UnitOfWork;

use crate::error::HandlerError;
use crate::state::AppState;

pub async fn handle(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<AccountBalance>, HandlerError> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    let balance = uow.balances().get(&account_id).await?;
    uow.rollback().await?;

    balance.map(Json).ok_or(HandlerError::NotFound)
}
