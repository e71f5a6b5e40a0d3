// apps/payments-api/src/routes/get_payment.rs

use axum::extract::{Path, State};
use axum::Json;
use paygate_domain_models::Payment;
use paygate_infra_db::unit_of_work::UnitOfWork;

use crate::error::HandlerError;
use crate::state::AppState;

pub async fn handle(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<Payment>, HandlerError> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    let payment = uow.payments().get(&payment_id).await?;
    uow.rollback().await?;

    payment.map(Json).ok_or(HandlerError::NotFound)
}
