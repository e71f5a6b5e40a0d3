// apps/payments-api/src/routes/mod.rs

pub mod authorize;
pub mod get_balance;
pub mod get_payment;
pub mod health;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::middleware::rate_limit;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let rate_limited = Router::new()
        .route("/v1/payments/authorize", post(authorize::handle))
        .route("/v1/payments/:payment_id", get(get_payment::handle))
        .route("/v1/accounts/:account_id/balance", get(get_balance::handle))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/healthz", get(health::handle))
        .merge(rate_limited)
        .with_state(state)
}
