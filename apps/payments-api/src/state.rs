// apps/payments-api/src/state.rs

use std::sync::Arc;

use paygate_core_ids::IdGenerator;
use paygate_infra_dispatcher::OutboxDispatcher;
use paygate_infra_ratelimit::SlidingWindowRateLimiter;
use sqlx::PgPool;

use crate::config::Settings;

/// Shared, cloneable handle injected into every axum handler. Cloning is
/// cheap: every field is either an `Arc` or a pool that is itself
/// reference-counted internally.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ids: Arc<IdGenerator>,
    pub rate_limiter: Option<Arc<SlidingWindowRateLimiter>>,
    pub dispatcher: Arc<OutboxDispatcher>,
    pub settings: Arc<Settings>,
}
