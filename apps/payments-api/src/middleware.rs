// apps/payments-api/src/middleware.rs
//
// Consults the rate limiter before dispatching to a handler. The
// identifier used is, in priority order: a caller-supplied client id
// header, the first address in a forwarded-for header, or the request
// path (standing in for the RPC method name this front door doesn't
// have, since it's HTTP rather than the RPC transport the core treats
// as an external collaborator).

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::state::AppState;

const CLIENT_ID_HEADER: &str = "x-client-id";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(limiter) = &state.rate_limiter else {
        return next.run(request).await;
    };
    if !state.settings.rate_limit_enabled {
        return next.run(request).await;
    }

    let identifier = identifier_for(&request);

    match limiter.is_allowed(&identifier).await {
        Ok((true, _remaining)) => next.run(request).await,
        Ok((false, _remaining)) => {
            warn!(%identifier, "rate limit exceeded");
            let message = format!(
                "Rate limit exceeded. Retry after {}s",
                state.settings.rate_limit_window_seconds
            );
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "resource_exhausted", "message": message })),
            )
                .into_response()
        }
        Err(error) => {
            // A rate-limiter store outage must not take down the front
            // door; fail open and let the request through.
            warn!(%error, "rate limiter unavailable, admitting request");
            next.run(request).await
        }
    }
}

fn identifier_for(request: &axum::extract::Request) -> String {
    if let Some(client_id) = header_str(request, CLIENT_ID_HEADER) {
        return client_id;
    }
    if let Some(forwarded) = header_str(request, FORWARDED_FOR_HEADER) {
        if let Some(first) = forwarded.split(',').next() {
            return first.trim().to_string();
        }
    }
    request.uri().path().to_string()
}

fn header_str(request: &axum::extract::Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v: &HeaderValue| v.to_str().ok())
        .map(|s| s.to_string())
}
