// apps/payments-api/src/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use paygate_infra_db::errors::PipelineError;
use serde_json::json;

/// Maps a request-handling failure to a transport status code.
///
/// `Internal` covers the fatal path out of the pipeline (serialization
/// anomalies, optimistic-lock conflicts, database/broker errors) — a
/// `DECLINED` result from `authorize` is not an error at all, it's a
/// normal 200 response with a DECLINED status body.
pub enum HandlerError {
    NotFound,
    Internal(PipelineError),
}

impl From<PipelineError> for HandlerError {
    fn from(error: PipelineError) -> Self {
        Self::Internal(error)
    }
}

impl From<paygate_infra_db::errors::DbError> for HandlerError {
    fn from(error: paygate_infra_db::errors::DbError) -> Self {
        Self::Internal(PipelineError::Db(error))
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "not_found" }))).into_response()
            }
            Self::Internal(error) => {
                tracing::error!(%error, "internal error handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal", "message": error.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
