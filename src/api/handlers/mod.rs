use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::api::models::ErrorBody;
use crate::errors::{LedgerError, ServiceError};
use crate::services::tracker::TrackerService;

pub mod games;
pub mod players;

pub struct AppState {
    pub tracker: TrackerService,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Maps service failures onto the wire: bad submissions are the
/// caller's fault, missing ids are 404, guarded deletes are 409, and a
/// replay or storage failure is a retryable 500.
pub fn error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::Ledger(LedgerError::Validation(_))
        | ServiceError::Ledger(LedgerError::UnknownPlayer(_)) => StatusCode::BAD_REQUEST,
        ServiceError::Ledger(LedgerError::GameNotFound(_))
        | ServiceError::Ledger(LedgerError::PlayerNotFound(_)) => StatusCode::NOT_FOUND,
        ServiceError::Ledger(LedgerError::PlayerHasGames(_)) => StatusCode::CONFLICT,
        ServiceError::Ledger(LedgerError::Replay(_)) | ServiceError::Storage(_) => {
            log::error!("Mutation failed: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}
