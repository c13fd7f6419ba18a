use axum::http::StatusCode;

use crate::engine::EngineError;

pub mod cycle;
pub mod cycle_stats;
pub mod period;
pub mod symptoms;

/// Storage failures surface for user-visible retry messaging; invalid
/// input is the caller's problem. "No data yet" never reaches here as
/// an error.
pub(crate) fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Storage(e) => {
            tracing::error!("storage failure: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::Validation(msg) => {
            tracing::warn!("rejected request: {msg}");
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}
