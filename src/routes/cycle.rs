use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::CycleEngine;
use crate::models::{CycleStatus, OvulationPrediction, PeriodPrediction};
use crate::routes::status_for;

#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct PredictionsResponse {
    pub next_period: PeriodPrediction,
    pub ovulation: OvulationPrediction,
}

pub fn routes(engine: CycleEngine) -> Router {
    Router::new()
        .route("/cycle/status", get(get_status))
        .route("/cycle/predictions", get(get_predictions))
        .with_state(engine)
}

async fn get_status(
    State(engine): State<CycleEngine>,
    Query(params): Query<UserQuery>,
) -> Result<Json<CycleStatus>, StatusCode> {
    let status = engine
        .current_cycle_status(params.user_id, Utc::now())
        .await
        .map_err(|e| status_for(&e))?;
    Ok(Json(status))
}

async fn get_predictions(
    State(engine): State<CycleEngine>,
    Query(params): Query<UserQuery>,
) -> Result<Json<PredictionsResponse>, StatusCode> {
    let now = Utc::now();
    let Some(next_period) = engine
        .predict_next_period(params.user_id, now)
        .await
        .map_err(|e| status_for(&e))?
    else {
        return Err(StatusCode::NOT_FOUND);
    };

    // Ovulation only exists when the period prediction does.
    let Some(ovulation) = engine
        .predict_ovulation(params.user_id, now)
        .await
        .map_err(|e| status_for(&e))?
    else {
        return Err(StatusCode::NOT_FOUND);
    };

    Ok(Json(PredictionsResponse {
        next_period,
        ovulation,
    }))
}
