use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::CycleEngine;
use crate::models::CycleRecord;
use crate::routes::status_for;

#[derive(Deserialize)]
pub struct StartPeriodRequest {
    pub user_id: Uuid,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct EndPeriodRequest {
    pub user_id: Uuid,
    pub record_id: Uuid,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub user_id: Uuid,
    pub limit: Option<i64>,
}

pub fn routes(engine: CycleEngine) -> Router {
    Router::new()
        .route("/period/start", post(start_period))
        .route("/period/end", post(end_period))
        .route("/period/history", get(get_history))
        .with_state(engine)
}

async fn start_period(
    State(engine): State<CycleEngine>,
    Json(body): Json<StartPeriodRequest>,
) -> Result<(StatusCode, Json<CycleRecord>), StatusCode> {
    let date = body.date.unwrap_or_else(Utc::now);
    let record = engine
        .log_period_start(body.user_id, date)
        .await
        .map_err(|e| status_for(&e))?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// An unknown record id answers 200 with a null body rather than 404;
/// the tracker has always swallowed that case.
async fn end_period(
    State(engine): State<CycleEngine>,
    Json(body): Json<EndPeriodRequest>,
) -> Result<Json<Option<CycleRecord>>, StatusCode> {
    let date = body.date.unwrap_or_else(Utc::now);
    let record = engine
        .log_period_end(body.user_id, body.record_id, date)
        .await
        .map_err(|e| status_for(&e))?;
    Ok(Json(record))
}

async fn get_history(
    State(engine): State<CycleEngine>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<CycleRecord>>, StatusCode> {
    let records = engine
        .period_history(query.user_id, query.limit)
        .await
        .map_err(|e| status_for(&e))?;
    Ok(Json(records))
}
