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
use crate::models::SymptomLog;
use crate::routes::status_for;

#[derive(Deserialize)]
pub struct NewSymptomLog {
    pub user_id: Uuid,
    pub date: Option<DateTime<Utc>>,
    pub symptoms: Vec<String>,
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: Uuid,
}

pub fn routes(engine: CycleEngine) -> Router {
    Router::new()
        .route("/symptom", post(log_symptoms))
        .route("/symptom/all", get(get_symptoms_flat))
        .with_state(engine)
}

async fn log_symptoms(
    State(engine): State<CycleEngine>,
    Json(body): Json<NewSymptomLog>,
) -> Result<(StatusCode, Json<SymptomLog>), StatusCode> {
    let date = body.date.unwrap_or_else(Utc::now);
    let log = engine
        .log_symptoms(body.user_id, date, body.symptoms)
        .await
        .map_err(|e| status_for(&e))?;
    Ok((StatusCode::CREATED, Json(log)))
}

async fn get_symptoms_flat(
    State(engine): State<CycleEngine>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<SymptomLog>>, StatusCode> {
    let logs = engine
        .symptom_history(query.user_id)
        .await
        .map_err(|e| status_for(&e))?;
    Ok(Json(logs))
}
