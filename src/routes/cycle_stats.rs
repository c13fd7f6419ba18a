use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::CycleEngine;
use crate::models::CycleStats;
use crate::routes::status_for;

#[derive(Deserialize)]
pub struct CycleStatsQuery {
    pub user_id: Uuid,
}

pub fn routes(engine: CycleEngine) -> Router {
    Router::new()
        .route("/cycle-stats", get(get_cycle_stats))
        .with_state(engine)
}

/// 404 until the user has at least two logged periods; one record gives
/// no cycle-length sample to average.
async fn get_cycle_stats(
    State(engine): State<CycleEngine>,
    Query(query): Query<CycleStatsQuery>,
) -> Result<Json<CycleStats>, StatusCode> {
    let stats = engine
        .cycle_stats(query.user_id)
        .await
        .map_err(|e| status_for(&e))?;

    match stats {
        Some(stats) => Ok(Json(stats)),
        None => Err(StatusCode::NOT_FOUND),
    }
}
