//! Traffic stop handlers

use axum::{extract::{State, Query}, http::StatusCode, Json};
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, AppResult};
use crate::models::{clamp_limit, NewStopRecord, SearchFilter, StopRecord};

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// Latest stops; always read fresh
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<StopRecord>>> {
    let limit = clamp_limit(query.limit, state.config.recent_limit);
    let stops = StopRecord::recent(&state.pool, limit).await?;
    Ok(Json(stops))
}

/// Quick search by vehicle number and gender
pub async fn search(
    State(state): State<AppState>,
    Query(filter): Query<SearchFilter>,
) -> AppResult<Json<Vec<StopRecord>>> {
    let limit = clamp_limit(filter.limit, state.config.search_limit);
    let stops = StopRecord::search(&state.pool, &filter, limit).await?;

    tracing::debug!(
        "Quick search vehicle={:?} gender={:?} -> {} rows",
        filter.vehicle_term(), filter.gender_term(), stops.len()
    );

    Ok(Json(stops))
}

/// Add a new stop log
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<NewStopRecord>,
) -> AppResult<(StatusCode, Json<StopRecord>)> {
    req.validate()?;

    let stop = StopRecord::create(&state.pool, req).await?;
    state.cache.invalidate();

    tracing::info!("Logged stop {} for vehicle {:?}", stop.stop_id, stop.vehicle_number);

    Ok((StatusCode::CREATED, Json(stop)))
}

/// Stop durations observed in the snapshot, for the prediction form
pub async fn durations(
    State(state): State<AppState>,
) -> Json<Vec<String>> {
    Json(state.snapshot.current().stop_durations())
}
