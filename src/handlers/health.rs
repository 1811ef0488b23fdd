//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    snapshot_records: usize,
    cached_queries: usize,
    cache_generation: u64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        snapshot_records: state.snapshot.current().len(),
        cached_queries: state.cache.len(),
        cache_generation: state.cache.generation(),
    })
}
