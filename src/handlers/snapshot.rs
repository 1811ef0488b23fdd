//! Snapshot refresh handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppState, AppResult};
use crate::snapshot::Snapshot;

#[derive(Debug, Serialize)]
pub struct SnapshotStatus {
    pub records: usize,
    pub loaded_at: i64,
}

/// Reload every stop record into the estimator snapshot
pub async fn refresh(
    State(state): State<AppState>,
) -> AppResult<Json<SnapshotStatus>> {
    let snapshot = Snapshot::load(&state.pool).await?;
    let status = SnapshotStatus {
        records: snapshot.len(),
        loaded_at: snapshot.loaded_at().timestamp(),
    };

    state.snapshot.replace(snapshot);
    tracing::info!("Snapshot refreshed with {} records", status.records);

    Ok(Json(status))
}
