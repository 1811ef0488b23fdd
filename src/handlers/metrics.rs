//! Summary metrics handler

use axum::{extract::State, Json};

use crate::{AppState, AppResult, AppError};
use crate::models::{SummaryMetrics, METRICS_SQL};

/// Total stops, arrests, drug-related stops and searches
pub async fn summary(
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let value = state.cache
        .get_or_try_insert(METRICS_SQL, || async {
            let metrics = SummaryMetrics::fetch(&state.pool).await?;
            let value = serde_json::to_value(metrics)
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            Ok::<_, AppError>(value)
        })
        .await?;

    Ok(Json((*value).clone()))
}
