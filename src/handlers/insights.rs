//! Canned insight handlers

use axum::{extract::{State, Path}, Json};

use crate::{AppState, AppResult, AppError};
use crate::models::{InsightDescriptor, InsightKind, InsightResult};

/// List available insights
pub async fn list() -> Json<Vec<InsightDescriptor>> {
    Json(InsightKind::ALL.into_iter().map(InsightKind::descriptor).collect())
}

/// Run one insight by slug
pub async fn run(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let kind = InsightKind::from_slug(&slug)
        .ok_or_else(|| AppError::NotFound(format!("Unknown insight '{}'", slug)))?;

    let value = state.cache
        .get_or_try_insert(&kind.sql(), || async {
            let result = InsightResult::run(&state.pool, kind).await?;
            if result.rows.is_empty() {
                tracing::info!("Insight {} returned no rows", kind.slug());
            }
            let value = serde_json::to_value(result)
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            Ok::<_, AppError>(value)
        })
        .await?;

    Ok(Json((*value).clone()))
}
