//! Prediction handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{AppState, AppResult};
use crate::estimator::{PredictionContext, QueryFeatures};
use crate::models::{LikelihoodCounts, LikelihoodQuery, LikelihoodStats};

#[derive(Debug, Deserialize)]
pub struct PredictOutcomeRequest {
    #[serde(flatten)]
    pub features: QueryFeatures,
    #[serde(flatten)]
    pub context: PredictionContext,
}

#[derive(Debug, Serialize)]
pub struct PredictOutcomeResponse {
    pub predicted_violation: String,
    pub predicted_outcome: String,
    pub matched_history: bool,
    pub summary: String,
}

/// Most common violation and outcome among matching historical stops
pub async fn outcome(
    State(state): State<AppState>,
    Json(req): Json<PredictOutcomeRequest>,
) -> AppResult<Json<PredictOutcomeResponse>> {
    req.features.validate()?;

    let snapshot = state.snapshot.current();
    let estimate = snapshot.estimate(&req.features);
    if estimate.is_fallback() {
        tracing::debug!("Prediction used fallback labels over {} records", snapshot.len());
    }

    let matched_history = snapshot.records().iter().any(|r| req.features.matches(r));
    let summary = estimate.describe(&req.features, &req.context);

    Ok(Json(PredictOutcomeResponse {
        predicted_violation: estimate.violation,
        predicted_outcome: estimate.outcome,
        matched_history,
        summary,
    }))
}

/// Arrest and search rates among similar stops
pub async fn likelihood(
    State(state): State<AppState>,
    Json(req): Json<LikelihoodQuery>,
) -> AppResult<Json<LikelihoodStats>> {
    req.validate()?;

    let counts = LikelihoodCounts::fetch(&state.pool, &req).await?;
    Ok(Json(LikelihoodStats::from(counts)))
}
