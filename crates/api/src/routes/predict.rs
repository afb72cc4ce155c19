//! Prediction Route

use axum::{extract::State, Json};
use inference_engine::AdmissionsPrediction;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

/// Predict admissions for one flat JSON record
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<AdmissionsPrediction>, ApiError> {
    let prediction = state.service.predict(&payload)?;
    Ok(Json(prediction))
}
