//! End-to-end prediction for one payload

use crate::artifacts::{ArtifactPaths, CategoryMaps, FeatureSchema};
use crate::encoder::encode;
use crate::engine::{load_regressor, postprocess, Regressor};
use crate::InferenceError;
use data_validator::RawRecord;
use feature_engine::{FeatureBuilder, FeatureError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from a single prediction
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl PredictError {
    /// Whether the payload, not the service, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictError::Feature(_) | PredictError::Inference(InferenceError::NonNumericFeature(_))
        )
    }
}

/// Predicted admissions count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionsPrediction {
    #[serde(rename = "Admissions")]
    pub admissions: i64,
}

/// Holds the model and lookup tables for the life of the process.
///
/// Read-only after construction, so one instance can serve concurrent
/// requests.
pub struct PredictionService {
    model: Box<dyn Regressor>,
    schema: FeatureSchema,
    categories: CategoryMaps,
    builder: FeatureBuilder,
}

impl PredictionService {
    pub fn new(model: Box<dyn Regressor>, schema: FeatureSchema, categories: CategoryMaps) -> Self {
        Self {
            model,
            schema,
            categories,
            builder: FeatureBuilder::new(),
        }
    }

    /// Load schema, category maps and model from disk
    pub fn load(paths: &ArtifactPaths) -> Result<Self, InferenceError> {
        let schema = FeatureSchema::load(&paths.feature_columns_path)?;
        let categories = CategoryMaps::load(&paths.category_maps_path)?;
        let model = load_regressor(&paths.model_path, schema.len())?;

        info!(
            "Prediction service ready: model={}, features={}",
            model.describe(),
            schema.len()
        );

        Ok(Self::new(model, schema, categories))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Predict admissions for one flat JSON record
    pub fn predict(&self, payload: &Map<String, Value>) -> Result<AdmissionsPrediction, PredictError> {
        let start = Instant::now();

        let record = RawRecord::from_payload(payload).map_err(FeatureError::from)?;
        let table = self.builder.build(std::slice::from_ref(&record))?;
        let rows = encode(&table, &self.schema, &self.categories)?;

        let row = rows
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("no feature rows".to_string()))?;
        if row.len() != self.schema.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.schema.len(),
                actual: row.len(),
            }
            .into());
        }

        let raw = self.model.predict_row(row)?;
        let admissions = postprocess(raw)?;

        debug!(
            "Predicted {} admissions for {}/{} in {}us",
            admissions,
            record.hospital_id,
            record.department,
            start.elapsed().as_micros()
        );

        Ok(AdmissionsPrediction { admissions })
    }
}
