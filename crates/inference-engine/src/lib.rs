//! Admissions Inference Engine
//!
//! Loads the trained regressor and its lookup tables, aligns feature tables
//! to the canonical schema, and turns raw model output into an admissions
//! count.

mod artifacts;
mod encoder;
mod engine;
mod service;

pub use artifacts::{ArtifactPaths, CategoryMaps, FeatureSchema, UNKNOWN_CATEGORY};
pub use encoder::encode;
pub use engine::{load_regressor, postprocess, LinearRegressor, OnnxRegressor, Regressor};
pub use service::{AdmissionsPrediction, PredictError, PredictionService};

use thiserror::Error;

/// Errors during artifact loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Artifact load failed for {path}: {reason}")]
    ArtifactLoad { path: String, reason: String },
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Feature {0} is not numeric after encoding")]
    NonNumericFeature(String),
}
