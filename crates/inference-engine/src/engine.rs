//! Regression Models

use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use tract_onnx::prelude::*;

/// A trained model producing one scalar per feature row
pub trait Regressor: Send + Sync {
    /// Predict the raw target for one schema-ordered row
    fn predict_row(&self, features: &[f64]) -> Result<f64, InferenceError>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// ONNX regressor executed with tract
pub struct OnnxRegressor {
    plan: TypedRunnableModel<TypedModel>,
    width: usize,
    model_path: String,
}

impl OnnxRegressor {
    /// Load and optimise an ONNX model with a `[1, width]` f32 input
    pub fn load(path: &Path, width: usize) -> Result<Self, InferenceError> {
        info!("Loading ONNX model {} (width={})", path.display(), width);

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, width]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            plan,
            width,
            model_path: path.display().to_string(),
        })
    }
}

impl Regressor for OnnxRegressor {
    fn predict_row(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != self.width {
            return Err(InferenceError::InvalidInputShape {
                expected: self.width,
                actual: features.len(),
            });
        }

        let values: Vec<f32> = features.iter().map(|v| *v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.width), values)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
            .into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".to_string()))?
            .cast_to::<f64>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let view = output
            .to_array_view::<f64>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        view.iter()
            .next()
            .copied()
            .ok_or_else(|| InferenceError::InferenceFailed("empty model output".to_string()))
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.model_path)
    }
}

/// Linear model stored as JSON coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    /// Load `{"intercept": .., "coefficients": [..]}` and check its width
    pub fn load(path: &Path, width: usize) -> Result<Self, InferenceError> {
        info!("Loading linear model {}", path.display());

        let data = fs::read_to_string(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
        let model: Self = serde_json::from_str(&data)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        if model.coefficients.len() != width {
            return Err(InferenceError::InvalidInputShape {
                expected: width,
                actual: model.coefficients.len(),
            });
        }

        Ok(model)
    }
}

impl Regressor for LinearRegressor {
    fn predict_row(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != self.coefficients.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }

        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>())
    }

    fn describe(&self) -> String {
        format!("linear:{} coefficients", self.coefficients.len())
    }
}

/// Load a regressor, choosing the format by file extension
pub fn load_regressor(path: &Path, width: usize) -> Result<Box<dyn Regressor>, InferenceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let model: Box<dyn Regressor> = match extension.as_deref() {
        Some("onnx") => Box::new(OnnxRegressor::load(path, width)?),
        Some("json") => Box::new(LinearRegressor::load(path, width)?),
        _ => {
            return Err(InferenceError::ModelLoadError(format!(
                "unsupported model format: {}",
                path.display()
            )))
        }
    };

    info!("Model loaded successfully: {}", model.describe());
    Ok(model)
}

/// Round half to even and clamp to at least one admission
pub fn postprocess(raw: f64) -> Result<i64, InferenceError> {
    if !raw.is_finite() {
        return Err(InferenceError::InferenceFailed(format!(
            "non-finite model output {}",
            raw
        )));
    }

    let admissions = (raw.round_ties_even() as i64).max(1);
    debug!("Raw prediction {:.4} -> {} admissions", raw, admissions);
    Ok(admissions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postprocess_clamps_and_rounds() {
        assert_eq!(postprocess(0.3).unwrap(), 1);
        assert_eq!(postprocess(4.6).unwrap(), 5);
        assert_eq!(postprocess(-12.0).unwrap(), 1);
        assert_eq!(postprocess(4.4).unwrap(), 4);
    }

    #[test]
    fn test_postprocess_ties_to_even() {
        assert_eq!(postprocess(2.5).unwrap(), 2);
        assert_eq!(postprocess(3.5).unwrap(), 4);
        assert_eq!(postprocess(0.5).unwrap(), 1);
    }

    #[test]
    fn test_postprocess_non_finite() {
        assert!(postprocess(f64::NAN).is_err());
        assert!(postprocess(f64::INFINITY).is_err());
    }

    #[test]
    fn test_linear_prediction() {
        let model = LinearRegressor::new(1.5, vec![2.0, -1.0]);
        assert_eq!(model.predict_row(&[3.0, 4.0]).unwrap(), 3.5);
        assert!(matches!(
            model.predict_row(&[1.0]),
            Err(InferenceError::InvalidInputShape { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_load_linear_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, r#"{"intercept": 10.0, "coefficients": [1.0, 0.0, 2.0]}"#).unwrap();

        let model = load_regressor(&path, 3).unwrap();
        assert_eq!(model.predict_row(&[1.0, 5.0, 2.0]).unwrap(), 15.0);

        assert!(matches!(
            load_regressor(&path, 4),
            Err(InferenceError::InvalidInputShape { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_load_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.joblib");
        fs::write(&path, b"not a model").unwrap();
        assert!(matches!(
            load_regressor(&path, 3),
            Err(InferenceError::ModelLoadError(_))
        ));
    }

    #[test]
    fn test_missing_onnx_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        assert!(matches!(
            load_regressor(&path, 3),
            Err(InferenceError::ModelLoadError(_))
        ));
    }
}
