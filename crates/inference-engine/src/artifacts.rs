//! Startup artifacts: canonical feature schema and categorical levels

use crate::InferenceError;
use data_validator::Scalar;
use feature_engine::Cell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Code for a categorical value outside the known levels, or missing
pub const UNKNOWN_CATEGORY: i64 = -1;

/// Locations of the three artifacts loaded at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    /// Trained regressor (`.onnx`, or `.json` linear coefficients)
    pub model_path: PathBuf,
    /// Ordered list of model input columns
    pub feature_columns_path: PathBuf,
    /// Column -> ordered category levels
    pub category_maps_path: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("artifacts/model.onnx"),
            feature_columns_path: PathBuf::from("artifacts/feature_columns.json"),
            category_maps_path: PathBuf::from("artifacts/category_maps.json"),
        }
    }
}

fn load_error(path: &Path, reason: impl ToString) -> InferenceError {
    InferenceError::ArtifactLoad {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InferenceError> {
    let data = fs::read_to_string(path).map_err(|e| load_error(path, e))?;
    serde_json::from_str(&data).map_err(|e| load_error(path, e))
}

/// Ordered feature names the model expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty or duplicated column lists
    pub fn new(columns: Vec<String>) -> Result<Self, InferenceError> {
        if columns.is_empty() {
            return Err(InferenceError::ModelLoadError(
                "feature schema has no columns".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(InferenceError::ModelLoadError(format!(
                "duplicate feature column {}",
                dup
            )));
        }

        Ok(Self { columns })
    }

    /// Load a JSON array of column names
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let columns: Vec<String> = read_json(path)?;
        let schema = Self::new(columns).map_err(|e| load_error(path, e))?;
        info!("Loaded feature schema with {} columns", schema.len());
        Ok(schema)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Known category levels per column, in training order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMaps {
    levels: BTreeMap<String, Vec<String>>,
}

impl CategoryMaps {
    pub fn new(levels: BTreeMap<String, Vec<String>>) -> Self {
        Self { levels }
    }

    /// Load a JSON object of column -> level array.
    ///
    /// Levels may be strings or numbers; numbers are compared in their
    /// textual form.
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let raw: BTreeMap<String, Vec<Value>> = read_json(path)?;

        let mut levels = BTreeMap::new();
        for (column, values) in raw {
            let names = values
                .iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => n
                        .as_f64()
                        .map(Scalar::number_to_text)
                        .ok_or_else(|| load_error(path, format!("bad level in {}", column))),
                    _ => Err(load_error(path, format!("bad level in {}", column))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            levels.insert(column, names);
        }

        info!("Loaded category maps for {} columns", levels.len());
        Ok(Self { levels })
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    pub fn levels(&self, column: &str) -> Option<&[String]> {
        self.levels.get(column).map(Vec::as_slice)
    }

    /// Integer code of a cell in a categorical column.
    ///
    /// Returns `None` when the column is not categorical. Unknown and
    /// missing values map to [`UNKNOWN_CATEGORY`].
    pub fn code(&self, column: &str, cell: &Cell) -> Option<i64> {
        let levels = self.levels(column)?;
        let text = match cell {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => Scalar::number_to_text(*v),
            Cell::Missing => return Some(UNKNOWN_CATEGORY),
        };
        Some(
            levels
                .iter()
                .position(|level| *level == text)
                .map_or(UNKNOWN_CATEGORY, |i| i as i64),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps() -> CategoryMaps {
        let mut levels = BTreeMap::new();
        levels.insert(
            "Department".to_string(),
            vec!["Cardiology".to_string(), "ER".to_string(), "ICU".to_string()],
        );
        levels.insert("Ward".to_string(), vec!["3".to_string(), "7".to_string()]);
        CategoryMaps::new(levels)
    }

    #[test]
    fn test_known_and_unknown_levels() {
        let maps = maps();
        assert_eq!(maps.code("Department", &Cell::Text("ER".into())), Some(1));
        assert_eq!(maps.code("Department", &Cell::Text("Oncology".into())), Some(UNKNOWN_CATEGORY));
        assert_eq!(maps.code("Department", &Cell::Missing), Some(UNKNOWN_CATEGORY));
        assert_eq!(maps.code("Ward", &Cell::Number(7.0)), Some(1));
        assert_eq!(maps.code("Temperature", &Cell::Number(7.0)), None);
    }

    #[test]
    fn test_schema_validation() {
        assert!(FeatureSchema::new(vec![]).is_err());
        assert!(FeatureSchema::new(vec!["a".into(), "b".into(), "a".into()]).is_err());
        let schema = FeatureSchema::new(vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.columns()[1], "b");
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("feature_columns.json");
        let maps_path = dir.path().join("category_maps.json");
        fs::write(&schema_path, r#"["Hospital_ID", "dayofweek", "is_rain"]"#).unwrap();
        fs::write(&maps_path, r#"{"Hospital_ID": ["H1", "H2"], "Ward": [3, 7.5]}"#).unwrap();

        let schema = FeatureSchema::load(&schema_path).unwrap();
        assert_eq!(schema.columns(), ["Hospital_ID", "dayofweek", "is_rain"]);

        let maps = CategoryMaps::load(&maps_path).unwrap();
        assert_eq!(maps.columns().collect::<Vec<_>>(), vec!["Hospital_ID", "Ward"]);
        assert_eq!(maps.levels("Ward").unwrap(), ["3", "7.5"]);
    }

    #[test]
    fn test_load_failures() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            FeatureSchema::load(&missing),
            Err(InferenceError::ArtifactLoad { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"{"Hospital_ID": [["nested"]]}"#).unwrap();
        assert!(matches!(
            CategoryMaps::load(&bad),
            Err(InferenceError::ArtifactLoad { .. })
        ));
    }
}
