//! Raw admissions record

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Payload field names as they appear on the wire
pub mod fields {
    pub const HOSPITAL_ID: &str = "Hospital_ID";
    pub const DEPARTMENT: &str = "Department";
    pub const DATE: &str = "Date";
    pub const PRECIPITATION: &str = "Precipitation";
    pub const TEMPERATURE: &str = "Temperature";
    pub const AIR_QUALITY_INDEX: &str = "Air_Quality_Index";
    pub const FLU_ACTIVITY: &str = "Flu_Activity";
    pub const STAFFING_LEVEL: &str = "Staffing_Level";
    pub const ADMISSIONS: &str = "Admissions";

    /// Fields with a dedicated slot on `RawRecord`
    pub const KNOWN: &[&str] = &[
        HOSPITAL_ID,
        DEPARTMENT,
        DATE,
        PRECIPITATION,
        TEMPERATURE,
        AIR_QUALITY_INDEX,
        FLU_ACTIVITY,
        STAFFING_LEVEL,
        ADMISSIONS,
    ];
}

/// A scalar carried through from the payload without interpretation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Render a number the way a category level is written (`3.0` -> `"3"`)
    pub fn number_to_text(value: f64) -> String {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            format!("{}", value)
        }
    }
}

/// One observation keyed by (Hospital_ID, Department, Date)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub hospital_id: String,
    pub department: String,
    /// Unparsed date; parsed by the feature builder
    pub date: String,
    pub precipitation: Option<f64>,
    pub temperature: Option<f64>,
    pub air_quality_index: Option<f64>,
    pub flu_activity: Option<String>,
    pub staffing_level: Option<f64>,
    /// Historical target, absent on most inference calls
    pub admissions: Option<f64>,
    /// Unrecognised scalar fields, passed through as model columns
    pub extra: BTreeMap<String, Scalar>,
}

impl RawRecord {
    /// Create a record carrying only the group key and date
    pub fn new(hospital_id: &str, department: &str, date: &str) -> Self {
        Self {
            hospital_id: hospital_id.to_string(),
            department: department.to_string(),
            date: date.to_string(),
            ..Default::default()
        }
    }

    /// Validate a flat JSON object into a record
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut extra = BTreeMap::new();
        for (key, value) in payload {
            if fields::KNOWN.contains(&key.as_str()) {
                continue;
            }
            if let Some(scalar) = passthrough_scalar(key, value)? {
                extra.insert(key.clone(), scalar);
            }
        }

        let record = Self {
            hospital_id: required_text(payload, fields::HOSPITAL_ID)?,
            department: required_text(payload, fields::DEPARTMENT)?,
            date: required_date(payload)?,
            precipitation: optional_number(payload, fields::PRECIPITATION)?,
            temperature: optional_number(payload, fields::TEMPERATURE)?,
            air_quality_index: optional_number(payload, fields::AIR_QUALITY_INDEX)?,
            flu_activity: optional_text(payload, fields::FLU_ACTIVITY)?,
            staffing_level: optional_number(payload, fields::STAFFING_LEVEL)?,
            admissions: optional_number(payload, fields::ADMISSIONS)?,
            extra,
        };

        debug!(
            "Validated record {}/{} on {} ({} pass-through fields)",
            record.hospital_id,
            record.department,
            record.date,
            record.extra.len()
        );

        Ok(record)
    }
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn required_text(payload: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    optional_text(payload, field)?.ok_or(ValidationError::MissingField(field))
}

fn required_date(payload: &Map<String, Value>) -> Result<String, ValidationError> {
    match payload.get(fields::DATE) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(fields::DATE)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(invalid(fields::DATE, "expected a date string")),
    }
}

fn optional_text(payload: &Map<String, Value>, field: &str) -> Result<Option<String>, ValidationError> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(n.as_f64().map(Scalar::number_to_text)),
        Some(_) => Err(invalid(field, "expected a string or number")),
    }
}

fn optional_number(payload: &Map<String, Value>, field: &str) -> Result<Option<f64>, ValidationError> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(field, "number out of range")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid(field, "expected a number")),
        Some(_) => Err(invalid(field, "expected a number")),
    }
}

fn passthrough_scalar(field: &str, value: &Value) -> Result<Option<Scalar>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(Scalar::Number(if *b { 1.0 } else { 0.0 }))),
        Value::Number(n) => n
            .as_f64()
            .map(|v| Some(Scalar::Number(v)))
            .ok_or_else(|| invalid(field, "number out of range")),
        Value::String(s) => Ok(Some(Scalar::Text(s.clone()))),
        Value::Array(_) | Value::Object(_) => Err(invalid(field, "expected a scalar value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn test_minimal_payload() {
        let record = RawRecord::from_payload(&payload(json!({
            "Hospital_ID": "H1",
            "Department": "ER",
            "Date": "2024-01-08"
        })))
        .unwrap();

        assert_eq!(record, RawRecord::new("H1", "ER", "2024-01-08"));
    }

    #[test]
    fn test_full_payload() {
        let record = RawRecord::from_payload(&payload(json!({
            "Hospital_ID": 7,
            "Department": "ICU",
            "Date": "2024-02-01",
            "Precipitation": 2.5,
            "Temperature": "11.0",
            "Air_Quality_Index": 42,
            "Flu_Activity": "High",
            "Staffing_Level": 0.9,
            "Admissions": null,
            "Region": "North",
            "Holiday": true
        })))
        .unwrap();

        assert_eq!(record.hospital_id, "7");
        assert_eq!(record.precipitation, Some(2.5));
        assert_eq!(record.temperature, Some(11.0));
        assert_eq!(record.air_quality_index, Some(42.0));
        assert_eq!(record.flu_activity.as_deref(), Some("High"));
        assert_eq!(record.admissions, None);
        assert_eq!(record.extra.get("Region"), Some(&Scalar::Text("North".into())));
        assert_eq!(record.extra.get("Holiday"), Some(&Scalar::Number(1.0)));
    }

    #[test]
    fn test_missing_keys() {
        let err = RawRecord::from_payload(&payload(json!({
            "Department": "ER",
            "Date": "2024-01-08"
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("Hospital_ID"));

        let err = RawRecord::from_payload(&payload(json!({
            "Hospital_ID": "H1",
            "Department": "ER"
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("Date"));
    }

    #[test]
    fn test_invalid_types() {
        let err = RawRecord::from_payload(&payload(json!({
            "Hospital_ID": "H1",
            "Department": "ER",
            "Date": "2024-01-08",
            "Temperature": "warm"
        })))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "Temperature"));

        let err = RawRecord::from_payload(&payload(json!({
            "Hospital_ID": "H1",
            "Department": "ER",
            "Date": 20240108
        })))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));

        let err = RawRecord::from_payload(&payload(json!({
            "Hospital_ID": "H1",
            "Department": "ER",
            "Date": "2024-01-08",
            "Tags": ["a", "b"]
        })))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "Tags"));
    }

    #[test]
    fn test_number_to_text() {
        assert_eq!(Scalar::number_to_text(3.0), "3");
        assert_eq!(Scalar::number_to_text(-2.0), "-2");
        assert_eq!(Scalar::number_to_text(3.5), "3.5");
    }
}
