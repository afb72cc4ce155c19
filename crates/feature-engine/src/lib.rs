//! Feature Engineering Engine
//!
//! Derives the model's feature table from raw admissions records: calendar
//! decomposition, weather transforms, and per-(hospital, department) rolling
//! and lag aggregates.

mod builder;
mod calendar;
pub mod columns;
mod table;
mod window;

pub use builder::{flu_code, preprocess, FeatureBuilder, LONG_WINDOW, SHORT_WINDOW};
pub use calendar::CalendarFeatures;
pub use table::{Cell, Column, FeatureTable};
pub use window::{lag, shifted_rolling_mean};

use data_validator::ValidationError;
use thiserror::Error;

/// Errors during feature derivation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
