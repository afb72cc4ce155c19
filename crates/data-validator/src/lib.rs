//! Data Validation
//!
//! Turns loosely typed JSON payloads into validated admissions records.

mod date;
mod error;
mod record;

pub use date::parse_date;
pub use error::ValidationError;
pub use record::{fields, RawRecord, Scalar};
