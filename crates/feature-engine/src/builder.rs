//! Feature Table Assembly

use crate::calendar::CalendarFeatures;
use crate::columns;
use crate::table::{Cell, FeatureTable};
use crate::window::{lag, shifted_rolling_mean};
use crate::FeatureError;
use chrono::NaiveDateTime;
use data_validator::{fields, parse_date, RawRecord, ValidationError};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::ops::Range;
use tracing::debug;

/// Trailing window for weather, staffing and short admissions means
pub const SHORT_WINDOW: usize = 7;

/// Trailing window for the long admissions mean
pub const LONG_WINDOW: usize = 14;

/// Ordinal codes for flu activity levels
const FLU_LEVELS: [(&str, f64); 3] = [("Low", 0.0), ("Moderate", 1.0), ("High", 2.0)];

type Row<'a> = (NaiveDateTime, &'a RawRecord);

/// Ordinal code for a flu activity level; unrecognised levels have none
pub fn flu_code(level: &str) -> Option<f64> {
    FLU_LEVELS
        .iter()
        .find(|(name, _)| *name == level)
        .map(|(_, code)| *code)
}

/// Builds the feature table from raw records.
///
/// Stateless: the same records always produce the same table.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Derive features for a batch of records.
    ///
    /// Rows are sorted by (Hospital_ID, Department, Date). Rolling and lag
    /// features only look at earlier rows of the same group. `Date` and
    /// `Flu_Activity` are consumed and do not appear in the output.
    pub fn build(&self, records: &[RawRecord]) -> Result<FeatureTable, FeatureError> {
        if records.is_empty() {
            return Err(ValidationError::EmptyInput.into());
        }

        let mut rows = records
            .iter()
            .map(|r| parse_date(&r.date).map(|ts| (ts, r)))
            .collect::<Result<Vec<Row>, _>>()?;

        // stable, so equal keys keep input order
        rows.sort_by(|(a_ts, a), (b_ts, b)| {
            compare_keys(&a.hospital_id, &b.hospital_id)
                .then_with(|| compare_keys(&a.department, &b.department))
                .then_with(|| a_ts.cmp(b_ts))
        });

        let groups = group_ranges(&rows);
        let mut table = FeatureTable::new(rows.len());

        table.insert(
            fields::HOSPITAL_ID,
            rows.iter().map(|(_, r)| Cell::Text(r.hospital_id.clone())).collect(),
        );
        table.insert(
            fields::DEPARTMENT,
            rows.iter().map(|(_, r)| Cell::Text(r.department.clone())).collect(),
        );

        let precipitation = numeric_field(&rows, |r| r.precipitation);
        let temperature = numeric_field(&rows, |r| r.temperature);
        let air_quality = numeric_field(&rows, |r| r.air_quality_index);
        let staffing = numeric_field(&rows, |r| r.staffing_level);
        let admissions = numeric_field(&rows, |r| r.admissions);

        for (name, values) in [
            (fields::PRECIPITATION, &precipitation),
            (fields::TEMPERATURE, &temperature),
            (fields::AIR_QUALITY_INDEX, &air_quality),
            (fields::STAFFING_LEVEL, &staffing),
            (fields::ADMISSIONS, &admissions),
        ] {
            if let Some(values) = values {
                table.insert_numbers(name, values.clone());
            }
        }

        let extra_names: BTreeSet<&str> = rows
            .iter()
            .flat_map(|(_, r)| r.extra.keys().map(String::as_str))
            .collect();
        for name in extra_names {
            let values = rows
                .iter()
                .map(|(_, r)| r.extra.get(name).map_or(Cell::Missing, Cell::from))
                .collect();
            table.insert(name, values);
        }

        add_calendar(&mut table, &rows);

        if let Some(precip) = &precipitation {
            table.insert_numbers(
                columns::IS_RAIN,
                precip
                    .iter()
                    .map(|p| Some(if p.is_some_and(|v| v > 0.0) { 1.0 } else { 0.0 }))
                    .collect(),
            );
            table.insert_numbers(
                columns::PRECIP_LOG,
                precip.iter().map(|p| p.map(f64::ln_1p)).collect(),
            );
        }

        for (name, values) in [
            (columns::TEMPERATURE_7D_MEAN, &temperature),
            (columns::AQI_7D_MEAN, &air_quality),
        ] {
            if let Some(values) = values {
                table.insert_numbers(
                    name,
                    per_group(values, &groups, |g| shifted_rolling_mean(g, SHORT_WINDOW)),
                );
            }
        }

        let flu: Vec<Option<&str>> = rows
            .iter()
            .map(|(_, r)| r.flu_activity.as_deref())
            .collect();
        if flu.iter().any(Option::is_some) {
            let codes: Vec<Option<f64>> = flu.iter().map(|level| level.and_then(flu_code)).collect();
            let unknown = flu
                .iter()
                .zip(&codes)
                .filter(|(level, code)| level.is_some() && code.is_none())
                .count();
            if unknown > 0 {
                debug!("{} unrecognised flu activity level(s) left missing", unknown);
            }
            table.insert_numbers(columns::FLU_ACTIVITY, codes);
        }

        if let Some(values) = &staffing {
            table.insert_numbers(
                columns::STAFFING_7D_MEAN,
                per_group(values, &groups, |g| shifted_rolling_mean(g, SHORT_WINDOW)),
            );
        }

        if let Some(values) = &admissions {
            for (name, offset) in [
                (columns::ADMISSIONS_LAG_1, 1),
                (columns::ADMISSIONS_LAG_7, 7),
                (columns::ADMISSIONS_LAG_14, 14),
            ] {
                table.insert_numbers(name, per_group(values, &groups, |g| lag(g, offset)));
            }
            table.insert_numbers(
                columns::ADM_ROLL_7,
                per_group(values, &groups, |g| shifted_rolling_mean(g, SHORT_WINDOW)),
            );
            table.insert_numbers(
                columns::ADM_ROLL_14,
                per_group(values, &groups, |g| shifted_rolling_mean(g, LONG_WINDOW)),
            );
        }

        debug!(
            "Built feature table: rows={}, groups={}, columns={}",
            table.num_rows(),
            groups.len(),
            table.num_columns()
        );

        Ok(table)
    }
}

/// Derive features with a default builder
pub fn preprocess(records: &[RawRecord]) -> Result<FeatureTable, FeatureError> {
    FeatureBuilder::new().build(records)
}

fn add_calendar(table: &mut FeatureTable, rows: &[Row]) {
    let calendar: Vec<CalendarFeatures> = rows
        .iter()
        .map(|(ts, _)| CalendarFeatures::from_timestamp(ts))
        .collect();

    let column = |f: fn(&CalendarFeatures) -> f64| -> Vec<Option<f64>> {
        calendar.iter().map(|c| Some(f(c))).collect()
    };

    table.insert_numbers(columns::DAY_OF_WEEK, column(|c| c.day_of_week as f64));
    table.insert_numbers(columns::IS_WEEKEND, column(|c| if c.is_weekend { 1.0 } else { 0.0 }));
    table.insert_numbers(columns::WEEK_OF_YEAR, column(|c| c.week_of_year as f64));
    table.insert_numbers(columns::MONTH, column(|c| c.month as f64));
    table.insert_numbers(columns::QUARTER, column(|c| c.quarter as f64));
}

/// Values of a numeric field, or `None` when no record carries it
fn numeric_field(rows: &[Row], field: impl Fn(&RawRecord) -> Option<f64>) -> Option<Vec<Option<f64>>> {
    let values: Vec<Option<f64>> = rows.iter().map(|(_, r)| field(r)).collect();
    values.iter().any(Option::is_some).then_some(values)
}

/// Order group keys: numeric keys by value and ahead of text keys, text
/// keys lexically. Equal values fall back to text so distinct keys stay
/// contiguous.
fn compare_keys(a: &str, b: &str) -> Ordering {
    let numeric = |s: &str| s.trim().parse::<f64>().ok().filter(|v| v.is_finite());
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Contiguous row ranges sharing a (Hospital_ID, Department) key
fn group_ranges(rows: &[Row]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for i in 1..=rows.len() {
        let boundary = i == rows.len() || {
            let (prev, cur) = (rows[i - 1].1, rows[i].1);
            prev.hospital_id != cur.hospital_id || prev.department != cur.department
        };
        if boundary {
            ranges.push(start..i);
            start = i;
        }
    }
    ranges
}

/// Apply a series transform to each group independently
fn per_group(
    values: &[Option<f64>],
    groups: &[Range<usize>],
    transform: impl Fn(&[Option<f64>]) -> Vec<Option<f64>>,
) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for range in groups {
        out.extend(transform(&values[range.clone()]));
    }
    out
}
