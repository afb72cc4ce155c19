//! Schema alignment: categorical encoding, reordering and zero imputation

use crate::artifacts::{CategoryMaps, FeatureSchema};
use crate::InferenceError;
use feature_engine::{Cell, FeatureTable};
use tracing::debug;

/// Turn a feature table into model-ready rows.
///
/// Categorical columns present in the table become level codes. Schema
/// columns missing from the table, and missing cells, become `0.0`. Columns
/// outside the schema are dropped, and every row follows schema order.
pub fn encode(
    table: &FeatureTable,
    schema: &FeatureSchema,
    categories: &CategoryMaps,
) -> Result<Vec<Vec<f64>>, InferenceError> {
    let absent = schema
        .columns()
        .iter()
        .filter(|name| !table.contains(name))
        .count();
    if absent > 0 {
        debug!("{} of {} schema columns absent, filled with 0", absent, schema.len());
    }

    let mut rows = vec![Vec::with_capacity(schema.len()); table.num_rows()];
    for name in schema.columns() {
        let Some(column) = table.column(name) else {
            rows.iter_mut().for_each(|row| row.push(0.0));
            continue;
        };

        for (row, cell) in rows.iter_mut().zip(&column.values) {
            let value = match categories.code(name, cell) {
                Some(code) => code as f64,
                None => match cell {
                    Cell::Number(v) => *v,
                    Cell::Missing => 0.0,
                    Cell::Text(_) => return Err(InferenceError::NonNumericFeature(name.clone())),
                },
            };
            row.push(value);
        }
    }

    Ok(rows)
}
