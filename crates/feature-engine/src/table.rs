//! Column-oriented feature table

use data_validator::Scalar;
use serde::{Deserialize, Serialize};

/// A single value in the feature table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Wrap a number, treating non-finite values as missing
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Cell::Number(value)
        } else {
            Cell::Missing
        }
    }

    /// Wrap an optional number
    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Cell::Missing, Self::number)
    }

    /// Numeric value, if this cell holds one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&Scalar> for Cell {
    fn from(scalar: &Scalar) -> Self {
        match scalar {
            Scalar::Number(v) => Cell::number(*v),
            Scalar::Text(s) => Cell::Text(s.clone()),
        }
    }
}

/// Named column of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

/// Feature table with uniquely named, insertion-ordered columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    columns: Vec<Column>,
    num_rows: usize,
}

impl FeatureTable {
    /// Create an empty table with a fixed row count
    pub fn new(num_rows: usize) -> Self {
        Self {
            columns: Vec::new(),
            num_rows,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Insert a column, replacing any existing column of the same name in place
    pub fn insert(&mut self, name: &str, values: Vec<Cell>) {
        assert_eq!(
            values.len(),
            self.num_rows,
            "column {} has {} values for {} rows",
            name,
            values.len(),
            self.num_rows
        );

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
    }

    /// Insert a numeric column
    pub fn insert_numbers(&mut self, name: &str, values: Vec<Option<f64>>) {
        self.insert(name, values.into_iter().map(Cell::from_option).collect());
    }

    /// Cell at (row, column)
    pub fn get(&self, row: usize, name: &str) -> Option<&Cell> {
        self.column(name).and_then(|c| c.values.get(row))
    }
}
