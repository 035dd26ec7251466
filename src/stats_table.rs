//! In-memory tabular representation of one stats dataset and its CSV form.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{Error, Result};

/// One scalar value in a [`StatsTable`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            Value::String(s) => Cell::Text(s),
            // Not expected from the stats endpoint, kept as raw JSON text.
            other => Cell::Text(other.to_string()),
        }
    }

    /// Reads a CSV field back, recovering numbers and booleans where the text allows it.
    pub fn parse(field: &str) -> Self {
        if field.is_empty() {
            return Cell::Null;
        }
        if field.eq_ignore_ascii_case("true") {
            return Cell::Bool(true);
        }
        if field.eq_ignore_ascii_case("false") {
            return Cell::Bool(false);
        }
        if let Ok(i) = field.parse::<i64>() {
            return Cell::Int(i);
        }
        // "inf" and "NaN" parse as floats but are far more likely to be text here.
        if field.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(f) = field.parse::<f64>() {
                return Cell::Float(f);
            }
        }
        Cell::Text(field.to_string())
    }

    pub fn to_field(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
            Cell::Int(i) => i.to_string(),
            // Whole floats keep a decimal point so they read back as floats.
            Cell::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{f:.1}")
            }
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// Ordered columns plus rows of equal width. Column names are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl StatsTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(Error::InvalidTable(format!("duplicate column {column:?}")));
            }
        }
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::InvalidTable(format!(
                    "row {index} has {} values, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(headers: Vec<String>, row_set: Vec<Vec<Value>>) -> Result<Self> {
        let rows = row_set
            .into_iter()
            .map(|row| row.into_iter().map(Cell::from_json).collect())
            .collect();
        Self::new(headers, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Header row of column names, then one line per row. No index column.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        if self.columns.is_empty() {
            return Ok(Vec::new());
        }
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(Cell::to_field))?;
        }
        writer
            .into_inner()
            .map_err(|e| Error::Csv(e.into_error().into()))
    }

    pub fn from_csv(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.is_empty() {
            return Ok(Self::empty());
        }
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::parse).collect());
        }
        Self::new(columns, rows)
    }

    /// Appends `other` below this table. Columns must form the same set; they
    /// are reordered to this table's order when they differ only in order.
    /// `source` names where `other` came from, for the mismatch error.
    pub fn append(&mut self, other: StatsTable, source: &str) -> Result<()> {
        if other.columns == self.columns {
            self.rows.extend(other.rows);
            return Ok(());
        }

        let mismatch = || Error::SchemaMismatch {
            key: source.to_string(),
            expected: self.columns.clone(),
            found: other.columns.clone(),
        };
        if other.columns.len() != self.columns.len() {
            return Err(mismatch());
        }
        let mut order = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            match other.columns.iter().position(|c| c == column) {
                Some(index) => order.push(index),
                None => return Err(mismatch()),
            }
        }

        for row in other.rows {
            let mut cells: Vec<Option<Cell>> = row.into_iter().map(Some).collect();
            let reordered = order
                .iter()
                .map(|&index| cells[index].take().unwrap_or(Cell::Null))
                .collect();
            self.rows.push(reordered);
        }
        Ok(())
    }
}
