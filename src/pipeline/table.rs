use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::constants::OUTPUT_DATE_FORMAT;
use crate::types::{Column, SchemaVariant};

/// One strictly-typed row of the canonical table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRow {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub gender: String,
    /// `None` only when age is not enforced and the source had no usable value
    pub age: Option<i64>,
    /// Only populated for the experience-bucketed schema
    pub job_title: Option<String>,
    /// Only populated for the experience-bucketed schema, and only when parseable
    pub years_of_experience: Option<f64>,
    pub salary: f64,
    pub department: String,
    /// `None` is the absence marker for a missing or unparseable hire date
    pub hire_date: Option<NaiveDate>,
    pub designation: String,
    pub full_name: String,
}

/// Borrowed view of a single typed value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Integer(Option<i64>),
    Float(Option<f64>),
    Date(Option<NaiveDate>),
}

impl Cell<'_> {
    /// JSON rendering; absence becomes null and dates use `YYYY-MM-DD`
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Text(s) => Value::String(s.to_string()),
            Cell::Integer(i) => i.map(Value::from).unwrap_or(Value::Null),
            Cell::Float(f) => f
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::Date(d) => d
                .map(|d| Value::String(d.format(OUTPUT_DATE_FORMAT).to_string()))
                .unwrap_or(Value::Null),
        }
    }

    /// Flat text rendering for delimited output; absence becomes an empty field
    pub fn to_field(&self) -> String {
        match self {
            Cell::Text(s) => s.to_string(),
            Cell::Integer(i) => i.map(|i| i.to_string()).unwrap_or_default(),
            Cell::Float(f) => f.map(|f| f.to_string()).unwrap_or_default(),
            Cell::Date(d) => d
                .map(|d| d.format(OUTPUT_DATE_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }
}

impl EmployeeRow {
    pub fn cell(&self, column: Column) -> Cell<'_> {
        match column {
            Column::FirstName => Cell::Text(&self.first_name),
            Column::LastName => Cell::Text(&self.last_name),
            Column::Phone => Cell::Text(&self.phone),
            Column::Email => Cell::Text(&self.email),
            Column::Gender => Cell::Text(&self.gender),
            Column::Age => Cell::Integer(self.age),
            Column::JobTitle => Cell::Text(self.job_title.as_deref().unwrap_or_default()),
            Column::YearsOfExperience => Cell::Float(self.years_of_experience),
            Column::Salary => Cell::Float(Some(self.salary)),
            Column::Department => Cell::Text(&self.department),
            Column::HireDate => Cell::Date(self.hire_date),
            Column::Designation => Cell::Text(&self.designation),
            Column::FullName => Cell::Text(&self.full_name),
        }
    }
}

/// The typed, schema-complete output of the normalizer
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTable {
    variant: SchemaVariant,
    rows: Vec<EmployeeRow>,
}

impl CanonicalTable {
    pub fn new(variant: SchemaVariant, rows: Vec<EmployeeRow>) -> Self {
        Self { variant, rows }
    }

    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    pub fn columns(&self) -> &'static [Column] {
        self.variant.output_columns()
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.name()).collect()
    }

    pub fn rows(&self) -> &[EmployeeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, top to bottom
    pub fn column(&self, column: Column) -> Vec<Cell<'_>> {
        self.rows.iter().map(|row| row.cell(column)).collect()
    }

    /// One JSON object per row keyed by column name, in schema order
    pub fn to_json_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns()
                    .iter()
                    .map(|column| (column.name().to_string(), row.cell(*column).to_json()))
                    .collect()
            })
            .collect()
    }
}

/// What the normalizer had to repair while building a table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub rows: usize,
    /// Columns absent from the whole batch that schema enforcement introduced
    pub introduced_columns: Vec<Column>,
    /// Sentinel substitutions per column
    pub sentinels: BTreeMap<Column, usize>,
    pub invalid_phones: usize,
    /// Non-null values that could not be read as numbers
    pub coercion_fallbacks: usize,
    pub unparseable_dates: usize,
    pub unknown_experience: usize,
}

impl NormalizationReport {
    pub(crate) fn record_sentinel(&mut self, column: Column) {
        *self.sentinels.entry(column).or_insert(0) += 1;
    }

    pub fn total_sentinels(&self) -> usize {
        self.sentinels.values().sum()
    }

    pub fn sentinels_for(&self, column: Column) -> usize {
        self.sentinels.get(&column).copied().unwrap_or(0)
    }
}
