use serde_json::Value;

use crate::types::{Column, RawRecord, SchemaVariant};

/// Numeric reading of a value: JSON numbers and numeric strings, finite only
pub fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// Textual reading of a value; `None` only for null
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Integer reading, truncating fractional values toward zero; `None` outside
/// the `i64` range
pub fn integer(value: &Value) -> Option<i64> {
    number(value)
        .map(f64::trunc)
        .filter(|n| *n >= i64::MIN as f64 && *n < i64::MAX as f64)
        .map(|n| n as i64)
}

/// A record whose columns all carry their canonical type, before derived
/// fields and date parsing
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedRow {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub gender: String,
    pub age: Option<i64>,
    pub job_title: Option<String>,
    pub years_of_experience: Option<f64>,
    pub salary: f64,
    pub department: String,
    pub hire_date: Option<String>,
    pub designation: Option<String>,
}

fn text_column(record: &RawRecord, column: Column) -> String {
    record.get(column).and_then(text).unwrap_or_default()
}

/// Cast every column of a resolved record. Total: values that cannot be read
/// were already replaced during resolution, anything left over maps to the
/// type's empty value.
pub fn coerce_record(record: &RawRecord, variant: SchemaVariant) -> CoercedRow {
    let bucketed = variant.derives_designation();

    CoercedRow {
        first_name: text_column(record, Column::FirstName),
        last_name: text_column(record, Column::LastName),
        phone: text_column(record, Column::Phone),
        email: text_column(record, Column::Email),
        gender: text_column(record, Column::Gender),
        age: record.get(Column::Age).and_then(integer),
        job_title: bucketed.then(|| text_column(record, Column::JobTitle)),
        years_of_experience: if bucketed {
            record.get(Column::YearsOfExperience).and_then(number)
        } else {
            None
        },
        salary: record.get(Column::Salary).and_then(number).unwrap_or(0.0),
        department: text_column(record, Column::Department),
        hire_date: record.get(Column::HireDate).and_then(text),
        designation: (!bucketed).then(|| text_column(record, Column::Designation)),
    }
}
