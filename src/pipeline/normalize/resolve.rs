use serde_json::Value;
use tracing::warn;

use super::coerce;
use super::policy::{NormalizationPolicy, PhonePolicy};
use crate::constants::{INVALID_NUMBER, MISSING, UNKNOWN};
use crate::pipeline::table::NormalizationReport;
use crate::types::{Column, ColumnKind, RawRecord};

fn is_missing_text(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Collapse missing or malformed values of the given columns into sentinels.
///
/// Every column is resolved on its own; no column reads another's value.
pub fn resolve_record(
    record: &mut RawRecord,
    columns: &[Column],
    policy: &NormalizationPolicy,
    report: &mut NormalizationReport,
) {
    for &column in columns {
        let value = record.get(column).cloned().unwrap_or(Value::Null);
        if let Some(resolved) = resolve_value(column, &value, policy, report) {
            record.set(column, resolved);
        }
    }
}

/// Returns the replacement for `value`, or `None` when it is kept as is
fn resolve_value(
    column: Column,
    value: &Value,
    policy: &NormalizationPolicy,
    report: &mut NormalizationReport,
) -> Option<Value> {
    match column {
        Column::FirstName
        | Column::LastName
        | Column::Email
        | Column::Department
        | Column::JobTitle
        | Column::Designation => {
            if is_missing_text(value) {
                report.record_sentinel(column);
                Some(Value::String(MISSING.to_string()))
            } else {
                None
            }
        }
        Column::Gender => {
            if is_missing_text(value) {
                report.record_sentinel(column);
                Some(Value::String(UNKNOWN.to_string()))
            } else {
                None
            }
        }
        Column::Phone => resolve_phone(value, policy.phone, report),
        Column::Salary => resolve_number(column, value, Some(Value::from(0)), report),
        Column::Age => {
            let fallback = policy.enforce_age.then(|| Value::from(0));
            resolve_number(column, value, fallback, report)
        }
        Column::YearsOfExperience => resolve_number(column, value, None, report),
        Column::HireDate | Column::FullName => None,
    }
}

fn resolve_phone(
    value: &Value,
    policy: PhonePolicy,
    report: &mut NormalizationReport,
) -> Option<Value> {
    match policy {
        PhonePolicy::FillUnknown => {
            if is_missing_text(value) {
                report.record_sentinel(Column::Phone);
                Some(Value::String(UNKNOWN.to_string()))
            } else {
                None
            }
        }
        PhonePolicy::RequireDigits => {
            let phone = coerce::text(value).unwrap_or_default();
            if !phone.is_empty() && phone.chars().all(|c| c.is_ascii_digit()) {
                None
            } else {
                report.invalid_phones += 1;
                report.record_sentinel(Column::Phone);
                Some(Value::String(INVALID_NUMBER.to_string()))
            }
        }
    }
}

/// Numeric columns: null takes the sentinel (when there is one), a non-null
/// value that cannot be read as a number takes the sentinel or becomes null.
fn resolve_number(
    column: Column,
    value: &Value,
    sentinel: Option<Value>,
    report: &mut NormalizationReport,
) -> Option<Value> {
    if value.is_null() {
        if sentinel.is_some() {
            report.record_sentinel(column);
        }
        return sentinel;
    }

    let readable = match column.kind() {
        ColumnKind::Integer => coerce::integer(value).is_some(),
        _ => coerce::number(value).is_some(),
    };
    if readable {
        return None;
    }

    report.coercion_fallbacks += 1;
    warn!("Non-numeric {} value {} replaced", column, value);
    Some(sentinel.unwrap_or(Value::Null))
}
