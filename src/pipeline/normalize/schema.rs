use serde_json::Value;
use tracing::debug;

use super::policy::UnseenColumnPolicy;
use crate::constants::MISSING;
use crate::types::{Column, RawRecord};

/// Default introduced for a column that no record in the batch carries
pub fn unseen_column_default(column: Column, policy: UnseenColumnPolicy) -> Value {
    match policy {
        UnseenColumnPolicy::Placeholder if column.is_numeric() => Value::from(0),
        UnseenColumnPolicy::Placeholder => Value::String(MISSING.to_string()),
        UnseenColumnPolicy::Absent => Value::Null,
    }
}

/// Guarantee every record holds a value for every expected column.
///
/// Columns missing from the whole batch are introduced with the policy
/// default. A key missing from a single record, while others carry it,
/// becomes null. Returns the introduced columns in schema order.
pub fn enforce_schema(
    records: &mut [RawRecord],
    columns: &[Column],
    policy: UnseenColumnPolicy,
) -> Vec<Column> {
    let mut introduced = Vec::new();

    for &column in columns {
        let seen = records.iter().any(|record| record.has(column));
        let fill = if seen {
            Value::Null
        } else {
            introduced.push(column);
            unseen_column_default(column, policy)
        };

        for record in records.iter_mut().filter(|record| !record.has(column)) {
            record.set(column, fill.clone());
        }
    }

    if !introduced.is_empty() && !records.is_empty() {
        debug!(
            "Introduced {} column(s) absent from the batch: {:?}",
            introduced.len(),
            introduced.iter().map(|c| c.name()).collect::<Vec<_>>()
        );
    }

    introduced
}
