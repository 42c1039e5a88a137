//! Record normalization: turns a batch of loosely-typed employee records into
//! a [`CanonicalTable`].
//!
//! The stages run strictly in order over the whole batch:
//! 1. schema enforcement ([`schema`])
//! 2. missing/invalid value resolution ([`resolve`])
//! 3. type coercion ([`coerce`])
//! 4. derived fields ([`derive`])
//! 5. hire date parsing ([`dates`])
//!
//! None of the stages can fail. Anything that cannot be interpreted is
//! replaced by a sentinel or an absence marker and counted in the
//! [`NormalizationReport`].

pub mod coerce;
pub mod dates;
pub mod derive;
pub mod policy;
pub mod resolve;
pub mod schema;

use tracing::{debug, info, warn};

use self::coerce::{coerce_record, CoercedRow};
use self::dates::DateParser;
use self::derive::{full_name, DesignationBands};
use self::policy::NormalizationPolicy;
use crate::pipeline::table::{CanonicalTable, EmployeeRow, NormalizationReport};
use crate::types::{RawRecord, SchemaVariant};

pub use self::policy::{PhonePolicy, UnknownExperiencePolicy, UnseenColumnPolicy};

/// Runs the normalization stages with a fixed policy set
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    policy: NormalizationPolicy,
    bands: DesignationBands,
    dates: DateParser,
}

impl RecordNormalizer {
    pub fn new(policy: NormalizationPolicy) -> Self {
        let dates = DateParser::new(policy.date_formats.clone());
        Self {
            policy,
            bands: DesignationBands::standard(),
            dates,
        }
    }

    /// Normalizer using the preset policies of a schema variant
    pub fn for_variant(variant: SchemaVariant) -> Self {
        Self::new(NormalizationPolicy::for_variant(variant))
    }

    pub fn policy(&self) -> &NormalizationPolicy {
        &self.policy
    }

    pub fn variant(&self) -> SchemaVariant {
        self.policy.variant
    }

    /// Normalize a batch into a canonical table
    pub fn normalize(&self, records: Vec<RawRecord>) -> CanonicalTable {
        self.normalize_with_report(records).0
    }

    /// Normalize a batch and report every repair that was needed
    pub fn normalize_with_report(
        &self,
        mut records: Vec<RawRecord>,
    ) -> (CanonicalTable, NormalizationReport) {
        let variant = self.policy.variant;
        let columns = variant.input_columns();
        let mut report = NormalizationReport {
            rows: records.len(),
            ..Default::default()
        };

        debug!("Normalizing {} record(s) with the {} schema", records.len(), variant);

        report.introduced_columns =
            schema::enforce_schema(&mut records, columns, self.policy.unseen_columns);

        for record in records.iter_mut() {
            resolve::resolve_record(record, columns, &self.policy, &mut report);
        }

        let rows = records
            .iter()
            .map(|record| coerce_record(record, variant))
            .enumerate()
            .map(|(index, coerced)| self.finish_row(index, coerced, &mut report))
            .collect();

        info!(
            rows = report.rows,
            sentinels = report.total_sentinels(),
            unparseable_dates = report.unparseable_dates,
            "Normalization completed"
        );

        (CanonicalTable::new(variant, rows), report)
    }

    /// Derived fields and hire date parsing for one coerced row
    fn finish_row(
        &self,
        index: usize,
        row: CoercedRow,
        report: &mut NormalizationReport,
    ) -> EmployeeRow {
        let full_name = full_name(&row.first_name, &row.last_name);

        let designation = if self.policy.variant.derives_designation() {
            let (label, known) = self
                .bands
                .assign(row.years_of_experience, &self.policy.unknown_experience);
            if !known {
                report.unknown_experience += 1;
                debug!(row = index, "Experience unknown, assigned '{}'", label);
            }
            label
        } else {
            row.designation.unwrap_or_default()
        };

        let hire_date = row.hire_date.as_deref().and_then(|raw| {
            let parsed = self.dates.parse(raw);
            if parsed.is_none() {
                report.unparseable_dates += 1;
                warn!(row = index, "Unparseable hire date '{}', stored as absent", raw);
            }
            parsed
        });

        EmployeeRow {
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            email: row.email,
            gender: row.gender,
            age: row.age,
            job_title: row.job_title,
            years_of_experience: row.years_of_experience,
            salary: row.salary,
            department: row.department,
            hire_date,
            designation,
            full_name,
        }
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(NormalizationPolicy::default())
    }
}
