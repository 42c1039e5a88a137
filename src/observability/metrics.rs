//! Metrics for normalization runs.
//!
//! Counters and histograms go through the `metrics` facade; the CLI installs a
//! Prometheus recorder so a run's figures can be rendered at the end.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::fmt;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// All metric names used in the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Source metrics
    SourceFetchSuccess,
    SourceFetchError,
    SourceRecordsFetched,

    // Normalize metrics
    NormalizeBatchesProcessed,
    NormalizeRowsProcessed,
    NormalizeSentinelsApplied,
    NormalizeInvalidPhones,
    NormalizeCoercionFallbacks,
    NormalizeUnparseableDates,
    NormalizeUnknownExperience,

    // Output metrics
    OutputTablesWritten,
    OutputWriteErrors,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SourceFetchSuccess => "employee_source_fetch_success_total",
            MetricName::SourceFetchError => "employee_source_fetch_error_total",
            MetricName::SourceRecordsFetched => "employee_source_records_fetched",

            MetricName::NormalizeBatchesProcessed => "employee_normalize_batches_processed_total",
            MetricName::NormalizeRowsProcessed => "employee_normalize_rows_processed_total",
            MetricName::NormalizeSentinelsApplied => "employee_normalize_sentinels_applied_total",
            MetricName::NormalizeInvalidPhones => "employee_normalize_invalid_phones_total",
            MetricName::NormalizeCoercionFallbacks => "employee_normalize_coercion_fallbacks_total",
            MetricName::NormalizeUnparseableDates => "employee_normalize_unparseable_dates_total",
            MetricName::NormalizeUnknownExperience => "employee_normalize_unknown_experience_total",

            MetricName::OutputTablesWritten => "employee_output_tables_written_total",
            MetricName::OutputWriteErrors => "employee_output_write_errors_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the Prometheus recorder. Calling it twice is harmless.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE.set(handle).ok();

    info!("Metrics system initialized");
    Ok(())
}

/// Prometheus exposition of everything recorded so far, if a recorder is installed
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod source {
    use super::MetricName;

    pub fn fetch_succeeded(records: usize) {
        ::metrics::counter!(MetricName::SourceFetchSuccess.as_str()).increment(1);
        ::metrics::histogram!(MetricName::SourceRecordsFetched.as_str()).record(records as f64);
    }

    pub fn fetch_failed() {
        ::metrics::counter!(MetricName::SourceFetchError.as_str()).increment(1);
    }
}

pub mod normalize {
    use super::MetricName;
    use crate::pipeline::table::NormalizationReport;

    /// Record the figures of one normalized batch
    pub fn batch_processed(variant: &str, report: &NormalizationReport) {
        let variant = variant.to_string();
        ::metrics::counter!(MetricName::NormalizeBatchesProcessed.as_str(), "variant" => variant.clone())
            .increment(1);
        ::metrics::counter!(MetricName::NormalizeRowsProcessed.as_str(), "variant" => variant)
            .increment(report.rows as u64);

        for (column, count) in &report.sentinels {
            ::metrics::counter!(
                MetricName::NormalizeSentinelsApplied.as_str(),
                "column" => column.name()
            )
            .increment(*count as u64);
        }

        ::metrics::counter!(MetricName::NormalizeInvalidPhones.as_str())
            .increment(report.invalid_phones as u64);
        ::metrics::counter!(MetricName::NormalizeCoercionFallbacks.as_str())
            .increment(report.coercion_fallbacks as u64);
        ::metrics::counter!(MetricName::NormalizeUnparseableDates.as_str())
            .increment(report.unparseable_dates as u64);
        ::metrics::counter!(MetricName::NormalizeUnknownExperience.as_str())
            .increment(report.unknown_experience as u64);
    }
}

pub mod output {
    use super::MetricName;

    pub fn table_written(format: &str) {
        ::metrics::counter!(MetricName::OutputTablesWritten.as_str(), "format" => format.to_string())
            .increment(1);
    }

    pub fn write_failed() {
        ::metrics::counter!(MetricName::OutputWriteErrors.as_str()).increment(1);
    }
}
