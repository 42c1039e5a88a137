use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::app::ports::{RecordSourcePort, TableOutputPort};
use crate::observability::metrics;
use crate::pipeline::normalize::RecordNormalizer;
use crate::pipeline::table::{CanonicalTable, NormalizationReport};

/// Outcome of one normalization run
#[derive(Debug, Clone)]
pub struct NormalizeRunSummary {
    pub run_id: Uuid,
    pub source: String,
    pub table: CanonicalTable,
    pub report: NormalizationReport,
    pub output_path: Option<PathBuf>,
}

/// Use case for fetching a batch, normalizing it and persisting the table
pub struct NormalizeUseCase {
    source: Box<dyn RecordSourcePort>,
    normalizer: RecordNormalizer,
    output: Option<Box<dyn TableOutputPort>>,
}

impl NormalizeUseCase {
    pub fn new(
        source: Box<dyn RecordSourcePort>,
        normalizer: RecordNormalizer,
        output: Option<Box<dyn TableOutputPort>>,
    ) -> Self {
        Self {
            source,
            normalizer,
            output,
        }
    }

    /// Fetch, normalize and write. A source failure aborts before
    /// normalization; nothing is written in that case.
    pub async fn run(&self) -> Result<NormalizeRunSummary> {
        let run_id = Uuid::new_v4();
        let source = self.source.describe();
        let span = info_span!("normalize_run", run_id = %run_id, source = %source);
        self.run_batch(run_id, source).instrument(span).await
    }

    async fn run_batch(&self, run_id: Uuid, source: String) -> Result<NormalizeRunSummary> {
        let records = match self.source.fetch().await {
            Ok(records) => {
                metrics::source::fetch_succeeded(records.len());
                records
            }
            Err(e) => {
                metrics::source::fetch_failed();
                error!("Record source failed: {}", e);
                return Err(e).with_context(|| format!("failed to fetch records from {}", source));
            }
        };
        info!("Fetched {} record(s)", records.len());

        let variant = self.normalizer.variant();
        let (table, report) = self.normalizer.normalize_with_report(records);
        metrics::normalize::batch_processed(variant.as_str(), &report);

        let output_path = match &self.output {
            Some(output) => match output.write_table(&table).await {
                Ok(path) => {
                    metrics::output::table_written(
                        path.extension().and_then(|e| e.to_str()).unwrap_or("unknown"),
                    );
                    Some(path)
                }
                Err(e) => {
                    metrics::output::write_failed();
                    return Err(e).context("failed to write normalized table");
                }
            },
            None => None,
        };

        Ok(NormalizeRunSummary {
            run_id,
            source,
            table,
            report,
            output_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalizerError;
    use crate::infra::record_sources::LiteralRecordSource;
    use crate::types::{RawRecord, SchemaVariant};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct FailingSource;

    #[async_trait]
    impl RecordSourcePort for FailingSource {
        async fn fetch(&self) -> crate::error::Result<Vec<RawRecord>> {
            Err(NormalizerError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        }

        fn describe(&self) -> String {
            "failing source".to_string()
        }
    }

    struct MockTableOutput {
        tables: Arc<Mutex<Vec<CanonicalTable>>>,
    }

    #[async_trait]
    impl TableOutputPort for MockTableOutput {
        async fn write_table(&self, table: &CanonicalTable) -> crate::error::Result<PathBuf> {
            self.tables.lock().await.push(table.clone());
            Ok(PathBuf::from("memory.csv"))
        }
    }

    #[tokio::test]
    async fn test_run_writes_normalized_table() {
        let tables = Arc::new(Mutex::new(Vec::new()));
        let use_case = NormalizeUseCase::new(
            Box::new(LiteralRecordSource::sample()),
            RecordNormalizer::for_variant(SchemaVariant::Manual),
            Some(Box::new(MockTableOutput { tables: tables.clone() })),
        );

        let summary = use_case.run().await.unwrap();
        assert_eq!(summary.table.len(), 1);
        assert_eq!(summary.output_path, Some(PathBuf::from("memory.csv")));
        assert_eq!(tables.lock().await.len(), 1);
        assert_eq!(summary.table.rows()[0].full_name, "John Doe");
    }

    #[tokio::test]
    async fn test_source_failure_aborts_before_output() {
        let tables = Arc::new(Mutex::new(Vec::new()));
        let use_case = NormalizeUseCase::new(
            Box::new(FailingSource),
            RecordNormalizer::default(),
            Some(Box::new(MockTableOutput { tables: tables.clone() })),
        );

        let err = use_case.run().await.unwrap_err();
        assert!(err.to_string().contains("failing source"));
        assert!(matches!(
            err.downcast_ref::<NormalizerError>(),
            Some(NormalizerError::Api { status: 500, .. })
        ));
        assert!(tables.lock().await.is_empty());
    }
}
