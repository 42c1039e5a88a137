use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;
use crate::pipeline::table::CanonicalTable;
use crate::types::RawRecord;

/// Supplies the raw record batch. Any failure is fatal for the run.
#[async_trait]
pub trait RecordSourcePort: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RawRecord>>;

    /// Short human-readable description used in logs and summaries
    fn describe(&self) -> String;
}

/// Persists a canonical table, returning where it was written
#[async_trait]
pub trait TableOutputPort: Send + Sync {
    async fn write_table(&self, table: &CanonicalTable) -> Result<PathBuf>;
}

#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpGetResult>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl HttpGetResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
