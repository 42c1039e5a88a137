use async_trait::async_trait;
use serde_json::Value;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::app::ports::TableOutputPort;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::pipeline::table::CanonicalTable;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Writes the table as CSV: one header row of column names, absence as empty fields
pub struct CsvTableOutput {
    path: PathBuf,
}

impl CsvTableOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TableOutputPort for CsvTableOutput {
    async fn write_table(&self, table: &CanonicalTable) -> Result<PathBuf> {
        ensure_parent_dir(&self.path)?;
        let mut writer = csv::Writer::from_path(&self.path)?;

        writer.write_record(table.column_names())?;
        for row in table.rows() {
            writer.write_record(table.columns().iter().map(|c| row.cell(*c).to_field()))?;
        }
        writer.flush()?;

        info!("Wrote {} row(s) to {}", table.len(), self.path.display());
        Ok(self.path.clone())
    }
}

/// Writes the table as a pretty-printed JSON array of objects, absence as null
pub struct JsonTableOutput {
    path: PathBuf,
}

impl JsonTableOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TableOutputPort for JsonTableOutput {
    async fn write_table(&self, table: &CanonicalTable) -> Result<PathBuf> {
        ensure_parent_dir(&self.path)?;
        let records: Vec<Value> = table
            .to_json_records()
            .into_iter()
            .map(Value::Object)
            .collect();

        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, &records)?;

        info!("Wrote {} row(s) to {}", table.len(), self.path.display());
        Ok(self.path.clone())
    }
}

/// Output adapter for a configured format
pub fn output_for(format: OutputFormat, path: impl Into<PathBuf>) -> Box<dyn TableOutputPort> {
    match format {
        OutputFormat::Csv => Box::new(CsvTableOutput::new(path)),
        OutputFormat::Json => Box::new(JsonTableOutput::new(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize::RecordNormalizer;
    use crate::types::{RawRecord, SchemaVariant};
    use serde_json::json;
    use tempfile::tempdir;

    fn table() -> CanonicalTable {
        let records: Vec<RawRecord> = serde_json::from_value(json!([
            {
                "first_name": "John",
                "last_name": "Doe",
                "phone": "12345",
                "email": "john.doe@example.com",
                "gender": "Male",
                "age": 30,
                "job_title": "Engineer",
                "years_of_experience": 5,
                "salary": 75000,
                "department": "Engineering",
                "hire_date": "2023-01-15"
            },
            {
                "first_name": "Alice",
                "last_name": "Smith, Jr.",
                "hire_date": "invalid_date"
            }
        ]))
        .unwrap();
        RecordNormalizer::for_variant(SchemaVariant::ExperienceBucketed).normalize(records)
    }

    #[tokio::test]
    async fn test_csv_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("employees.csv");

        let written = CsvTableOutput::new(&path).write_table(&table()).await.unwrap();
        assert_eq!(written, path);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(11), Some("Full Name"));
        assert_eq!(headers.get(12), Some("designation"));

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(10), Some("2023-01-15"));
        assert_eq!(rows[0].get(12), Some("Senior Data Engineer"));
        assert_eq!(rows[1].get(1), Some("Smith, Jr."));
        assert_eq!(rows[1].get(10), Some(""));
    }

    #[tokio::test]
    async fn test_json_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("employees.json");

        output_for(OutputFormat::Json, &path)
            .write_table(&table())
            .await
            .unwrap();

        let written: Vec<Value> = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0]["hire_date"], json!("2023-01-15"));
        assert_eq!(written[0]["Full Name"], json!("John Doe"));
        assert_eq!(written[1]["hire_date"], Value::Null);
        assert_eq!(written[1]["phone"], json!("Invalid Number"));
    }
}
