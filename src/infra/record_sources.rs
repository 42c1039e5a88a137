use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::app::ports::{HttpClientPort, RecordSourcePort};
use crate::constants::PAYLOAD_ARRAY_KEYS;
use crate::error::{NormalizerError, Result};
use crate::types::RawRecord;

// Longest body excerpt carried in an API error
const ERROR_BODY_EXCERPT: usize = 200;

/// Decode a payload into a record batch. Accepts a top-level array, or an
/// object wrapping one under a well-known key.
pub fn decode_record_batch(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let payload: Value = serde_json::from_slice(bytes)?;

    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => PAYLOAD_ARRAY_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                NormalizerError::Payload(format!(
                    "expected a record array or an object with one of {:?}",
                    PAYLOAD_ARRAY_KEYS
                ))
            })?,
        other => {
            return Err(NormalizerError::Payload(format!(
                "expected a record array, got {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(NormalizerError::from))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fetches the batch with a single GET; a non-success status aborts the run
pub struct HttpRecordSource {
    client: Box<dyn HttpClientPort>,
    url: String,
}

impl HttpRecordSource {
    pub fn new(client: Box<dyn HttpClientPort>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RecordSourcePort for HttpRecordSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        info!("Fetching employee records from {}", self.url);
        let response = self.client.get(&self.url).await?;

        if !response.is_success() {
            let body = String::from_utf8_lossy(&response.bytes);
            let message: String = body.chars().take(ERROR_BODY_EXCERPT).collect();
            warn!("Record source returned status {}", response.status);
            return Err(NormalizerError::Api {
                status: response.status,
                message: if message.is_empty() {
                    format!("GET {} failed", self.url)
                } else {
                    message
                },
            });
        }

        debug!(
            "Received {} bytes ({})",
            response.bytes.len(),
            response.content_type
        );
        decode_record_batch(&response.bytes)
    }

    fn describe(&self) -> String {
        format!("GET {}", self.url)
    }
}

/// Reads the batch from a JSON file
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSourcePort for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        info!("Reading employee records from {}", self.path.display());
        let bytes = tokio::fs::read(&self.path).await?;
        decode_record_batch(&bytes)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// A batch supplied literally, in memory
pub struct LiteralRecordSource {
    records: Vec<RawRecord>,
}

impl LiteralRecordSource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// The single reference employee used for smoke runs
    pub fn sample() -> Self {
        let sample = json!({
            "first_name": "John",
            "last_name": "Doe",
            "phone": "12345",
            "gender": "Male",
            "age": 30,
            "salary": 50000,
            "department": "Engineering",
            "hire_date": "2023-01-15",
            "email": "john.doe@example.com",
            "designation": "Data Engineer"
        });
        // The literal above always matches RawRecord
        let record = serde_json::from_value(sample).unwrap_or_default();
        Self::new(vec![record])
    }
}

#[async_trait]
impl RecordSourcePort for LiteralRecordSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("{} literal record(s)", self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::HttpGetResult;
    use crate::types::Column;

    struct StaticHttp {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl HttpClientPort for StaticHttp {
        async fn get(&self, _url: &str) -> Result<HttpGetResult> {
            Ok(HttpGetResult {
                status: self.status,
                bytes: self.body.as_bytes().to_vec(),
                content_type: "application/json".to_string(),
            })
        }
    }

    #[test]
    fn test_decode_top_level_array() {
        let records = decode_record_batch(br#"[{"first_name": "John"}, {"last_name": null}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(Column::FirstName), Some(&json!("John")));
        assert_eq!(records[1].get(Column::LastName), Some(&Value::Null));
    }

    #[test]
    fn test_decode_wrapped_array() {
        let records = decode_record_batch(br#"{"count": 1, "employees": [{"first_name": "John"}]}"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_decode_rejects_other_shapes() {
        assert!(matches!(
            decode_record_batch(br#"{"count": 1}"#),
            Err(NormalizerError::Payload(_))
        ));
        assert!(matches!(
            decode_record_batch(b"42"),
            Err(NormalizerError::Payload(_))
        ));
        assert!(matches!(
            decode_record_batch(b"not json"),
            Err(NormalizerError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_http_source_surfaces_non_success_status() {
        let source = HttpRecordSource::new(
            Box::new(StaticHttp { status: 503, body: "upstream unavailable" }),
            "http://example.test/employees",
        );

        match source.fetch().await {
            Err(NormalizerError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("expected an API error, got {:?}", other.map(|r| r.len())),
        }
    }

    #[tokio::test]
    async fn test_http_source_decodes_success() {
        let source = HttpRecordSource::new(
            Box::new(StaticHttp { status: 200, body: r#"[{"first_name": "John"}]"# }),
            "http://example.test/employees",
        );
        assert_eq!(source.fetch().await.unwrap().len(), 1);
        assert_eq!(source.describe(), "GET http://example.test/employees");
    }

    #[tokio::test]
    async fn test_sample_source() {
        let records = LiteralRecordSource::sample().fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(Column::Designation), Some(&json!("Data Engineer")));
    }
}
