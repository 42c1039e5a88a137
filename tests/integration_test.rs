use anyhow::Result;
use async_trait::async_trait;
use employee_normalizer::app::normalize_use_case::NormalizeUseCase;
use employee_normalizer::app::ports::{HttpClientPort, HttpGetResult};
use employee_normalizer::config::{Config, OutputFormat};
use employee_normalizer::infra::{output_for, HttpRecordSource, JsonFileSource};
use employee_normalizer::{NormalizerError, RawRecord, RecordNormalizer, SchemaVariant};
use serde_json::{json, Value};
use tempfile::tempdir;

/// Serves one canned response for every request
struct CannedHttp {
    status: u16,
    body: Value,
}

#[async_trait]
impl HttpClientPort for CannedHttp {
    async fn get(&self, _url: &str) -> employee_normalizer::Result<HttpGetResult> {
        Ok(HttpGetResult {
            status: self.status,
            bytes: serde_json::to_vec(&self.body)?,
            content_type: "application/json".to_string(),
        })
    }
}

fn api_payload() -> Value {
    json!([
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
            "last_name": null,
            "phone": "123x456",
            "email": null,
            "gender": "",
            "age": null,
            "job_title": null,
            "years_of_experience": 15,
            "salary": null,
            "department": null,
            "hire_date": "invalid_date"
        }
    ])
}

fn http_source(status: u16, body: Value) -> HttpRecordSource {
    HttpRecordSource::new(
        Box::new(CannedHttp { status, body }),
        "http://api.test/employees",
    )
}

#[tokio::test]
async fn test_http_batch_to_csv() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("out").join("normalized_data.csv");

    let use_case = NormalizeUseCase::new(
        Box::new(http_source(200, api_payload())),
        RecordNormalizer::for_variant(SchemaVariant::ExperienceBucketed),
        Some(output_for(OutputFormat::Csv, &path)),
    );
    let summary = use_case.run().await?;

    assert_eq!(summary.table.len(), 2);
    assert_eq!(summary.report.invalid_phones, 1);
    assert_eq!(summary.report.unparseable_dates, 1);
    assert_eq!(summary.output_path.as_deref(), Some(path.as_path()));

    let mut reader = csv::Reader::from_path(&path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    assert_eq!(headers, summary.table.column_names());

    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    assert_eq!(rows.len(), 2);

    let column = |name: &str| headers.iter().position(|h| h == name).unwrap();
    assert_eq!(&rows[0][column("Full Name")], "John Doe");
    assert_eq!(&rows[0][column("designation")], "Senior Data Engineer");
    assert_eq!(&rows[0][column("hire_date")], "2023-01-15");
    assert_eq!(&rows[1][column("Full Name")], "Alice Missing");
    assert_eq!(&rows[1][column("phone")], "Invalid Number");
    assert_eq!(&rows[1][column("designation")], "Principal Engineer");
    assert_eq!(&rows[1][column("hire_date")], "");

    Ok(())
}

#[tokio::test]
async fn test_wrapped_payload_to_json_round_trips() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("normalized.json");

    let use_case = NormalizeUseCase::new(
        Box::new(http_source(200, json!({ "data": api_payload() }))),
        RecordNormalizer::for_variant(SchemaVariant::Manual),
        Some(output_for(OutputFormat::Json, &path)),
    );
    let summary = use_case.run().await?;

    // The written document is itself a valid batch and normalizes to the same table
    let written: Vec<RawRecord> = serde_json::from_slice(&std::fs::read(&path)?)?;
    let renormalized = RecordNormalizer::for_variant(SchemaVariant::Manual).normalize(written);
    assert_eq!(renormalized, summary.table);

    let document: Vec<Value> = serde_json::from_slice(&std::fs::read(&path)?)?;
    assert_eq!(document[1]["last_name"], json!("Missing"));
    assert_eq!(document[1]["salary"], json!(0.0));
    assert_eq!(document[1]["age"], json!(0));
    assert_eq!(document[1]["hire_date"], Value::Null);
    assert_eq!(document[0]["designation"], json!("Missing"));

    Ok(())
}

#[tokio::test]
async fn test_failed_fetch_writes_nothing() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("normalized_data.csv");

    let use_case = NormalizeUseCase::new(
        Box::new(http_source(503, json!({ "error": "unavailable" }))),
        RecordNormalizer::for_variant(SchemaVariant::ExperienceBucketed),
        Some(output_for(OutputFormat::Csv, &path)),
    );

    let err = use_case.run().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<NormalizerError>(),
        Some(NormalizerError::Api { status: 503, .. })
    ));
    assert!(!path.exists());

    Ok(())
}

#[tokio::test]
async fn test_json_file_source_with_config_policy() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("employees.json");
    std::fs::write(
        &input,
        serde_json::to_vec(&json!({ "employees": [
            { "first_name": "Ray", "last_name": "Park", "years_of_experience": null },
            { "first_name": "Mia", "last_name": "Chen", "years_of_experience": 2 }
        ]}))?,
    )?;

    let config: Config = toml::from_str(
        r#"
        [normalizer]
        variant = "experience_bucketed"
        unknown_experience = { label = "Unassigned" }
        "#,
    )?;

    let use_case = NormalizeUseCase::new(
        Box::new(JsonFileSource::new(&input)),
        RecordNormalizer::new(config.normalizer.policy()),
        None,
    );
    let summary = use_case.run().await?;

    assert_eq!(summary.output_path, None);
    assert_eq!(summary.report.unknown_experience, 1);
    assert_eq!(summary.table.rows()[0].designation, "Unassigned");
    assert_eq!(summary.table.rows()[1].designation, "System Engineer");

    Ok(())
}
