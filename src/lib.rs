pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod types;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub use error::{NormalizerError, Result};
pub use pipeline::{CanonicalTable, EmployeeRow, NormalizationReport, RecordNormalizer};
pub use types::{Column, RawRecord, SchemaVariant};
