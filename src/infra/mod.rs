pub mod http_client;
pub mod record_sources;
pub mod table_output_adapter;

pub use http_client::ReqwestHttp;
pub use record_sources::{HttpRecordSource, JsonFileSource, LiteralRecordSource};
pub use table_output_adapter::{output_for, CsvTableOutput, JsonTableOutput};
