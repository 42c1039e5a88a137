use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use employee_normalizer::app::normalize_use_case::{NormalizeRunSummary, NormalizeUseCase};
use employee_normalizer::app::ports::RecordSourcePort;
use employee_normalizer::config::{Config, OutputFormat};
use employee_normalizer::constants::{API_URL_ENV, DEFAULT_CONFIG_PATH};
use employee_normalizer::infra::{
    output_for, HttpRecordSource, JsonFileSource, LiteralRecordSource, ReqwestHttp,
};
use employee_normalizer::observability::{self, metrics};
use employee_normalizer::pipeline::RecordNormalizer;
use employee_normalizer::types::SchemaVariant;

#[derive(Parser)]
#[command(name = "employee_normalizer")]
#[command(about = "Normalize loosely-typed employee records into a canonical table")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Write this run's metrics in Prometheus text format to a file
    #[arg(long, global = true)]
    metrics_out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize records read from a JSON file or fetched over HTTP
    Normalize {
        /// JSON file holding the record batch
        #[arg(long, conflicts_with = "url")]
        input: Option<PathBuf>,
        /// Endpoint returning the record batch (defaults to the configured URL)
        #[arg(long)]
        url: Option<String>,
        #[command(flatten)]
        opts: RunOptions,
    },
    /// Normalize the built-in sample record
    Sample {
        #[command(flatten)]
        opts: RunOptions,
    },
}

#[derive(clap::Args)]
struct RunOptions {
    /// Schema variant: manual or experience_bucketed
    #[arg(long)]
    variant: Option<SchemaVariant>,
    /// Output format: csv or json
    #[arg(long)]
    format: Option<OutputFormat>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Skip writing the table
    #[arg(long)]
    no_write: bool,
    /// Print the normalized rows as JSON
    #[arg(long)]
    print: bool,
}

fn build_source(
    config: &Config,
    input: Option<PathBuf>,
    url: Option<String>,
) -> anyhow::Result<Box<dyn RecordSourcePort>> {
    if let Some(path) = input {
        return Ok(Box::new(JsonFileSource::new(path)));
    }

    let Some(url) = url.or_else(|| config.source.url.clone()) else {
        bail!(
            "no record source: pass --input or --url, set [source].url, or set {}",
            API_URL_ENV
        );
    };

    let client = ReqwestHttp::new(Duration::from_secs(config.source.timeout_seconds))
        .context("failed to build HTTP client")?;
    Ok(Box::new(HttpRecordSource::new(Box::new(client), url)))
}

async fn run(
    mut config: Config,
    source: Box<dyn RecordSourcePort>,
    opts: RunOptions,
) -> anyhow::Result<NormalizeRunSummary> {
    if let Some(variant) = opts.variant {
        config.normalizer.variant = variant;
    }
    let format = opts.format.unwrap_or(config.output.format);
    let path = opts.output.unwrap_or_else(|| config.output.path.clone());

    let normalizer = RecordNormalizer::new(config.normalizer.policy());
    let output = (!opts.no_write).then(|| output_for(format, path));

    let summary = NormalizeUseCase::new(source, normalizer, output).run().await?;
    print_summary(&summary, opts.print)?;
    Ok(summary)
}

fn print_summary(summary: &NormalizeRunSummary, print_rows: bool) -> anyhow::Result<()> {
    let report = &summary.report;

    println!("\n📊 Normalization results ({}):", summary.table.variant());
    println!("   Source: {}", summary.source);
    println!("   Rows: {}", summary.table.len());
    println!("   Sentinels applied: {}", report.total_sentinels());
    println!("   Invalid phones: {}", report.invalid_phones);
    println!("   Unparseable hire dates: {}", report.unparseable_dates);
    if summary.table.variant().derives_designation() {
        println!("   Unknown experience: {}", report.unknown_experience);
    }
    if report.coercion_fallbacks > 0 {
        println!("   ⚠️  Non-numeric values replaced: {}", report.coercion_fallbacks);
    }
    if !report.introduced_columns.is_empty() && !summary.table.is_empty() {
        let names: Vec<&str> = report.introduced_columns.iter().map(|c| c.name()).collect();
        println!("   Columns missing from input: {}", names.join(", "));
    }
    match &summary.output_path {
        Some(path) => println!("   Output file: {}", path.display()),
        None => println!("   Output file: (not written)"),
    }

    if print_rows {
        let rows = summary.table.to_json_records();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    }
    Ok(())
}

fn write_metrics(path: &Path) -> anyhow::Result<()> {
    if let Some(rendered) = metrics::render() {
        std::fs::write(path, rendered)
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
        info!("Metrics written to {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = observability::init_logging(Path::new("logs"));

    let cli = Cli::parse();

    if let Err(e) = metrics::init() {
        warn!("Metrics disabled: {}", e);
    }

    let mut config = Config::load_or_default(&cli.config)?;
    config.apply_env_overrides();

    let result = match cli.command {
        Commands::Normalize { input, url, opts } => {
            println!("🔄 Normalizing employee records...");
            let source = build_source(&config, input, url)?;
            run(config, source, opts).await
        }
        Commands::Sample { opts } => {
            println!("🧪 Normalizing the sample record...");
            run(config, Box::new(LiteralRecordSource::sample()), opts).await
        }
    };

    if let Some(path) = &cli.metrics_out {
        write_metrics(path)?;
    }

    match result {
        Ok(_) => {
            println!("✅ Normalization completed");
            Ok(())
        }
        Err(e) => {
            println!("❌ Normalization failed: {:#}", e);
            Err(e)
        }
    }
}
