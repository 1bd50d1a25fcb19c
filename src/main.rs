//! CLI entry point for the park climate time-series exporter.
//!
//! Provides subcommands for running the full export pipeline, listing the
//! areas of interest a configuration matches, and inspecting the dataset
//! catalog.

use anyhow::Result;
use clap::{Parser, Subcommand};
use park_climate_ts::{
    catalog,
    config::PipelineConfig,
    export,
    pipeline,
    sources::{GeoJsonAreas, GridStackSource, VectorSource},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "park_climate_ts")]
#[command(about = "Exports per-park climate band means as a flat time series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and write the merged time series
    Export {
        /// Path to a JSON pipeline config (omit for the built-in catalog)
        #[arg(short, long)]
        config: Option<String>,

        /// Directory to write the export into
        #[arg(short, long, default_value = ".")]
        output_dir: String,

        /// Optional: S3 bucket name to upload the export to (e.g., "my-bucket")
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress the export before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// List the areas of interest matching the configured filter
    ListAreas {
        /// Path to a JSON pipeline config (omit for the built-in catalog)
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Print the configured dataset catalog as JSON
    Catalog {
        /// Path to a JSON pipeline config (omit for the built-in catalog)
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/park_climate_ts.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("park_climate_ts.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            config,
            output_dir,
            s3_bucket,
            gzip,
        } => {
            export_timeseries(config.as_deref(), &output_dir, s3_bucket, gzip).await?;
        }
        Commands::ListAreas { config } => {
            let config = load_config(config.as_deref())?;
            let source =
                GeoJsonAreas::open(&config.areas.source, &config.areas.name_attribute).await?;
            let areas = source.areas(&config.areas.filter()).await?;

            for area in &areas {
                info!(
                    area_name = %area.name,
                    polygons = area.geometry.0.len(),
                    "Area"
                );
            }

            info!(
                total = areas.len(),
                filter_attribute = %config.areas.filter_attribute,
                filter_value = %config.areas.filter_value,
                "Area list summary"
            );
        }
        Commands::Catalog { config } => {
            let config = load_config(config.as_deref())?;
            info!("{}", serde_json::to_string_pretty(&config.datasets)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path),
        None => Ok(PipelineConfig::default()),
    }
}

/// Runs the full pipeline against the configured sources, writes the export,
/// and optionally uploads it to S3.
#[tracing::instrument(skip(s3_bucket, gzip), fields(output_dir))]
async fn export_timeseries(
    config: Option<&str>,
    output_dir: &str,
    s3_bucket: Option<String>,
    gzip: bool,
) -> Result<()> {
    let config = load_config(config)?;

    let rasters = GridStackSource::new();
    let vectors = GeoJsonAreas::open(&config.areas.source, &config.areas.name_attribute).await?;

    let rows = pipeline::run(&config, &rasters, &vectors).await?;

    std::fs::create_dir_all(output_dir)?;
    let columns = catalog::band_columns(&config.datasets);
    let path = export::write_table(
        output_dir,
        &config.output_name,
        config.output_format,
        &config.areas.name_attribute,
        &columns,
        &rows,
    )?;

    if let Some(bucket) = s3_bucket {
        let aws_config = aws_config::load_from_env().await;
        let client = aws_sdk_s3::Client::new(&aws_config);
        export::s3::upload_table(&client, &bucket, &path, gzip).await?;
    }

    Ok(())
}
