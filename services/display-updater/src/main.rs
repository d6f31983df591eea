//! Kindle weather display updater.
//!
//! Runs one update cycle and exits:
//! - Fetches the forecast, device state and air-quality values
//! - Persists readings and computes today's extremes
//! - Renders each room's SVG template and exports a grayscale PNG
//!
//! Meant to be started periodically by an external scheduler.

mod air_quality;
mod config;
mod cycle;
mod sensors;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use renderer::RasterExporter;
use sources::{http_client, AirQualityClient, ForecastClient, HomematicClient};
use storage::MetricStore;

use config::DisplayConfig;
use cycle::{run_cycle, Sources};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Parser, Debug)]
#[command(name = "display-updater")]
#[command(about = "Render weather, sensor and air-quality data for Kindle displays")]
struct Args {
    /// Configuration file
    #[arg(long, env = "DISPLAY_CONFIG", default_value = "config/display.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "json")]
    log_format: LogFormat,

    /// Render and rasterize without writing output files
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true);

    match args.log_format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish())?,
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    info!(config = %args.config.display(), dry_run = args.dry_run, "Starting display update");

    let config = DisplayConfig::load(&args.config)?;

    let client = http_client(config.http.timeout()).context("Failed to build HTTP client")?;
    let forecast = ForecastClient::new(
        client.clone(),
        config.forecast.clone(),
        config.location.latitude,
        config.location.longitude,
    );
    let devices = HomematicClient::new(client.clone(), config.homematic.client_config());
    let air_quality = AirQualityClient::new(client, config.air_quality.clone());

    let store = MetricStore::open(&config.database.path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.path.display()))?;
    let exporter = RasterExporter::new();

    let sources = Sources {
        forecast: &forecast,
        devices: &devices,
        air_quality: &air_quality,
    };

    let now = Local::now().naive_local();
    match run_cycle(&config, sources, store, &exporter, now, args.dry_run).await {
        Ok(report) => {
            info!(
                outputs = report.outputs.len(),
                skipped = report.skipped_rooms.len(),
                "Display update finished"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "Display update failed");
            Err(e)
        }
    }
}
