//! One display update: gather, persist, render, export.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{info, instrument, warn};

use renderer::{load_template, render, DisplayData, RasterExporter, RoomView};
use sources::{AirQualitySource, DeviceSource, ForecastSource};
use storage::MetricStore;
use weather_common::{AirQualitySnapshot, DisplayResult};

use crate::air_quality::{get_air_quality, AirQualityMode};
use crate::config::{DisplayConfig, RoomConfig};
use crate::sensors::{self, DeviceRole, SensorValues};

/// Upstream sources of one cycle.
#[derive(Clone, Copy)]
pub struct Sources<'a> {
    pub forecast: &'a dyn ForecastSource,
    pub devices: &'a dyn DeviceSource,
    pub air_quality: &'a dyn AirQualitySource,
}

/// Outcome of a cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Images written (or, in dry-run mode, rendered)
    pub outputs: Vec<PathBuf>,
    /// Rooms skipped because of configuration or template problems
    pub skipped_rooms: Vec<String>,
    pub forecast_available: bool,
}

async fn gather(
    config: &DisplayConfig,
    sources: Sources<'_>,
    store: &MetricStore,
    now: NaiveDateTime,
) -> DisplayResult<(SensorValues, AirQualitySnapshot)> {
    let sensors = sensors::collect(sources.devices, store, &config.homematic.devices, now).await?;

    let mode = AirQualityMode::for_time(&config.air_quality.schedule(), now);
    let air_quality = get_air_quality(mode, sources.air_quality, store, now).await?;

    Ok((sensors, air_quality))
}

/// Run a full update at local time `now`.
///
/// The store is closed before rendering starts, on success and on failure.
/// Upstream failures degrade to no-data markers; persistence and export
/// failures are returned.
#[instrument(skip_all, fields(now = %now, dry_run = dry_run))]
pub async fn run_cycle(
    config: &DisplayConfig,
    sources: Sources<'_>,
    store: MetricStore,
    exporter: &RasterExporter,
    now: NaiveDateTime,
    dry_run: bool,
) -> Result<CycleReport> {
    let forecast = match sources.forecast.fetch_forecast().await {
        Ok(bundle) => Some(bundle),
        Err(e) => {
            warn!(error = %e, "Forecast unavailable, rendering without it");
            None
        }
    };

    let gathered = gather(config, sources, &store, now).await;
    store.close().await;
    let (sensors, air_quality) = gathered.context("Failed to persist or aggregate metrics")?;

    let data = DisplayData {
        now,
        location: &config.location.city,
        forecast: forecast.as_ref(),
        outdoor: &sensors.outdoor,
        air_quality: Some(&air_quality),
        no_data: &config.render.no_data,
    };

    let mut report = CycleReport {
        forecast_available: forecast.is_some(),
        ..CycleReport::default()
    };

    for room in &config.rooms {
        match render_room(config, &data, &sensors, room) {
            Some(svg) => {
                let dest = renderer::raster::output_path(
                    &config.output.dir,
                    &config.output.file_prefix,
                    &room.name,
                );
                let resources_dir = room.template.parent();

                if dry_run {
                    let png = exporter
                        .rasterize(&svg, resources_dir)
                        .with_context(|| format!("Failed to rasterize room {}", room.name))?;
                    info!(room = %room.name, bytes = png.len(), dest = %dest.display(), "Dry run, not writing");
                } else {
                    exporter
                        .export(&svg, resources_dir, &dest)
                        .with_context(|| format!("Failed to export {}", dest.display()))?;
                }
                report.outputs.push(dest);
            }
            None => report.skipped_rooms.push(room.name.clone()),
        }
    }

    info!(
        outputs = report.outputs.len(),
        skipped = report.skipped_rooms.len(),
        forecast = report.forecast_available,
        "Cycle complete"
    );
    Ok(report)
}

/// Substituted SVG for `room`, or `None` when the room has to be skipped.
fn render_room(
    config: &DisplayConfig,
    data: &DisplayData<'_>,
    sensors: &SensorValues,
    room: &RoomConfig,
) -> Option<String> {
    let role = match DeviceRole::parse(&room.sensors) {
        Some(role @ (DeviceRole::RoomA | DeviceRole::RoomB)) => role,
        _ => {
            warn!(room = %room.name, sensors = %room.sensors, "Unknown room sensor role, skipping");
            return None;
        }
    };

    let template = match load_template(&room.template) {
        Ok(template) => template,
        Err(e) => {
            warn!(room = %room.name, error = %e, "Skipping room");
            return None;
        }
    };

    let conditions = sensors.room(role).with_humidity_override(room.humidity_override);
    let view = RoomView::new(&config.render.room_label, &room.name, conditions);
    let context = data.context(&view);

    Some(render(&template, &context))
}
