//! Umweltbundesamt air-quality client.
//!
//! The CSV endpoint returns one header row and one row per station and
//! hour, separated by `;`:
//!
//! ```text
//! Stationscode;Datum;Feinstaub (PM10) ...;Ozon (O3) ...;Stickstoffdioxid (NO2) ...;Luftqualitätsindex
//! DENW074;'01.01.2020 01:00';29;52;-;gut
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use weather_common::{
    AirQualityIndex, AirQualitySlot, AirQualitySnapshot, CheckpointSchedule, DisplayError,
    DisplayResult,
};

use crate::retry::RetryPolicy;
use crate::{get_text, AirQualitySource};

const COLUMNS: usize = 6;

#[derive(Debug, Clone, Deserialize)]
pub struct AirQualityConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// UBA station ids queried and merged
    #[serde(default = "default_stations")]
    pub stations: Vec<String>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    /// Local hours around which fresh values are fetched
    #[serde(default = "default_checkpoints")]
    pub checkpoints: Vec<u32>,
}

fn default_base_url() -> String {
    "https://www.umweltbundesamt.de/api/air_data/v2/airquality/csv".to_string()
}

fn default_stations() -> Vec<String> {
    vec!["1372".to_string(), "1129".to_string()]
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    10
}

fn default_checkpoints() -> Vec<u32> {
    CheckpointSchedule::default().hours
}

impl Default for AirQualityConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stations: default_stations(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay(),
            checkpoints: default_checkpoints(),
        }
    }
}

impl AirQualityConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.retry_delay_secs))
    }

    pub fn schedule(&self) -> CheckpointSchedule {
        CheckpointSchedule::new(self.checkpoints.clone())
    }
}

fn clean_cell(cell: &str) -> &str {
    cell.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

fn parse_measurement(cell: &str) -> DisplayResult<Option<f64>> {
    let cell = clean_cell(cell);
    if cell.is_empty() || cell == "-" {
        return Ok(None);
    }

    cell.replace(',', ".")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| DisplayError::decode("air quality", format!("invalid measurement '{}'", cell)))
}

/// A units row has no station code, or unit labels in place of every
/// measurement (`µg/m³`).
fn is_units_row(cells: &[&str]) -> bool {
    if clean_cell(cells[0]).is_empty() {
        return true;
    }
    cells[2..5].iter().map(|c| clean_cell(c)).all(|c| {
        !c.is_empty() && c != "-" && !c.chars().any(|ch| ch.is_ascii_digit())
    })
}

/// Parse one station's CSV response, merging all data rows.
///
/// The header row and any units row are skipped. Fails with
/// [`DisplayError::NoData`] when the response holds no data row, which is
/// what UBA returns before an hour has been published.
pub fn parse_station_csv(csv: &str) -> DisplayResult<AirQualitySnapshot> {
    let mut merged: Option<AirQualitySnapshot> = None;

    for line in csv.lines().filter(|line| !line.trim().is_empty()).skip(1) {
        let cells: Vec<&str> = line.split(';').collect();
        if cells.len() < COLUMNS {
            warn!(row = %line, "Skipping short CSV row");
            continue;
        }
        if is_units_row(&cells) {
            debug!(row = %line, "Skipping units row");
            continue;
        }

        let row = AirQualitySnapshot {
            pm10: parse_measurement(cells[2])?,
            o3: parse_measurement(cells[3])?,
            no2: parse_measurement(cells[4])?,
            index: AirQualityIndex::from_label(clean_cell(cells[5])),
        };

        merged = Some(match merged {
            Some(acc) => acc.merge(row),
            None => row,
        });
    }

    merged.ok_or_else(|| DisplayError::no_data("air quality", "no data rows"))
}

/// Queries all configured stations and merges their values.
pub struct AirQualityClient {
    client: Client,
    config: AirQualityConfig,
}

impl AirQualityClient {
    pub fn new(client: Client, config: AirQualityConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &AirQualityConfig {
        &self.config
    }

    fn url(&self, station: &str, slot: AirQualitySlot) -> String {
        let date = slot.date_param();
        let hour = slot.hour_param();
        format!(
            "{}?date_from={}&time_from={}&date_to={}&time_to={}&station={}&lang=de",
            self.config.base_url, date, hour, date, hour, station
        )
    }

    async fn fetch_station(&self, url: &str) -> DisplayResult<AirQualitySnapshot> {
        let body = get_text(&self.client, url, url).await?;
        parse_station_csv(&body)
    }
}

#[async_trait]
impl AirQualitySource for AirQualityClient {
    #[instrument(skip(self), fields(date = %slot.date, hour = slot.hour))]
    async fn fetch_snapshot(&self, slot: AirQualitySlot) -> DisplayResult<AirQualitySnapshot> {
        let policy = self.config.retry_policy();
        let mut merged: Option<AirQualitySnapshot> = None;

        for station in &self.config.stations {
            let url = self.url(station, slot);
            match policy.run("air quality", || self.fetch_station(&url)).await {
                Ok(snapshot) => {
                    debug!(station = %station, ?snapshot, "Station values");
                    merged = Some(match merged {
                        Some(acc) => acc.merge(snapshot),
                        None => snapshot,
                    });
                }
                Err(e) => warn!(station = %station, error = %e, "Skipping station"),
            }
        }

        let snapshot = merged.ok_or_else(|| {
            DisplayError::Transport(format!(
                "no air-quality station answered ({} configured)",
                self.config.stations.len()
            ))
        })?;

        info!(index = snapshot.index.label(), "Fetched air quality");
        Ok(snapshot)
    }
}
