//! Forecast client for the Dark Sky style forecast API.
//!
//! `GET {base_url}/{key}/{lat},{lon}?units=ca&lang=de` returns JSON with
//! `currently`, `daily.data[]` and `hourly.data[]` blocks.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use weather_common::forecast::{truncate_summary, DAILY_ENTRIES, HOURLY_ENTRIES};
use weather_common::{
    DailyForecast, DisplayError, DisplayResult, ForecastBundle, HourlyForecast, Moon,
};

use crate::retry::RetryPolicy;
use crate::{get_text, ForecastSource};

/// Forecast API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Secret API key; may be supplied via environment instead
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    /// Summary characters kept before the `...` marker
    #[serde(default = "default_summary_chars")]
    pub summary_max_chars: usize,
}

fn default_base_url() -> String {
    "https://api.darksky.net/forecast".to_string()
}

fn default_units() -> String {
    "ca".to_string()
}

fn default_lang() -> String {
    "de".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    10
}

fn default_summary_chars() -> usize {
    20
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            units: default_units(),
            lang: default_lang(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay(),
            summary_max_chars: default_summary_chars(),
        }
    }
}

impl ForecastConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.retry_delay_secs))
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    currently: Currently,
    #[serde(default)]
    daily: DataBlock<DailyPoint>,
    #[serde(default)]
    hourly: DataBlock<HourlyPoint>,
}

#[derive(Debug, Deserialize)]
struct Currently {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct DataBlock<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

impl<T> Default for DataBlock<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyPoint {
    time: i64,
    #[serde(default)]
    icon: String,
    sunrise_time: Option<i64>,
    sunset_time: Option<i64>,
    moon_phase: Option<f64>,
    #[serde(default)]
    temperature_high: f64,
    #[serde(default)]
    temperature_low: f64,
    #[serde(default)]
    wind_gust: f64,
    #[serde(default)]
    precip_probability: f64,
    #[serde(default)]
    precip_intensity_max: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HourlyPoint {
    time: i64,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    temperature: f64,
    #[serde(default)]
    wind_gust: f64,
    #[serde(default)]
    precip_probability: f64,
}

// ============================================================================
// Decoding
// ============================================================================

fn local_time<Tz: TimeZone>(tz: &Tz, unix: i64) -> DisplayResult<DateTime<Tz>> {
    tz.timestamp_opt(unix, 0)
        .single()
        .ok_or_else(|| DisplayError::decode("forecast", format!("invalid timestamp {}", unix)))
}

/// Decode a forecast response, formatting times in `tz`.
///
/// Only `currently` is mandatory. Missing daily or hourly entries leave the
/// corresponding lists short.
pub fn parse_forecast<Tz>(json: &str, tz: &Tz, summary_max_chars: usize) -> DisplayResult<ForecastBundle>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let response: ForecastResponse =
        serde_json::from_str(json).map_err(|e| DisplayError::decode("forecast", e.to_string()))?;

    let today = response.daily.data.first();

    let sunrise = match today.and_then(|d| d.sunrise_time) {
        Some(ts) => Some(local_time(tz, ts)?.format("%H:%M").to_string()),
        None => None,
    };
    let sunset = match today.and_then(|d| d.sunset_time) {
        Some(ts) => Some(local_time(tz, ts)?.format("%H:%M").to_string()),
        None => None,
    };
    let moon = today.and_then(|d| d.moon_phase).map(Moon::from_fraction);

    let daily = response
        .daily
        .data
        .iter()
        .take(DAILY_ENTRIES)
        .map(|day| {
            let time = local_time(tz, day.time)?;
            Ok(DailyForecast {
                date: time.format("%d.%m.").to_string(),
                weekday: time.format("%a").to_string(),
                icon: day.icon.clone(),
                temp_low: day.temperature_low,
                temp_high: day.temperature_high,
                wind_gust: day.wind_gust,
                rain_probability: day.precip_probability * 100.0,
                rain_intensity: day.precip_intensity_max,
            })
        })
        .collect::<DisplayResult<Vec<_>>>()?;

    let hourly = response
        .hourly
        .data
        .iter()
        .take(HOURLY_ENTRIES)
        .map(|hour| {
            Ok(HourlyForecast {
                hour_label: local_time(tz, hour.time)?.format("%H").to_string(),
                icon: hour.icon.clone(),
                temperature: hour.temperature,
                rain_probability: hour.precip_probability * 100.0,
                wind_gust: hour.wind_gust,
            })
        })
        .collect::<DisplayResult<Vec<_>>>()?;

    Ok(ForecastBundle {
        summary: truncate_summary(&response.currently.summary, summary_max_chars),
        icon: response.currently.icon,
        sunrise,
        sunset,
        moon,
        daily,
        hourly,
    })
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the forecast API.
pub struct ForecastClient {
    client: Client,
    config: ForecastConfig,
    latitude: f64,
    longitude: f64,
}

impl ForecastClient {
    pub fn new(client: Client, config: ForecastConfig, latitude: f64, longitude: f64) -> Self {
        Self {
            client,
            config,
            latitude,
            longitude,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/{}/{},{}?units={}&lang={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_key,
            self.latitude,
            self.longitude,
            self.config.units,
            self.config.lang
        )
    }

    fn display_url(&self) -> String {
        format!(
            "{}/***/{},{}",
            self.config.base_url.trim_end_matches('/'),
            self.latitude,
            self.longitude
        )
    }

    async fn fetch_once(&self, url: &str, display_url: &str) -> DisplayResult<ForecastBundle> {
        let body = get_text(&self.client, url, display_url).await?;
        if body.trim().is_empty() {
            return Err(DisplayError::no_data("forecast", "empty body"));
        }
        parse_forecast(&body, &Local, self.config.summary_max_chars)
    }
}

#[async_trait]
impl ForecastSource for ForecastClient {
    #[instrument(skip(self), fields(lat = self.latitude, lon = self.longitude))]
    async fn fetch_forecast(&self) -> DisplayResult<ForecastBundle> {
        let url = self.url();
        let display_url = self.display_url();

        let bundle = self
            .config
            .retry_policy()
            .run("forecast", || self.fetch_once(&url, &display_url))
            .await?;

        if bundle.daily.len() < DAILY_ENTRIES || bundle.hourly.len() < HOURLY_ENTRIES {
            warn!(
                daily = bundle.daily.len(),
                hourly = bundle.hourly.len(),
                "Forecast shorter than the display layout"
            );
        }

        info!(icon = %bundle.icon, "Fetched forecast");
        debug!(summary = %bundle.summary, sunrise = ?bundle.sunrise, sunset = ?bundle.sunset, "Forecast details");
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_url_layout() {
        let client = ForecastClient::new(
            Client::new(),
            ForecastConfig {
                api_key: "secret".into(),
                base_url: "https://api.example.com/forecast/".into(),
                ..Default::default()
            },
            50.9,
            6.4,
        );

        assert_eq!(
            client.url(),
            "https://api.example.com/forecast/secret/50.9,6.4?units=ca&lang=de"
        );
        assert!(!client.display_url().contains("secret"));
    }

    #[test]
    fn test_current_only_response() {
        let json = r#"{"currently":{"summary":"Clear and cold for the rest of the day.","icon":"clear-day"}}"#;
        let bundle = parse_forecast(json, &Utc, 20).unwrap();

        assert_eq!(bundle.summary, "Clear and cold for t...");
        assert_eq!(bundle.icon, "clear-day");
        assert!(bundle.daily.is_empty());
        assert!(bundle.hourly.is_empty());
        assert_eq!(bundle.sunrise, None);
        assert_eq!(bundle.moon, None);
    }

    #[test]
    fn test_missing_currently_is_decode_error() {
        let err = parse_forecast(r#"{"daily":{"data":[]}}"#, &Utc, 20).unwrap_err();
        assert!(matches!(err, DisplayError::Decode { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_default_config() {
        let config = ForecastConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.retry_policy().delay, Duration::from_secs(10));
    }
}
