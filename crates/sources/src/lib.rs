//! Upstream data sources for the display.
//!
//! - Dark Sky style forecast API (JSON)
//! - Homematic CCU XML-API device state (XML)
//! - Umweltbundesamt air-quality API (CSV)
//!
//! Each source is a trait so the update cycle can run against fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use weather_common::{AirQualitySlot, AirQualitySnapshot, DisplayError, DisplayResult, ForecastBundle};

pub mod air_quality;
pub mod forecast;
pub mod homematic;
pub mod retry;

pub use air_quality::{AirQualityClient, AirQualityConfig};
pub use forecast::{ForecastClient, ForecastConfig};
pub use homematic::{Channel, Datapoint, HomematicClient, HomematicConfig};
pub use retry::RetryPolicy;

/// Source of current conditions and forecasts.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_forecast(&self) -> DisplayResult<ForecastBundle>;
}

/// Source of device channel state.
#[async_trait]
pub trait DeviceSource: Send + Sync {
    async fn read_device(&self, device_id: &str) -> DisplayResult<Vec<Channel>>;
}

/// Source of fresh air-quality measurements.
#[async_trait]
pub trait AirQualitySource: Send + Sync {
    async fn fetch_snapshot(&self, slot: AirQualitySlot) -> DisplayResult<AirQualitySnapshot>;
}

/// Build the shared HTTP client.
pub fn http_client(timeout: Duration) -> DisplayResult<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| DisplayError::Transport(format!("Failed to create HTTP client: {}", e)))
}

/// Send a GET and return the body, mapping failures onto [`DisplayError`].
///
/// `display_url` is what ends up in errors and logs; it must not carry
/// credentials.
pub(crate) async fn get_text(client: &Client, url: &str, display_url: &str) -> DisplayResult<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DisplayError::Transport(format!("{}: {}", display_url, e.without_url())))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DisplayError::HttpStatus {
            status: status.as_u16(),
            url: display_url.to_string(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| DisplayError::Transport(format!("{}: {}", display_url, e.without_url())))
}
