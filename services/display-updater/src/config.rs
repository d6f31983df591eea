//! Configuration loading for the display job.
//!
//! Loads a single YAML file, default `config/display.yaml`. Secrets may be
//! supplied through the environment instead of the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use sources::{AirQualityConfig, ForecastConfig, HomematicConfig};

/// Environment variable overriding `forecast.api_key`.
pub const FORECAST_API_KEY_ENV: &str = "FORECAST_API_KEY";

/// Environment variable overriding `database.path`.
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    pub location: LocationConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    pub homematic: HomematicSection,
    #[serde(default)]
    pub air_quality: AirQualityConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub rooms: Vec<RoomConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    /// Shown as `$LOC`
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HomematicSection {
    pub host: String,
    #[serde(default)]
    pub devices: DeviceBindings,
}

impl HomematicSection {
    pub fn client_config(&self) -> HomematicConfig {
        HomematicConfig {
            host: self.host.clone(),
        }
    }
}

/// Device id bound to each sensor role. Unbound roles render as no data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceBindings {
    pub outdoor: Option<String>,
    pub room_a: Option<String>,
    pub room_b: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/weather.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_file_prefix() -> String {
    "weatherdata".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Marker rendered in place of unavailable values
    #[serde(default = "default_no_data")]
    pub no_data: String,
    /// `$ROOM1` format; `{room}` is replaced by the room name
    #[serde(default = "default_room_label")]
    pub room_label: String,
}

fn default_no_data() -> String {
    "--".to_string()
}

fn default_room_label() -> String {
    "Innen ({room})".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            no_data: default_no_data(),
            room_label: default_room_label(),
        }
    }
}

/// One output image.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomConfig {
    pub name: String,
    /// SVG template, relative paths resolve against the config file
    pub template: PathBuf,
    /// Sensor role providing the indoor values (`room_a`, `room_b`)
    pub sensors: String,
    /// Fixed humidity for rooms whose device has no humidity channel
    #[serde(default)]
    pub humidity_override: Option<f64>,
}

impl DisplayConfig {
    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse display config")
    }

    /// Load from `path`, resolve relative paths against the file's
    /// directory and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.apply_env_overrides(|key| std::env::var(key).ok());

        info!(
            config = %path.display(),
            city = %config.location.city,
            rooms = config.rooms.len(),
            "Loaded display config"
        );
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        resolve(&mut self.database.path);
        resolve(&mut self.output.dir);
        for room in &mut self.rooms {
            resolve(&mut room.template);
        }
    }

    /// Apply secrets from the environment, looked up through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(FORECAST_API_KEY_ENV).filter(|k| !k.is_empty()) {
            debug!("Using forecast API key from environment");
            self.forecast.api_key = key;
        }
        if let Some(path) = lookup(DATABASE_PATH_ENV).filter(|p| !p.is_empty()) {
            self.database.path = PathBuf::from(path);
        }
    }
}
