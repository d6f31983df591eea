//! Common types and utilities shared across the kindle-weather crates.

pub mod air_quality;
pub mod error;
pub mod forecast;
pub mod format;
pub mod sensor;
pub mod time;

pub use air_quality::{AirQualityIndex, AirQualitySnapshot, Pollutant};
pub use error::{DisplayError, DisplayResult};
pub use forecast::{DailyForecast, ForecastBundle, HourlyForecast, Moon, MoonPhase};
pub use sensor::{IndoorConditions, OutdoorConditions, Reading, SensorKind, WindOctant};
pub use time::{AirQualitySlot, CheckpointSchedule};
