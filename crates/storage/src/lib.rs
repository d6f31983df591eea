//! Persistence for sensor readings and air-quality snapshots.
//!
//! Everything lives in one SQLite database accessed through `sqlx`:
//! - `sensor_data` holds append-only device readings
//! - `air_quality` holds append-only pollutant measurements

pub mod air_quality;
pub mod readings;
pub mod store;

pub use store::MetricStore;
