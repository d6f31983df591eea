//! Device polling, persistence and per-role aggregates.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use sources::homematic::readings;
use sources::DeviceSource;
use storage::MetricStore;
use weather_common::{
    DisplayResult, IndoorConditions, OutdoorConditions, Reading, SensorKind, WindOctant,
};

use crate::config::DeviceBindings;

/// What a configured device measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRole {
    Outdoor,
    RoomA,
    RoomB,
}

impl DeviceRole {
    pub const ALL: [DeviceRole; 3] = [DeviceRole::Outdoor, DeviceRole::RoomA, DeviceRole::RoomB];

    /// Parse the role name used in room configs.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "outdoor" => Some(Self::Outdoor),
            "room_a" => Some(Self::RoomA),
            "room_b" => Some(Self::RoomB),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Outdoor => "outdoor",
            Self::RoomA => "room_a",
            Self::RoomB => "room_b",
        }
    }

    fn device<'a>(&self, bindings: &'a DeviceBindings) -> Option<&'a str> {
        match self {
            Self::Outdoor => bindings.outdoor.as_deref(),
            Self::RoomA => bindings.room_a.as_deref(),
            Self::RoomB => bindings.room_b.as_deref(),
        }
    }
}

/// Aggregated values for every bound role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorValues {
    pub outdoor: OutdoorConditions,
    pub rooms: HashMap<DeviceRole, IndoorConditions>,
}

impl SensorValues {
    /// Indoor values for `role`, empty when its device was unavailable.
    pub fn room(&self, role: DeviceRole) -> IndoorConditions {
        self.rooms.get(&role).copied().unwrap_or_default()
    }
}

fn find(readings: &[Reading], kind: SensorKind) -> Option<&Reading> {
    readings.iter().find(|r| r.kind == kind)
}

/// Current value plus today's min/max for the first reading of `kind`.
async fn current_min_max(
    store: &MetricStore,
    readings: &[Reading],
    kind: SensorKind,
    now: NaiveDateTime,
) -> DisplayResult<(Option<f64>, Option<f64>, Option<f64>)> {
    let Some(reading) = find(readings, kind) else {
        return Ok((None, None, None));
    };

    let day = now.date();
    let min = store.min(&reading.sensor_id, day).await?;
    let max = store.max(&reading.sensor_id, day).await?;
    Ok((Some(reading.value), min, max))
}

async fn outdoor_conditions(
    store: &MetricStore,
    readings: &[Reading],
    now: NaiveDateTime,
) -> DisplayResult<OutdoorConditions> {
    let (temperature, temperature_min, temperature_max) =
        current_min_max(store, readings, SensorKind::Temperature, now).await?;
    let (humidity, humidity_min, humidity_max) =
        current_min_max(store, readings, SensorKind::Humidity, now).await?;
    let (wind_speed, _, wind_speed_max) =
        current_min_max(store, readings, SensorKind::WindSpeed, now).await?;

    let rain_24h = match find(readings, SensorKind::RainCounter) {
        Some(counter) => store.delta_24h(&counter.sensor_id, now).await?,
        None => None,
    };

    let wind_direction =
        find(readings, SensorKind::WindDirection).map(|r| WindOctant::from_degrees(r.value));

    Ok(OutdoorConditions {
        temperature,
        temperature_min,
        temperature_max,
        humidity,
        humidity_min,
        humidity_max,
        rain_24h,
        wind_direction,
        wind_speed,
        wind_speed_max,
    })
}

async fn indoor_conditions(
    store: &MetricStore,
    readings: &[Reading],
    now: NaiveDateTime,
) -> DisplayResult<IndoorConditions> {
    let (temperature, temperature_min, temperature_max) =
        current_min_max(store, readings, SensorKind::Temperature, now).await?;
    let (humidity, humidity_min, humidity_max) =
        current_min_max(store, readings, SensorKind::Humidity, now).await?;

    Ok(IndoorConditions {
        temperature,
        temperature_min,
        temperature_max,
        humidity,
        humidity_min,
        humidity_max,
    })
}

/// Poll every bound device, persist all readings at `now`, then aggregate.
///
/// Device failures are logged and leave that role empty. Store failures
/// abort.
pub async fn collect(
    devices: &dyn DeviceSource,
    store: &MetricStore,
    bindings: &DeviceBindings,
    now: NaiveDateTime,
) -> DisplayResult<SensorValues> {
    let mut values = SensorValues::default();

    for role in DeviceRole::ALL {
        let Some(device_id) = role.device(bindings) else {
            debug!(role = role.as_str(), "No device bound");
            continue;
        };

        let channels = match devices.read_device(device_id).await {
            Ok(channels) => channels,
            Err(e) => {
                warn!(role = role.as_str(), device = %device_id, error = %e, "Skipping device");
                continue;
            }
        };

        let readings = readings(&channels, now);
        for reading in &readings {
            store
                .insert_at(&reading.sensor_id, reading.value, reading.timestamp)
                .await?;
        }
        info!(
            role = role.as_str(),
            device = %device_id,
            readings = readings.len(),
            "Stored device readings"
        );

        match role {
            DeviceRole::Outdoor => values.outdoor = outdoor_conditions(store, &readings, now).await?,
            DeviceRole::RoomA | DeviceRole::RoomB => {
                let conditions = indoor_conditions(store, &readings, now).await?;
                values.rooms.insert(role, conditions);
            }
        }
    }

    Ok(values)
}
