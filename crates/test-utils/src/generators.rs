//! Generators for forecast API responses.
//!
//! Values follow simple formulas so tests can predict every rendered token.

use serde_json::{json, Value};

/// 2024-05-28 00:00:00 UTC, the first forecast day.
pub const FORECAST_EPOCH: i64 = 1_716_854_400;

/// First hourly entry, 10:00 UTC on [`FORECAST_EPOCH`].
pub const FORECAST_FIRST_HOUR: i64 = FORECAST_EPOCH + 10 * 3600;

/// Rain probabilities cycled through the daily entries (exact in binary).
const DAILY_RAIN: [f64; 3] = [0.25, 0.5, 0.75];

/// Daily entry `k`:
/// low `8 + k`, high `18 + k`, gust `20 + 5k`, rain probability from
/// `[0.25, 0.5, 0.75]`, intensity `0.5k`.
pub fn daily_entry(k: usize) -> Value {
    let kf = k as f64;
    let mut entry = json!({
        "time": FORECAST_EPOCH + k as i64 * 86_400,
        "icon": if k == 1 { "rain" } else { "partly-cloudy-day" },
        "temperatureLow": 8.0 + kf,
        "temperatureHigh": 18.0 + kf,
        "windGust": 20.0 + 5.0 * kf,
        "precipProbability": DAILY_RAIN[k % DAILY_RAIN.len()],
        "precipIntensityMax": 0.5 * kf,
    });

    if k == 0 {
        entry["sunriseTime"] = json!(FORECAST_EPOCH + 3 * 3600 + 42 * 60);
        entry["sunsetTime"] = json!(FORECAST_EPOCH + 19 * 3600 + 35 * 60);
        entry["moonPhase"] = json!(0.69);
    }
    entry
}

/// Hourly entry `h`:
/// temperature `12 + 0.5h`, gust `10 + h`, rain probability `0.5` on every
/// fourth hour and `0.125` otherwise. Hour 5 has the `rain` icon.
pub fn hourly_entry(h: usize) -> Value {
    json!({
        "time": FORECAST_FIRST_HOUR + h as i64 * 3600,
        "icon": if h == 5 { "rain" } else { "cloudy" },
        "temperature": 12.0 + 0.5 * h as f64,
        "windGust": 10.0 + h as f64,
        "precipProbability": if h % 4 == 0 { 0.5 } else { 0.125 },
    })
}

/// A forecast response with `daily` and `hourly` entries.
pub fn forecast_json(daily: usize, hourly: usize) -> String {
    json!({
        "latitude": 50.9,
        "longitude": 6.4,
        "timezone": "Europe/Berlin",
        "currently": {
            "time": FORECAST_FIRST_HOUR,
            "summary": "Clear and cold for the rest of the day.",
            "icon": "clear-day",
            "temperature": 11.2,
        },
        "hourly": { "data": (0..hourly).map(hourly_entry).collect::<Vec<_>>() },
        "daily": { "data": (0..daily).map(daily_entry).collect::<Vec<_>>() },
    })
    .to_string()
}

/// A complete response covering the display layout (3 days, 24 hours).
pub fn full_forecast_json() -> String {
    forecast_json(3, 24)
}
