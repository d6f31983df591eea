//! Time handling for the air-quality schedule and query slots.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Hour slot of an air-quality query.
///
/// UBA publishes hourly values only after the full hour, so queries target
/// the slot two hours back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AirQualitySlot {
    pub date: NaiveDate,
    pub hour: u32,
}

impl AirQualitySlot {
    /// Hour used when the query rolls back over midnight.
    pub const ROLLOVER_HOUR: u32 = 21;

    /// Compute the slot to query at local time `now`.
    ///
    /// The date stays on today unless the current hour is `00`, in which
    /// case the query goes to yesterday at slot 21.
    pub fn for_time(now: NaiveDateTime) -> Self {
        if now.hour() == 0 {
            let yesterday = now.date() - Duration::days(1);
            return Self {
                date: yesterday,
                hour: Self::ROLLOVER_HOUR,
            };
        }

        let earlier = now - Duration::hours(2);
        Self {
            date: now.date(),
            hour: earlier.hour(),
        }
    }

    /// `YYYY-MM-DD` query parameter.
    pub fn date_param(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Two-digit hour query parameter.
    pub fn hour_param(&self) -> String {
        format!("{:02}", self.hour)
    }
}

/// Checkpoints at which fresh air-quality data is fetched.
///
/// A fetch happens within a one-hour window centered on each checkpoint,
/// e.g. 00:30-01:30 for the 01:00 checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointSchedule {
    pub hours: Vec<u32>,
}

impl Default for CheckpointSchedule {
    fn default() -> Self {
        Self {
            hours: vec![1, 4, 7, 10, 13, 16, 19, 22],
        }
    }
}

impl CheckpointSchedule {
    pub fn new(hours: Vec<u32>) -> Self {
        Self { hours }
    }

    /// Whether `time` falls inside any checkpoint window (bounds inclusive).
    pub fn is_fetch_window(&self, time: NaiveTime) -> bool {
        let minute_of_day = time.hour() * 60 + time.minute();
        self.hours.iter().any(|&hour| {
            let center = (hour % 24) * 60;
            let start = (center + MINUTES_PER_DAY - 30) % MINUTES_PER_DAY;
            let end = (center + 30) % MINUTES_PER_DAY;
            in_range(start, end, minute_of_day)
        })
    }
}

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Inclusive range check that handles windows spanning midnight.
fn in_range(start: u32, end: u32, x: u32) -> bool {
    if start <= end {
        start <= x && x <= end
    } else {
        start <= x || x <= end
    }
}
