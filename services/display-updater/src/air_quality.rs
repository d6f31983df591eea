//! Scheduled air-quality refresh with fallback to persisted values.

use chrono::NaiveDateTime;
use tracing::{info, warn};

use sources::AirQualitySource;
use storage::MetricStore;
use weather_common::{AirQualitySlot, AirQualitySnapshot, CheckpointSchedule, DisplayResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirQualityMode {
    /// Fetch fresh values and persist them
    Write,
    /// Re-read today's latest persisted values
    Read,
}

impl AirQualityMode {
    pub fn for_time(schedule: &CheckpointSchedule, now: NaiveDateTime) -> Self {
        if schedule.is_fetch_window(now.time()) {
            Self::Write
        } else {
            Self::Read
        }
    }
}

/// Resolve the snapshot to display at `now`.
///
/// A failed fetch in write mode falls back to read mode. Store errors
/// propagate.
pub async fn get_air_quality(
    mode: AirQualityMode,
    source: &dyn AirQualitySource,
    store: &MetricStore,
    now: NaiveDateTime,
) -> DisplayResult<AirQualitySnapshot> {
    if mode == AirQualityMode::Write {
        let slot = AirQualitySlot::for_time(now);
        match source.fetch_snapshot(slot).await {
            Ok(snapshot) => {
                store.insert_snapshot_at(&snapshot, now).await?;
                info!(
                    slot = %format!("{} {}", slot.date_param(), slot.hour_param()),
                    index = snapshot.index.label(),
                    "Stored fresh air quality"
                );
                return Ok(snapshot);
            }
            Err(e) => warn!(error = %e, "Air-quality fetch failed, using stored values"),
        }
    }

    let snapshot = store.latest_snapshot(now.date()).await?;
    info!(index = snapshot.index.label(), "Read stored air quality");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use weather_common::{AirQualityIndex, DisplayError};

    struct FakeUba {
        snapshot: Option<AirQualitySnapshot>,
        slots: Mutex<Vec<AirQualitySlot>>,
    }

    impl FakeUba {
        fn new(snapshot: Option<AirQualitySnapshot>) -> Self {
            Self {
                snapshot,
                slots: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AirQualitySource for FakeUba {
        async fn fetch_snapshot(&self, slot: AirQualitySlot) -> DisplayResult<AirQualitySnapshot> {
            self.slots.lock().unwrap().push(slot);
            self.snapshot
                .ok_or_else(|| DisplayError::Transport("timed out".into()))
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn fresh() -> AirQualitySnapshot {
        AirQualitySnapshot {
            pm10: Some(29.0),
            o3: Some(52.0),
            no2: Some(9.0),
            index: AirQualityIndex::Good,
        }
    }

    #[test]
    fn test_mode_for_time() {
        let schedule = CheckpointSchedule::default();
        assert_eq!(AirQualityMode::for_time(&schedule, at("2024-05-28 09:30")), AirQualityMode::Write);
        assert_eq!(AirQualityMode::for_time(&schedule, at("2024-05-28 10:30")), AirQualityMode::Write);
        assert_eq!(AirQualityMode::for_time(&schedule, at("2024-05-28 11:45")), AirQualityMode::Read);
        assert_eq!(AirQualityMode::for_time(&schedule, at("2024-05-28 00:30")), AirQualityMode::Write);
    }

    #[tokio::test]
    async fn test_write_persists_and_returns() {
        let store = MetricStore::open_memory().await.unwrap();
        let fake = FakeUba::new(Some(fresh()));
        let now = at("2024-05-28 10:05");

        let snapshot = get_air_quality(AirQualityMode::Write, &fake, &store, now).await.unwrap();
        assert_eq!(snapshot, fresh());

        let slots = fake.slots.lock().unwrap().clone();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].hour, 8);

        assert_eq!(store.latest_snapshot(now.date()).await.unwrap(), fresh());
        store.close().await;
    }

    #[tokio::test]
    async fn test_read_does_not_fetch() {
        let store = MetricStore::open_memory().await.unwrap();
        let now = at("2024-05-28 11:45");
        store.insert_snapshot_at(&fresh(), at("2024-05-28 10:05")).await.unwrap();

        let fake = FakeUba::new(None);
        let snapshot = get_air_quality(AirQualityMode::Read, &fake, &store, now).await.unwrap();

        assert_eq!(snapshot, fresh());
        assert!(fake.slots.lock().unwrap().is_empty());
        store.close().await;
    }

    #[tokio::test]
    async fn test_failed_write_falls_back_to_read() {
        let store = MetricStore::open_memory().await.unwrap();
        store.insert_snapshot_at(&fresh(), at("2024-05-28 07:10")).await.unwrap();

        let fake = FakeUba::new(None);
        let snapshot = get_air_quality(AirQualityMode::Write, &fake, &store, at("2024-05-28 10:05"))
            .await
            .unwrap();

        assert_eq!(snapshot, fresh());
        store.close().await;
    }

    #[tokio::test]
    async fn test_empty_store_reads_unknown() {
        let store = MetricStore::open_memory().await.unwrap();
        let fake = FakeUba::new(None);
        let snapshot = get_air_quality(AirQualityMode::Read, &fake, &store, at("2024-05-28 11:45"))
            .await
            .unwrap();

        assert_eq!(snapshot.index, AirQualityIndex::Unknown);
        assert_eq!(snapshot.pm10, None);
        store.close().await;
    }
}
