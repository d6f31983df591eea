//! Air-quality snapshots persisted one row per pollutant.

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::debug;

use weather_common::{AirQualityIndex, AirQualitySnapshot, DisplayResult, Pollutant};

use crate::store::{db_error, format_datetime, MetricStore};

impl MetricStore {
    /// Persist every present value of a snapshot plus its index, stamped
    /// with local now.
    pub async fn insert_snapshot(&self, snapshot: &AirQualitySnapshot) -> DisplayResult<()> {
        self.insert_snapshot_at(snapshot, Local::now().naive_local())
            .await
    }

    pub async fn insert_snapshot_at(
        &self,
        snapshot: &AirQualitySnapshot,
        at: NaiveDateTime,
    ) -> DisplayResult<()> {
        let stamp = format_datetime(at);

        for pollutant in Pollutant::ALL {
            let Some(value) = snapshot.value(pollutant) else {
                continue;
            };

            sqlx::query("INSERT INTO air_quality (pollutant, measurement, datetime) VALUES (?, ?, ?)")
                .bind(pollutant.key())
                .bind(value)
                .bind(&stamp)
                .execute(self.pool())
                .await
                .map_err(|e| db_error("Insert failed", e))?;
        }

        debug!(?snapshot, "Stored air-quality snapshot");
        Ok(())
    }

    /// The snapshot persisted last on `day`.
    ///
    /// Rows sharing the newest timestamp form the snapshot; pollutants
    /// absent from it are `None`, and a day without rows yields
    /// [`AirQualityIndex::Unknown`].
    pub async fn latest_snapshot(&self, day: NaiveDate) -> DisplayResult<AirQualitySnapshot> {
        let day = day.format("%Y-%m-%d").to_string();
        let mut snapshot = AirQualitySnapshot::default();

        let latest: (Option<String>,) =
            sqlx::query_as("SELECT MAX(datetime) FROM air_quality WHERE date(datetime) = ?")
                .bind(&day)
                .fetch_one(self.pool())
                .await
                .map_err(|e| db_error("Query failed", e))?;

        let Some(stamp) = latest.0 else {
            return Ok(snapshot);
        };

        let rows: Vec<(String, f64)> = sqlx::query_as(
            "SELECT pollutant, measurement FROM air_quality WHERE datetime = ? ORDER BY rowid",
        )
        .bind(&stamp)
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_error("Query failed", e))?;

        for (key, value) in rows {
            match Pollutant::from_key(&key) {
                Some(Pollutant::Pm10) => snapshot.pm10 = Some(value),
                Some(Pollutant::O3) => snapshot.o3 = Some(value),
                Some(Pollutant::No2) => snapshot.no2 = Some(value),
                Some(Pollutant::Lqi) => snapshot.index = AirQualityIndex::from_code(value as i64),
                None => debug!(pollutant = %key, "Ignoring unknown pollutant row"),
            }
        }

        Ok(snapshot)
    }
}
