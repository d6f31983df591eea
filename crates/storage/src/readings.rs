//! Sensor readings: inserts and per-day aggregates.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use tracing::debug;

use weather_common::DisplayResult;

use crate::store::{db_error, format_datetime, MetricStore};

impl MetricStore {
    /// Append a reading stamped with the current local time.
    pub async fn insert(&self, sensor_id: &str, value: f64) -> DisplayResult<()> {
        self.insert_at(sensor_id, value, Local::now().naive_local())
            .await
    }

    /// Append a reading with an explicit timestamp.
    pub async fn insert_at(
        &self,
        sensor_id: &str,
        value: f64,
        at: NaiveDateTime,
    ) -> DisplayResult<()> {
        sqlx::query("INSERT INTO sensor_data (sensor, value, datetime) VALUES (?, ?, ?)")
            .bind(sensor_id)
            .bind(value)
            .bind(format_datetime(at))
            .execute(self.pool())
            .await
            .map_err(|e| db_error("Insert failed", e))?;

        debug!(sensor = %sensor_id, value, "Stored reading");
        Ok(())
    }

    /// Lowest value recorded for `sensor_id` on `day`.
    pub async fn min(&self, sensor_id: &str, day: NaiveDate) -> DisplayResult<Option<f64>> {
        self.day_aggregate("MIN", sensor_id, day).await
    }

    /// Highest value recorded for `sensor_id` on `day`.
    pub async fn max(&self, sensor_id: &str, day: NaiveDate) -> DisplayResult<Option<f64>> {
        self.day_aggregate("MAX", sensor_id, day).await
    }

    async fn day_aggregate(
        &self,
        function: &'static str,
        sensor_id: &str,
        day: NaiveDate,
    ) -> DisplayResult<Option<f64>> {
        let sql = format!(
            "SELECT {}(value) FROM sensor_data WHERE sensor = ? AND date(datetime) = ?",
            function
        );

        let row: (Option<f64>,) = sqlx::query_as(&sql)
            .bind(sensor_id)
            .bind(day.format("%Y-%m-%d").to_string())
            .fetch_one(self.pool())
            .await
            .map_err(|e| db_error("Query failed", e))?;

        Ok(row.0)
    }

    /// Spread (max − min) of `sensor_id` over the 24 hours before `now`.
    ///
    /// For a monotonically increasing counter this is the amount accumulated
    /// in the window.
    pub async fn delta_24h(
        &self,
        sensor_id: &str,
        now: NaiveDateTime,
    ) -> DisplayResult<Option<f64>> {
        let since = now - Duration::hours(24);

        let row: (Option<f64>, Option<f64>) = sqlx::query_as(
            "SELECT MIN(value), MAX(value) FROM sensor_data \
             WHERE sensor = ? AND datetime >= ? AND datetime <= ?",
        )
        .bind(sensor_id)
        .bind(format_datetime(since))
        .bind(format_datetime(now))
        .fetch_one(self.pool())
        .await
        .map_err(|e| db_error("Query failed", e))?;

        Ok(match row {
            (Some(min), Some(max)) => Some(max - min),
            _ => None,
        })
    }

    /// Number of readings stored for `sensor_id`.
    pub async fn reading_count(&self, sensor_id: &str) -> DisplayResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sensor_data WHERE sensor = ?")
            .bind(sensor_id)
            .fetch_one(self.pool())
            .await
            .map_err(|e| db_error("Query failed", e))?;

        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_min_max_for_day() {
        let store = MetricStore::open_memory().await.unwrap();

        store.insert_at("1234", 4.5, at("2024-01-15 06:00")).await.unwrap();
        store.insert_at("1234", -2.0, at("2024-01-15 07:00")).await.unwrap();
        store.insert_at("1234", 11.25, at("2024-01-15 14:00")).await.unwrap();
        // Other day and other sensor must not leak in
        store.insert_at("1234", -9.0, at("2024-01-14 23:59")).await.unwrap();
        store.insert_at("9999", 40.0, at("2024-01-15 12:00")).await.unwrap();

        let today = day("2024-01-15");
        assert_eq!(store.min("1234", today).await.unwrap(), Some(-2.0));
        assert_eq!(store.max("1234", today).await.unwrap(), Some(11.25));

        store.close().await;
    }

    #[tokio::test]
    async fn test_aggregates_without_rows() {
        let store = MetricStore::open_memory().await.unwrap();

        let today = day("2024-01-15");
        assert_eq!(store.min("1234", today).await.unwrap(), None);
        assert_eq!(store.max("1234", today).await.unwrap(), None);
        assert_eq!(
            store.delta_24h("1234", at("2024-01-15 12:00")).await.unwrap(),
            None
        );

        store.close().await;
    }

    #[tokio::test]
    async fn test_numeric_ordering() {
        // Values compare numerically, not as text ("9" > "10" as strings)
        let store = MetricStore::open_memory().await.unwrap();
        store.insert_at("77", 9.0, at("2024-01-15 06:00")).await.unwrap();
        store.insert_at("77", 10.0, at("2024-01-15 07:00")).await.unwrap();

        assert_eq!(store.max("77", day("2024-01-15")).await.unwrap(), Some(10.0));
        store.close().await;
    }

    #[tokio::test]
    async fn test_delta_24h() {
        let store = MetricStore::open_memory().await.unwrap();

        store.insert_at("rain", 5.0, at("2024-01-15 01:00")).await.unwrap();
        store.insert_at("rain", 12.0, at("2024-01-15 08:00")).await.unwrap();
        store.insert_at("rain", 3.0, at("2024-01-15 11:00")).await.unwrap();

        let delta = store.delta_24h("rain", at("2024-01-15 12:00")).await.unwrap();
        assert_eq!(delta, Some(9.0));

        store.close().await;
    }

    #[tokio::test]
    async fn test_delta_24h_window_is_rolling() {
        let store = MetricStore::open_memory().await.unwrap();

        // Outside the window
        store.insert_at("rain", 100.0, at("2024-01-14 11:59")).await.unwrap();
        // Yesterday but inside the window
        store.insert_at("rain", 120.0, at("2024-01-14 13:00")).await.unwrap();
        store.insert_at("rain", 126.5, at("2024-01-15 09:00")).await.unwrap();

        let delta = store.delta_24h("rain", at("2024-01-15 12:00")).await.unwrap();
        assert_eq!(delta, Some(6.5));

        store.close().await;
    }

    #[tokio::test]
    async fn test_insert_is_append_only() {
        let store = MetricStore::open_memory().await.unwrap();

        store.insert("42", 1.0).await.unwrap();
        store.insert("42", 1.0).await.unwrap();
        store.insert("43", 2.0).await.unwrap();

        assert_eq!(store.reading_count("42").await.unwrap(), 2);
        assert_eq!(store.reading_count("43").await.unwrap(), 1);
        assert_eq!(
            store.max("42", Local::now().date_naive()).await.unwrap(),
            Some(1.0)
        );

        store.close().await;
    }
}
