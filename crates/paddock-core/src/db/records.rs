//! Race, entry and result persistence.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info};

use super::{decode_json, SqliteStore};
use crate::store::RecordStore;
use crate::types::{Entry, Race, RaceResult, RecordBatch, Surface};
use crate::Result;

impl SqliteStore {
    /// Write a batch of records in one transaction. Existing keys are overwritten.
    pub async fn import(&self, batch: &RecordBatch) -> Result<()> {
        batch.validate()?;
        let mut tx = self.pool.begin().await?;

        for race in &batch.races {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO races (race_id, date, venue, distance, surface, class_label)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&race.race_id)
            .bind(&race.date)
            .bind(&race.venue)
            .bind(race.distance.map(i64::from))
            .bind(race.surface.map(|s| s.as_str()))
            .bind(&race.class_label)
            .execute(&mut *tx)
            .await?;
        }

        for entry in &batch.entries {
            sqlx::query(
                r#"
                INSERT INTO entries (race_id, horse_id, horse_name, time_index, flags)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT (race_id, horse_id) DO UPDATE SET
                    horse_name = excluded.horse_name,
                    time_index = excluded.time_index,
                    flags = excluded.flags
                "#,
            )
            .bind(&entry.race_id)
            .bind(&entry.horse_id)
            .bind(&entry.horse_name)
            .bind(serde_json::to_string(&entry.time_index)?)
            .bind(serde_json::to_string(&entry.flags)?)
            .execute(&mut *tx)
            .await?;
        }

        for result in &batch.results {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO results (race_id, top3, payouts)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(&result.race_id)
            .bind(serde_json::to_string(&result.top3)?)
            .bind(serde_json::to_string(&result.payouts)?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            races = batch.races.len(),
            entries = batch.entries.len(),
            results = batch.results.len(),
            "Imported race records"
        );
        Ok(())
    }

    /// Delete all races, entries and results. Presets are kept.
    pub async fn clear(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for table in ["entries", "results", "races"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    fn row_to_race(r: &SqliteRow) -> Result<Race> {
        Ok(Race {
            race_id: r.try_get("race_id")?,
            date: r.try_get("date")?,
            venue: r.try_get("venue")?,
            distance: r
                .try_get::<Option<i64>, _>("distance")?
                .and_then(|d| u32::try_from(d).ok()),
            surface: r
                .try_get::<Option<String>, _>("surface")?
                .as_deref()
                .and_then(Surface::parse),
            class_label: r.try_get("class_label")?,
        })
    }

    fn row_to_entry(r: &SqliteRow) -> Result<Entry> {
        let time_index: String = r.try_get("time_index")?;
        let flags: String = r.try_get("flags")?;

        Ok(Entry {
            race_id: r.try_get("race_id")?,
            horse_id: r.try_get("horse_id")?,
            horse_name: r.try_get("horse_name")?,
            time_index: decode_json("entries.time_index", &time_index),
            flags: decode_json("entries.flags", &flags),
        })
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn races_between(&self, from: &str, to: &str) -> Result<Vec<Race>> {
        let rows = sqlx::query(
            r#"
            SELECT race_id, date, venue, distance, surface, class_label
            FROM races
            WHERE date >= ? AND date <= ?
            ORDER BY date, race_id
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let races = rows.iter().map(Self::row_to_race).collect::<Result<Vec<_>>>()?;
        debug!(from, to, count = races.len(), "Fetched races");
        Ok(races)
    }

    async fn race(&self, race_id: &str) -> Result<Option<Race>> {
        let row = sqlx::query(
            r#"
            SELECT race_id, date, venue, distance, surface, class_label
            FROM races
            WHERE race_id = ?
            "#,
        )
        .bind(race_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_race).transpose()
    }

    async fn entries_for(&self, race_id: &str) -> Result<Vec<Entry>> {
        let rows = sqlx::query(
            r#"
            SELECT race_id, horse_id, horse_name, time_index, flags
            FROM entries
            WHERE race_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(race_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    async fn result_for(&self, race_id: &str) -> Result<Option<RaceResult>> {
        let row = sqlx::query(
            r#"
            SELECT race_id, top3, payouts
            FROM results
            WHERE race_id = ?
            "#,
        )
        .bind(race_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let top3: String = r.try_get("top3")?;
        let payouts: String = r.try_get("payouts")?;

        Ok(Some(RaceResult {
            race_id: r.try_get("race_id")?,
            top3: decode_json("results.top3", &top3),
            payouts: decode_json("results.payouts", &payouts),
        }))
    }

    async fn count_races(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM races")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::FlagValue;
    use rust_decimal::Decimal;

    async fn store() -> SqliteStore {
        SqliteStore::connect(&Config::test_config().database)
            .await
            .unwrap()
    }

    fn batch() -> RecordBatch {
        RecordBatch {
            races: vec![
                Race::new("r2", "20240102").with_venue("Kyoto 10R"),
                Race::new("r1", "20240101")
                    .with_venue("Nakayama 11R")
                    .with_course(1600, Surface::Turf)
                    .with_class("G3"),
            ],
            entries: vec![
                Entry::new("r1", "h2", "Bravo")
                    .with_time_index([Some(88.0), None, Some(91.0)])
                    .with_flag("checkValues", FlagValue::Numbers(vec![90.0, 91.0])),
                Entry::new("r1", "h1", "Alpha"),
            ],
            results: vec![RaceResult::new("r1", vec!["Alpha".into(), "Bravo".into()])
                .with_payout("win", Decimal::new(350, 0))],
        }
    }

    #[tokio::test]
    async fn test_import_and_query_round_trip() {
        let store = store().await;
        store.import(&batch()).await.unwrap();

        let races = store.races_between("20240101", "20240102").await.unwrap();
        assert_eq!(races.len(), 2);
        assert_eq!(races[0], batch().races[1]);
        assert_eq!(store.count_races().await.unwrap(), 2);

        let entries = store.entries_for("r1").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].horse_name, "Bravo");
        assert_eq!(entries[0].time_index, vec![Some(88.0), None, Some(91.0)]);
        assert_eq!(entries[0].numbers("checkValues"), &[90.0, 91.0]);

        let result = store.result_for("r1").await.unwrap().unwrap();
        assert_eq!(result.winner(), Some("Alpha"));
        assert_eq!(result.payout("win"), Some(Decimal::new(350, 0)));
        assert!(store.result_for("r2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reimported_entry_keeps_its_position() {
        let store = store().await;
        store.import(&batch()).await.unwrap();

        let update = RecordBatch {
            races: vec![Race::new("r1", "20240101")],
            entries: vec![Entry::new("r1", "h2", "Bravo II")],
            results: vec![],
        };
        store.import(&update).await.unwrap();

        let entries = store.entries_for("r1").await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.horse_name.as_str()).collect();
        assert_eq!(names, vec!["Bravo II", "Alpha"]);
        assert!(entries[0].flags.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_degrades_to_empty() {
        let store = store().await;
        sqlx::query(
            r#"
            INSERT INTO entries (race_id, horse_id, horse_name, time_index, flags)
            VALUES ('r9', 'h1', 'X', 'not json', '{')
            "#,
        )
        .execute(store.pool())
        .await
        .unwrap();

        let entries = store.entries_for("r9").await.unwrap();
        assert!(entries[0].time_index.is_empty());
        assert!(entries[0].flags.is_empty());
    }

    #[tokio::test]
    async fn test_clear_keeps_presets_table_usable() {
        let store = store().await;
        store.import(&batch()).await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.count_races().await.unwrap(), 0);
        assert!(store.entries_for("r1").await.unwrap().is_empty());
    }
}
