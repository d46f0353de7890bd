//! Preset persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{decode_json, SqliteStore};
use crate::store::PresetStore;
use crate::types::Preset;
use crate::Result;

impl SqliteStore {
    fn row_to_preset(r: &SqliteRow) -> Result<Preset> {
        let params: String = r.try_get("params")?;

        Ok(Preset {
            id: r.try_get("id")?,
            label: r.try_get("label")?,
            strategy_id: r.try_get("strategy_id")?,
            params: decode_json("presets.params", &params),
            created_at: r.try_get::<Option<DateTime<Utc>>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl PresetStore for SqliteStore {
    async fn get(&self, id: &str) -> Result<Option<Preset>> {
        let row = sqlx::query(
            r#"
            SELECT id, label, strategy_id, params, created_at
            FROM presets
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_preset).transpose()
    }

    async fn put(&self, preset: &Preset) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO presets (id, label, strategy_id, params, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                label = excluded.label,
                strategy_id = excluded.strategy_id,
                params = excluded.params,
                created_at = excluded.created_at
            "#,
        )
        .bind(&preset.id)
        .bind(&preset.label)
        .bind(&preset.strategy_id)
        .bind(serde_json::to_string(&preset.params)?)
        .bind(preset.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM presets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<Preset>> {
        let rows = sqlx::query(
            r#"
            SELECT id, label, strategy_id, params, created_at
            FROM presets
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_preset).collect()
    }
}
