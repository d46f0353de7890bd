//! SQLite-backed record and preset storage.

pub mod presets;
pub mod records;

use crate::config::DatabaseConfig;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Create a SQLite connection pool, creating the database file if needed.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS races (
        race_id     TEXT PRIMARY KEY,
        date        TEXT NOT NULL,
        venue       TEXT,
        distance    INTEGER,
        surface     TEXT,
        class_label TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_races_date ON races (date)",
    r#"
    CREATE TABLE IF NOT EXISTS entries (
        race_id    TEXT NOT NULL,
        horse_id   TEXT NOT NULL,
        horse_name TEXT NOT NULL,
        time_index TEXT NOT NULL DEFAULT '[]',
        flags      TEXT NOT NULL DEFAULT '{}',
        PRIMARY KEY (race_id, horse_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS results (
        race_id TEXT PRIMARY KEY,
        top3    TEXT NOT NULL DEFAULT '[]',
        payouts TEXT NOT NULL DEFAULT '{}'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS presets (
        id          TEXT PRIMARY KEY,
        label       TEXT NOT NULL,
        strategy_id TEXT NOT NULL,
        params      TEXT NOT NULL DEFAULT '{}',
        created_at  TEXT
    )
    "#,
];

/// Create the tables if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(*statement).execute(pool).await?;
    }
    Ok(())
}

/// Record and preset store over a SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect using `config` and make sure the schema exists.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = create_pool(config).await?;
        init_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Decode a JSON text column, falling back to the type's default on bad data.
fn decode_json<T>(column: &str, raw: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    serde_json::from_str(raw).unwrap_or_else(|error| {
        tracing::warn!(column, error = %error, "Malformed JSON column, using empty value");
        T::default()
    })
}
