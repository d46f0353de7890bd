//! Error types for the Paddock record layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid parameter {key}: {message}")]
    InvalidParam { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
