//! Paddock Core Library
//!
//! Race record types, strategy parameter schemas, presets and the record
//! stores the backtest engine reads from.

pub mod config;
pub mod db;
pub mod error;
pub mod sample;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use store::{MemoryStore, PresetStore, RecordStore};
