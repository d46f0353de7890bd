//! Core domain types for Paddock.

pub mod params;
pub mod preset;
pub mod race;

pub use params::*;
pub use preset::*;
pub use race::*;
