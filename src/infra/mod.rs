//! Infrastructure adapters.

pub mod db;
pub mod error;
pub mod telemetry;
