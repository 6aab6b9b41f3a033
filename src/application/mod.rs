//! Application services layer.

pub mod engine;
pub mod meta;
pub mod params;
pub mod repos;
