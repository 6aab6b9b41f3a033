//! Error taxonomy and the injected cache seam.

use async_trait::async_trait;
use thiserror::Error;

/// Failures of the relational store itself.
///
/// This is the one error class the engine never swallows: it means the
/// underlying data is unreachable rather than merely absent. Malformed
/// identifiers and unknown tables degrade to empty results instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("database timeout")]
    Timeout,
}

impl StoreError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Failures of an external cache backend. Always logged and treated as a
/// miss by the engine; never allowed to fail the primary read path.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cache payload corrupt: {0}")]
    Corrupt(String),
}

/// Key-value cache consumed by the cache-aside layer.
///
/// Both operations may fail; the engine degrades to direct queries on any
/// failure. Payloads are serialized [`crate::domain::ListPage`]s.
#[async_trait]
pub trait ListCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn put(&self, key: &str, value: String) -> Result<(), CacheError>;
}
