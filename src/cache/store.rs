//! Bundled in-memory list cache.
//!
//! Serialized list pages behind an LRU with configurable capacity. The
//! engine only requires [`ListCache`]; deployments with an external
//! key-value store supply their own implementation instead.

use std::num::NonZeroUsize;
use std::sync::RwLock;

use async_trait::async_trait;
use lru::LruCache;

use crate::application::repos::{CacheError, ListCache};
use crate::config::EngineConfig;

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// In-memory LRU cache for serialized list pages.
pub struct MemoryListCache {
    entries: RwLock<LruCache<String, String>>,
}

impl MemoryListCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self::new(config.list_cache_limit_non_zero())
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached page.
    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }
}

#[async_trait]
impl ListCache for MemoryListCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(rw_write(&self.entries, SOURCE, "get").get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<(), CacheError> {
        rw_write(&self.entries, SOURCE, "put").put(key.to_string(), value);
        Ok(())
    }
}
