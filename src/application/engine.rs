//! The engine façade.
//!
//! One constructor-injected entry point composing introspection, query
//! building and the cache-aside layer into a request-scoped pipeline. The
//! engine holds no shared mutable state of its own; concurrent callers need
//! no external locking.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use metrics::counter;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::meta::MetaSchema;
use crate::application::params::ListParams;
use crate::application::repos::{ListCache, StoreError};
use crate::cache::{content_list_key, table_list_key};
use crate::config::EngineConfig;
use crate::domain::{Identifier, ListPage, RecordLookup, Row, SourceKind};
use crate::infra::db::SqliteRepositories;

pub const METRIC_CACHE_HIT: &str = "quadro_list_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "quadro_list_cache_miss_total";
pub const METRIC_CACHE_ERROR: &str = "quadro_list_cache_error_total";
pub const METRIC_CACHE_CORRUPT: &str = "quadro_list_cache_corrupt_total";
pub const METRIC_CACHE_SKIP_EMPTY: &str = "quadro_list_cache_skip_empty_total";

/// Dynamic content query and cache engine.
pub struct ContentEngine {
    repos: SqliteRepositories,
    cache: Option<Arc<dyn ListCache>>,
    config: EngineConfig,
    meta_schemas: HashMap<String, MetaSchema>,
}

impl ContentEngine {
    pub fn new(repos: SqliteRepositories) -> Self {
        Self {
            repos,
            cache: None,
            config: EngineConfig::default(),
            meta_schemas: HashMap::new(),
        }
    }

    /// Attach a cache handle. Without one the engine runs in direct-query
    /// mode with no behavior change besides the absence of caching.
    pub fn with_cache(mut self, cache: Arc<dyn ListCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Declare the extension-field schema for one content type.
    pub fn with_meta_schema(mut self, type_slug: impl Into<String>, schema: MetaSchema) -> Self {
        self.meta_schemas.insert(type_slug.into(), schema);
        self
    }

    pub fn repositories(&self) -> &SqliteRepositories {
        &self.repos
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Route a type token: `Table` iff it names a currently known table.
    pub async fn resolve_kind(&self, token: &str) -> Result<SourceKind, StoreError> {
        let Ok(table) = Identifier::parse(token) else {
            return Ok(SourceKind::Content);
        };
        if self.repos.table_exists(&table).await? {
            Ok(SourceKind::Table)
        } else {
            Ok(SourceKind::Content)
        }
    }

    /// Table-scoped list, bypassing the cache.
    pub async fn list(&self, table: &str, params: &ListParams) -> Result<ListPage, StoreError> {
        self.repos.list_rows(table, params, &self.config).await
    }

    /// Table-scoped list behind the cache-aside layer.
    pub async fn list_cached(
        &self,
        table: &str,
        params: &ListParams,
    ) -> Result<ListPage, StoreError> {
        let key = table_list_key(table, params, &self.config);
        self.cached(key, self.repos.list_rows(table, params, &self.config))
            .await
    }

    /// Content-partition list behind the cache-aside layer.
    pub async fn list_content(
        &self,
        type_slug: &str,
        params: &ListParams,
    ) -> Result<ListPage, StoreError> {
        let key = content_list_key(type_slug, params, &self.config);
        self.cached(
            key,
            self.repos
                .list_content(&self.config.content, type_slug, params, &self.config),
        )
        .await
    }

    /// The produced list operation: resolve the token once, then route to
    /// the table path or the polymorphic content path.
    pub async fn list_records(
        &self,
        token: &str,
        params: &ListParams,
    ) -> Result<ListPage, StoreError> {
        match self.resolve_kind(token).await? {
            SourceKind::Table => {
                debug!(token, kind = "table", "routing list request");
                self.list_cached(token, params).await
            }
            SourceKind::Content => {
                debug!(token, kind = "content", "routing list request");
                self.list_content(token, params).await
            }
        }
    }

    /// The produced single-record lookup.
    pub async fn get_record(&self, token: &str, id: &str) -> Result<RecordLookup, StoreError> {
        if let Ok(table) = Identifier::parse(token) {
            if self.repos.table_exists(&table).await? {
                let record = self.repos.find_row_by_pk(&table, id).await?;
                return Ok(RecordLookup {
                    kind: SourceKind::Table,
                    record,
                });
            }
        }
        let record = self.content_record(token, id).await?;
        Ok(RecordLookup {
            kind: SourceKind::Content,
            record,
        })
    }

    async fn content_record(&self, type_slug: &str, id: &str) -> Result<Option<Row>, StoreError> {
        let Ok(id) = id.parse::<i64>() else {
            return Ok(None);
        };
        if id <= 0 {
            return Ok(None);
        }
        let schema = &self.config.content;
        let Some(type_id) = self.repos.find_content_type_id(schema, type_slug).await? else {
            return Ok(None);
        };
        let Some(mut record) = self.repos.find_content_row(schema, id, type_id).await? else {
            return Ok(None);
        };

        if let Some(meta_schema) = self.meta_schemas.get(type_slug) {
            let stored = self.repos.load_meta_values(schema, id).await?;
            match meta_schema.merge(&stored, self.config.meta_validation) {
                Ok(merged) => {
                    record.insert("meta".to_string(), Value::Object(merged));
                }
                Err(err) => {
                    // Strict validation failures do not hide the record;
                    // the stored blob passes through unmerged.
                    warn!(type_slug, id, error = %err, "meta values failed validation");
                    record.insert("meta".to_string(), Value::Object(stored));
                }
            }
        }
        Ok(Some(record))
    }

    /// Cache-aside wrapper: any cache failure degrades to the store, and
    /// empty pages are never written back.
    async fn cached<F>(&self, key: String, fetch: F) -> Result<ListPage, StoreError>
    where
        F: Future<Output = Result<ListPage, StoreError>>,
    {
        let Some(cache) = self.cache.as_deref() else {
            return fetch.await;
        };

        match cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<ListPage>(&raw) {
                Ok(page) => {
                    counter!(METRIC_CACHE_HIT).increment(1);
                    debug!(key = %key, "list cache hit");
                    return Ok(page);
                }
                Err(err) => {
                    counter!(METRIC_CACHE_CORRUPT).increment(1);
                    warn!(key = %key, error = %err, "corrupt cache payload treated as miss");
                }
            },
            Ok(None) => {
                counter!(METRIC_CACHE_MISS).increment(1);
            }
            Err(err) => {
                counter!(METRIC_CACHE_ERROR).increment(1);
                warn!(key = %key, error = %err, "cache read failed, querying store directly");
            }
        }

        let page = fetch.await?;
        if page.items.is_empty() {
            counter!(METRIC_CACHE_SKIP_EMPTY).increment(1);
        } else {
            match serde_json::to_string(&page) {
                Ok(payload) => {
                    if let Err(err) = cache.put(&key, payload).await {
                        counter!(METRIC_CACHE_ERROR).increment(1);
                        warn!(key = %key, error = %err, "cache write failed");
                    }
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "list page failed to serialize for cache");
                }
            }
        }
        Ok(page)
    }
}
