//! Cache key derivation.
//!
//! Keys are a pure function of the source (table or content partition) and
//! the normalized list parameters. Normalization fills defaults and orders
//! filter entries by key, so semantically identical requests always produce
//! the same key regardless of how the caller assembled them.

use crate::application::params::{ListParams, NormalizedParams};
use crate::config::EngineConfig;

/// Key for a table-scoped list result.
pub fn table_list_key(table: &str, params: &ListParams, config: &EngineConfig) -> String {
    canonical_key("list", table, params, config)
}

/// Key for a content-partition list result.
pub fn content_list_key(type_slug: &str, params: &ListParams, config: &EngineConfig) -> String {
    canonical_key("content", type_slug, params, config)
}

fn canonical_key(prefix: &str, source: &str, params: &ListParams, config: &EngineConfig) -> String {
    let normalized = NormalizedParams::new(params, config);
    let payload =
        serde_json::to_string(&normalized).expect("normalized params serialize to JSON");
    format!("{prefix}:{source}:{payload}")
}
