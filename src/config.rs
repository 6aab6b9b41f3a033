//! Engine configuration.
//!
//! Deserializable with full defaults so an embedding application can layer
//! it into its own configuration file:
//!
//! ```toml
//! [engine]
//! default_limit = 20
//! max_limit = 100
//! list_cache_limit = 256
//! meta_validation = "lenient"
//! ```

use std::num::NonZeroUsize;

use serde::Deserialize;

use crate::application::meta::MetaValidation;
use crate::domain::Identifier;

// Default values for engine configuration
const DEFAULT_PAGE_LIMIT: u32 = 20;
const MAX_PAGE_LIMIT: u32 = 100;
const DEFAULT_LIST_CACHE_LIMIT: usize = 256;

/// Engine-wide tunables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Page size used when a request does not name one.
    pub default_limit: u32,
    /// Upper bound for requested page sizes; itself capped at 100.
    pub max_limit: u32,
    /// Capacity of the bundled in-memory list cache.
    pub list_cache_limit: usize,
    /// Strictness applied when merging stored meta values against a
    /// declared schema.
    pub meta_validation: MetaValidation,
    /// Names of the polymorphic content layout.
    pub content: ContentSchema,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: MAX_PAGE_LIMIT,
            list_cache_limit: DEFAULT_LIST_CACHE_LIMIT,
            meta_validation: MetaValidation::default(),
            content: ContentSchema::default(),
        }
    }
}

impl EngineConfig {
    /// The effective page-size ceiling: configured `max_limit`, clamped into
    /// `[1, 100]`.
    pub fn max_limit_clamped(&self) -> u32 {
        self.max_limit.clamp(1, MAX_PAGE_LIMIT)
    }

    /// Returns the list cache capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn list_cache_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.list_cache_limit).unwrap_or(NonZeroUsize::MIN)
    }
}

/// Table and column names of the shared polymorphic content layout.
///
/// All fields are [`Identifier`]s, so a deserialized configuration cannot
/// smuggle unsafe tokens into generated SQL.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentSchema {
    /// The shared polymorphic content table.
    pub table: Identifier,
    /// The discriminator table holding one row per logical content type.
    pub type_table: Identifier,
    /// Foreign-key column on the content table pointing at the discriminator.
    pub type_fk: Identifier,
    /// Slug column on the discriminator table matched against type tokens.
    pub type_slug_column: Identifier,
    /// Category label table.
    pub category_table: Identifier,
    /// Human-readable label column on the category table.
    pub category_label_column: Identifier,
    /// Many-to-many link table between content rows and categories.
    pub category_link_table: Identifier,
    /// Link-table column referencing the content row.
    pub link_content_column: Identifier,
    /// Link-table column referencing the category row.
    pub link_category_column: Identifier,
    /// Key-value table carrying extension meta fields per content row.
    pub meta_table: Identifier,
    /// Meta-table column referencing the content row.
    pub meta_content_column: Identifier,
    /// Meta-table key column.
    pub meta_key_column: Identifier,
    /// Meta-table value column.
    pub meta_value_column: Identifier,
}

impl Default for ContentSchema {
    fn default() -> Self {
        Self {
            table: ident("contents"),
            type_table: ident("content_types"),
            type_fk: ident("type_id"),
            type_slug_column: ident("slug"),
            category_table: ident("categories"),
            category_label_column: ident("name"),
            category_link_table: ident("content_categories"),
            link_content_column: ident("content_id"),
            link_category_column: ident("category_id"),
            meta_table: ident("content_meta"),
            meta_content_column: ident("content_id"),
            meta_key_column: ident("key"),
            meta_value_column: ident("value"),
        }
    }
}

fn ident(token: &'static str) -> Identifier {
    Identifier::parse(token).expect("static identifier token")
}
