//! List request parameters and their normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::OrderDirection;

/// Caller-supplied list parameters.
///
/// The filter map is a `BTreeMap` so its entries are always ordered by key;
/// insertion order can never leak into query assembly or cache keys.
/// Unknown filter and order keys are dropped silently during resolution
/// rather than failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Requested order column: a main-table column, or a joined alias such
    /// as `locales_language`.
    pub order: Option<String>,
    pub order_dir: OrderDirection,
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub filter: BTreeMap<String, String>,
}

impl ListParams {
    /// The page size after clamping into `[1, max_limit]`.
    pub fn effective_limit(&self, config: &EngineConfig) -> u32 {
        self.limit
            .unwrap_or(config.default_limit)
            .clamp(1, config.max_limit_clamped())
    }

    /// The page number after clamping to `>= 1`.
    pub fn effective_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Row offset for the paginated statement.
    pub fn offset(&self, config: &EngineConfig) -> u64 {
        u64::from(self.effective_page() - 1) * u64::from(self.effective_limit(config))
    }
}

/// The canonical form of [`ListParams`] used for cache keys: defaults
/// filled, filter keys ordered. Serialization of this struct is the cache
/// key payload, so field order is part of the key scheme.
#[derive(Debug, Serialize)]
pub struct NormalizedParams<'a> {
    pub order: Option<&'a str>,
    pub order_dir: OrderDirection,
    pub limit: u32,
    pub page: u32,
    pub filter: &'a BTreeMap<String, String>,
}

impl<'a> NormalizedParams<'a> {
    pub fn new(params: &'a ListParams, config: &EngineConfig) -> Self {
        Self {
            order: params.order.as_deref(),
            order_dir: params.order_dir,
            limit: params.effective_limit(config),
            page: params.effective_page(),
            filter: &params.filter,
        }
    }
}
