//! Core descriptors and result shapes shared across the engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::identifier::Identifier;

/// One decoded result row, keyed by projected column name.
pub type Row = serde_json::Map<String, Value>;

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Broad column typing derived from the declared column type, following
/// SQLite affinity rules. `Text` columns of a referenced table are the ones
/// worth surfacing as joined label columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnCategory {
    Text,
    Numeric,
    Other,
}

impl ColumnCategory {
    /// Classify a declared column type such as `VARCHAR(80)` or `INTEGER`.
    pub fn from_declared_type(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Self::Text
        } else if upper.contains("INT")
            || upper.contains("REAL")
            || upper.contains("FLOA")
            || upper.contains("DOUB")
            || upper.contains("NUMERIC")
            || upper.contains("DECIMAL")
            || upper.contains("BOOL")
        {
            Self::Numeric
        } else {
            Self::Other
        }
    }
}

/// A column discovered through introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: Identifier,
    pub category: ColumnCategory,
    pub primary_key: bool,
}

/// A table discovered through introspection. Built fresh per call; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: Identifier,
    pub columns: Vec<ColumnDescriptor>,
}

/// One declared foreign-key edge, a potential left join for label columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    pub column: Identifier,
    pub referenced_table: Identifier,
    pub referenced_column: Identifier,
}

/// How a type token routes: a first-class table, or a partition of the
/// shared polymorphic content table. Resolved once per request and passed
/// down, never re-derived ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Table,
    Content,
}

/// Result of a single-record lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordLookup {
    pub kind: SourceKind,
    pub record: Option<Row>,
}

/// One page of a dynamic list query.
///
/// `columns` always reflects the actual projected shape, including joined
/// label columns, even when `items` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    pub items: Vec<Row>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub columns: Vec<Identifier>,
}

impl ListPage {
    pub fn new(items: Vec<Row>, total: u64, page: u32, limit: u32, columns: Vec<Identifier>) -> Self {
        Self {
            items,
            total,
            page,
            limit,
            total_pages: total_pages(total, limit),
            columns,
        }
    }

    /// The well-formed empty result returned for invalid or unknown sources.
    pub fn empty(page: u32, limit: u32) -> Self {
        Self::new(Vec::new(), 0, page, limit, Vec::new())
    }
}

fn total_pages(total: u64, limit: u32) -> u32 {
    let limit = u64::from(limit.max(1));
    let pages = total.div_ceil(limit).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
