//! quadro — a dynamic content query and cache engine for
//! content-management backends.
//!
//! Administrative surfaces need to list, filter and edit heterogeneous
//! records — system tables and typed content records sharing one
//! polymorphic table — without a hand-written query per entity. This crate
//! provides the engine behind such a surface:
//!
//! - **schema introspection** at call time: tables, columns and foreign-key
//!   edges are discovered from the store's own catalog, never compiled in;
//! - **safe dynamic query assembly**: runtime-supplied table and column
//!   tokens must pass the [`domain::Identifier`] grammar before they may
//!   appear in SQL text, and values are always bound, never interpolated;
//! - **foreign-key label joins**: text columns of referenced tables are
//!   surfaced as `<table>_<column>` aliases for filtering and ordering;
//! - **cache-aside list results** with a canonical, order-independent key
//!   scheme and a never-cache-empty policy;
//! - **polymorphic content routing**: a type token resolves once to either
//!   a first-class table or a discriminator-filtered partition of the
//!   shared content table.
//!
//! The store handle ([`SqliteRepositories`]) and the optional cache handle
//! ([`ListCache`]) are injected at construction; the crate keeps no global
//! state. Malformed or unknown inputs produce well-formed empty results;
//! only genuine store failures surface as [`StoreError`].

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

pub use application::engine::ContentEngine;
pub use application::meta::{MetaField, MetaFieldType, MetaSchema, MetaValidation};
pub use application::params::ListParams;
pub use application::repos::{CacheError, ListCache, StoreError};
pub use cache::MemoryListCache;
pub use config::{ContentSchema, EngineConfig};
pub use domain::{
    ColumnCategory, ColumnDescriptor, ForeignKeyDescriptor, Identifier, IdentifierError, ListPage,
    OrderDirection, RecordLookup, Row, SourceKind, TableDescriptor,
};
pub use infra::db::SqliteRepositories;
