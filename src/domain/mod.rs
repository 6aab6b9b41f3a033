//! Domain layer types and invariants.

pub mod identifier;
pub mod types;

pub use identifier::{Identifier, IdentifierError, MAX_IDENTIFIER_LENGTH};
pub use types::{
    ColumnCategory, ColumnDescriptor, ForeignKeyDescriptor, ListPage, OrderDirection,
    RecordLookup, Row, SourceKind, TableDescriptor,
};
