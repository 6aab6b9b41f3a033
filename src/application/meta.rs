//! Extension meta fields for polymorphic content rows.
//!
//! Content rows carry unstructured key-value blobs. A [`MetaSchema`] is the
//! declarative description merged over the stored blob on read: it supplies
//! defaults and typing hints. Whether a stored value that contradicts its
//! declared type is an error is configurable; the lenient mode treats the
//! schema as documentation only, which matches how such blobs are commonly
//! written.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::Row;

/// Strictness applied when merging stored values against a schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaValidation {
    /// Defaults and typing hints only; mismatched stored values pass through.
    #[default]
    Lenient,
    /// Mismatched stored values fail the merge.
    Strict,
}

/// Declared type of one meta field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaFieldType {
    Text,
    Integer,
    Real,
    Boolean,
    Json,
}

impl MetaFieldType {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Text => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Real => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Json => true,
        }
    }
}

/// One declared extension field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaField {
    pub name: String,
    pub field_type: MetaFieldType,
    #[serde(default)]
    pub default: Option<Value>,
}

#[derive(Debug, Error, PartialEq)]
pub enum MetaError {
    #[error("meta field `{field}` expected {expected:?}, stored value is `{found}`")]
    TypeMismatch {
        field: String,
        expected: MetaFieldType,
        found: Value,
    },
}

/// Declarative schema for the meta blob of one content type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaSchema {
    pub fields: Vec<MetaField>,
}

impl MetaSchema {
    pub fn new(fields: Vec<MetaField>) -> Self {
        Self { fields }
    }

    /// Merge a stored blob against this schema.
    ///
    /// Declared fields absent from the blob receive their default (or
    /// `null`); stored keys the schema does not declare are preserved
    /// untouched.
    pub fn merge(&self, stored: &Row, validation: MetaValidation) -> Result<Row, MetaError> {
        let mut merged = Row::new();
        for field in &self.fields {
            match stored.get(&field.name) {
                Some(value) if !value.is_null() => {
                    if !field.field_type.matches(value) {
                        if validation == MetaValidation::Strict {
                            return Err(MetaError::TypeMismatch {
                                field: field.name.clone(),
                                expected: field.field_type,
                                found: value.clone(),
                            });
                        }
                        merged.insert(field.name.clone(), value.clone());
                    } else {
                        merged.insert(field.name.clone(), value.clone());
                    }
                }
                _ => {
                    merged.insert(
                        field.name.clone(),
                        field.default.clone().unwrap_or(Value::Null),
                    );
                }
            }
        }
        for (key, value) in stored {
            if !merged.contains_key(key) {
                merged.insert(key.clone(), value.clone());
            }
        }
        Ok(merged)
    }
}
