//! Validated SQL identifiers.
//!
//! Every table or column name that originates from request input must pass
//! through [`Identifier::parse`] before it may appear in generated SQL text.
//! The type is deliberately distinct from `String` so that embedding an
//! unvalidated name is a compile-time error, not a code-review hazard.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted identifier length, matching common relational limits.
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Errors raised while validating an identifier token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier exceeds {MAX_IDENTIFIER_LENGTH} bytes ({0})")]
    TooLong(usize),
    #[error("identifier starts with invalid character `{0}`")]
    InvalidStart(char),
    #[error("identifier contains invalid character `{0}`")]
    InvalidCharacter(char),
}

/// A table or column name that passed the strict naming grammar
/// (`^[A-Za-z_][A-Za-z0-9_]*$`) and is safe to embed structurally in SQL.
///
/// Values, as opposed to identifiers, never take this path: they are always
/// bound as statement parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Validate a runtime-supplied token.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let mut chars = raw.chars();
        let first = chars.next().ok_or(IdentifierError::Empty)?;
        if raw.len() > MAX_IDENTIFIER_LENGTH {
            return Err(IdentifierError::TooLong(raw.len()));
        }
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(IdentifierError::InvalidStart(first));
        }
        for ch in chars {
            if !(ch.is_ascii_alphanumeric() || ch == '_') {
                return Err(IdentifierError::InvalidCharacter(ch));
            }
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = IdentifierError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}
