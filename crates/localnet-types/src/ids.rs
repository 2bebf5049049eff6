//! # Identity Types
//!
//! Addresses, object ids, and operation digests. Object ids are normalized
//! at construction (lowercase, `0x`-prefixed) so they can key artifact maps
//! without a second canonical form floating around.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while parsing identity types from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdParseError {
    /// The hex payload had the wrong length for the target type.
    #[error("invalid length: expected {expected} hex bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The payload contained non-hex characters.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// A 32-byte account address, rendered as `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Parses an address from `0x`-prefixed (or bare) hex.
    pub fn from_hex(raw: &str) -> Result<Self, IdParseError> {
        let stripped = raw.trim().trim_start_matches("0x");
        let bytes = hex::decode(stripped).map_err(|err| IdParseError::InvalidHex(err.to_string()))?;
        let array: [u8; 32] = bytes.as_slice().try_into().map_err(|_| IdParseError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    /// Returns the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A ledger object id, normalized to lowercase `0x`-prefixed form.
///
/// Object ids key the artifact ledger, so every constructor funnels through
/// [`ObjectId::new`] and equality is always on the normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Normalizes a raw id: trim, lowercase, ensure a `0x` prefix.
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim().to_ascii_lowercase();
        if trimmed.starts_with("0x") {
            Self(trimmed)
        } else {
            Self(format!("0x{trimmed}"))
        }
    }

    /// Returns the normalized id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// The digest identifying one submitted state-mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationDigest(pub String);

impl fmt::Display for OperationDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
