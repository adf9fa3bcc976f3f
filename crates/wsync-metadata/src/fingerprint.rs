//! Schema fingerprints
//!
//! A Blake3 digest over the JSON encoding of a metadata collection. Two
//! factory runs with identical inputs must yield identical fingerprints.

use crate::error::MetadataError;
use crate::object::ObjectMetadata;
use std::fmt::{self, Display, Formatter};

/// 32-byte digest of a metadata collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaFingerprint([u8; 32]);

impl SchemaFingerprint {
    /// Fingerprint of a collection, in collection order
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn compute(objects: &[ObjectMetadata]) -> Result<Self, MetadataError> {
        let json = serde_json::to_vec(objects)?;
        Ok(Self(*blake3::hash(&json).as_bytes()))
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for SchemaFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
