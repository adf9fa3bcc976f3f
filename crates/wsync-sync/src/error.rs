//! Error types for workspace synchronization
//!
//! Provides error handling for:
//! - Identity collisions and classification flips (data integrity)
//! - Unit-of-work commit failures (persistence)
//! - Malformed standard definitions
//! - Collaborator failures (feature flags, migration sink)

use wsync_metadata::{FieldId, MetadataError, ObjectId};
use wsync_standard::DefinitionError;

/// Main synchronization error type
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Persisted or canonical metadata is inconsistent
    #[error("data integrity violation: {0}")]
    DataIntegrity(#[from] DataIntegrityError),

    /// Unit-of-work commit failed; nothing was written
    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    /// Standard definitions are malformed
    #[error("invalid standard definitions: {0}")]
    Definition(#[from] DefinitionError),

    /// Feature flags could not be read
    #[error("feature flags unavailable: {0}")]
    FeatureFlags(String),

    /// Migration plan could not be queued
    #[error("migration sink failed: {0}")]
    Sink(String),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Check if the whole run may be retried from scratch
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

impl From<MetadataError> for SyncError {
    fn from(error: MetadataError) -> Self {
        Self::DataIntegrity(DataIntegrityError::Metadata(error))
    }
}

/// Inconsistent metadata; never retried
#[derive(Debug, thiserror::Error)]
pub enum DataIntegrityError {
    /// Two entries share an identity
    #[error("duplicate identity {identity} ('{first}' and '{second}')")]
    DuplicateIdentity {
        identity: String,
        first: String,
        second: String,
    },

    /// Entry has neither a standard id nor a row id
    #[error("'{0}' has no unique identifier")]
    MissingIdentifier(String),

    /// Matched object flipped between custom and standard
    #[error(
        "object '{name}' classification mismatch \
         (persisted custom: {persisted}, target custom: {target})"
    )]
    ObjectClassificationMismatch {
        name: String,
        persisted: bool,
        target: bool,
    },

    /// Matched field flipped between custom and standard
    #[error(
        "field '{object}.{field}' classification mismatch \
         (persisted custom: {persisted}, target custom: {target})"
    )]
    FieldClassificationMismatch {
        object: String,
        field: String,
        persisted: bool,
        target: bool,
    },

    /// Field generated for a custom object reuses an existing field name
    #[error("dynamic field '{object}.{field}' collides with an existing field")]
    DynamicFieldCollision { object: String, field: String },

    /// Metadata value rejected an operation
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Unit-of-work failures
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Commit aborted
    #[error("commit failed: {0}")]
    CommitFailed(String),

    /// Write references an object that does not exist
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),

    /// Write references a field that does not exist
    #[error("unknown field {0}")]
    UnknownField(FieldId),

    /// Create collides with an existing row
    #[error("conflict: {0}")]
    Conflict(String),

    /// Snapshot could not be read or written
    #[error("snapshot error: {0}")]
    Snapshot(String),
}
