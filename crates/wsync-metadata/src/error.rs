//! Metadata model errors

/// Errors raised by metadata values themselves
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Operation needs a persisted row id
    #[error("metadata '{0}' has not been persisted")]
    NotPersisted(String),

    /// Field is not attached to a persisted object
    #[error("field '{0}' has no owning object")]
    MissingOwner(String),

    /// Canonical metadata without standard id
    #[error("metadata '{0}' has no unique identifier")]
    MissingIdentifier(String),

    /// Fingerprint serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
