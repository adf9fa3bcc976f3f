//! Definition errors
//!
//! A malformed catalog is a deployment defect: every variant aborts the
//! run before any comparison happens.

/// Malformed standard-object definitions
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// Two objects share a name
    #[error("duplicate standard object '{0}'")]
    DuplicateObject(String),

    /// Two fields of one object share a name
    #[error("duplicate field '{field}' on standard object '{object}'")]
    DuplicateField { object: String, field: String },

    /// Two elements derive the same standard id
    #[error("standard id collision on '{0}'")]
    DuplicateStandardId(String),

    /// Relation field without a target
    #[error("relation field '{object}.{field}' has no target")]
    MissingRelationTarget { object: String, field: String },

    /// Relation field pointing at an unknown object
    #[error("relation field '{object}.{field}' targets unknown object '{target}'")]
    UnknownRelationTarget {
        object: String,
        field: String,
        target: String,
    },

    /// Relation target exists but is gated off for this workspace
    #[error(
        "relation field '{object}.{field}' targets '{target}', \
         which is disabled by feature flags"
    )]
    RelationTargetGated {
        object: String,
        field: String,
        target: String,
    },

    /// Non-relation field with a relation target
    #[error("field '{object}.{field}' is not a relation but declares a target")]
    UnexpectedRelationTarget { object: String, field: String },

    /// Name violates naming rules
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// YAML catalog could not be parsed
    #[error("invalid yaml catalog: {0}")]
    InvalidYaml(#[source] serde_yaml::Error),
}

impl DefinitionError {
    /// Create naming error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
