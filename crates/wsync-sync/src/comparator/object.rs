//! Object comparator

use crate::error::DataIntegrityError;
use wsync_metadata::{ObjectMetadata, ObjectPatch};

/// Decision for one standard-object identity
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectComparatorResult {
    /// Object does not exist yet; payload is the full target
    Create(ObjectMetadata),
    /// Tracked attributes differ; payload holds only the changes
    Update(ObjectPatch),
    /// Nothing to do
    Noop,
}

impl ObjectComparatorResult {
    /// Short action name for logs
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update(_) => "update",
            Self::Noop => "noop",
        }
    }
}

/// Compares a persisted object against its target
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectComparator;

impl ObjectComparator {
    /// Decide CREATE, UPDATE or NOOP
    ///
    /// # Errors
    /// Returns error if the two sides disagree on `is_custom`, or if the
    /// persisted object has no row id
    pub fn compare(
        persisted: Option<&ObjectMetadata>,
        target: &ObjectMetadata,
    ) -> Result<ObjectComparatorResult, DataIntegrityError> {
        let Some(persisted) = persisted else {
            return Ok(ObjectComparatorResult::Create(target.clone()));
        };

        if persisted.is_custom != target.is_custom {
            return Err(DataIntegrityError::ObjectClassificationMismatch {
                name: persisted.name_singular.clone(),
                persisted: persisted.is_custom,
                target: target.is_custom,
            });
        }

        Ok(ObjectPatch::diff(persisted, target)?
            .map_or(ObjectComparatorResult::Noop, ObjectComparatorResult::Update))
    }
}
