//! Collaborator interfaces
//!
//! The engine reads metadata, feature flags and queues migration plans
//! through these traits; in-memory implementations live in
//! [`crate::memory`].

use crate::error::{PersistenceError, SyncError};
use crate::migration::{MigrationId, MigrationPlanEntry};
use serde::{Deserialize, Serialize};
use wsync_metadata::{
    FeatureFlagMap, FieldId, FieldMetadata, FieldPatch, ObjectId, ObjectMetadata, ObjectPatch,
    WorkspaceId,
};

/// Selection applied by [`MetadataRepository::fetch_objects`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFilter {
    /// Keep only objects with this `is_custom` value (`None` keeps all)
    pub is_custom: Option<bool>,
    /// Whether custom fields are returned with their objects
    pub include_custom_fields: bool,
}

impl ObjectFilter {
    /// Every object with every field
    #[inline]
    #[must_use]
    pub const fn all() -> Self {
        Self {
            is_custom: None,
            include_custom_fields: true,
        }
    }

    /// Every object, standard fields only
    #[inline]
    #[must_use]
    pub const fn standard_fields() -> Self {
        Self {
            is_custom: None,
            include_custom_fields: false,
        }
    }

    /// Restrict on object classification
    #[inline]
    #[must_use]
    pub const fn with_is_custom(mut self, is_custom: bool) -> Self {
        self.is_custom = Some(is_custom);
        self
    }

    /// Apply to one object
    #[must_use]
    pub fn apply(&self, object: &ObjectMetadata) -> Option<ObjectMetadata> {
        if self.is_custom.is_some_and(|wanted| wanted != object.is_custom) {
            return None;
        }
        let object = object.clone();
        Some(if self.include_custom_fields {
            object
        } else {
            object.without_custom_fields()
        })
    }
}

impl Default for ObjectFilter {
    fn default() -> Self {
        Self::all()
    }
}

/// One write inside a [`WriteBatch`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum WriteOp {
    /// Insert an object row (fields follow as [`WriteOp::CreateField`])
    CreateObject { object: ObjectMetadata },
    /// Insert a field row under an existing object
    CreateField { field: FieldMetadata },
    /// Patch an object row
    UpdateObject { patch: ObjectPatch },
    /// Patch a field row
    UpdateField { patch: FieldPatch },
    /// Remove a field row
    DeleteField {
        id: FieldId,
        object_metadata_id: ObjectId,
    },
    /// Remove an object row and whatever fields remain under it
    DeleteObject { id: ObjectId },
}

impl WriteOp {
    /// Short name for logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CreateObject { .. } => "create_object",
            Self::CreateField { .. } => "create_field",
            Self::UpdateObject { .. } => "update_object",
            Self::UpdateField { .. } => "update_field",
            Self::DeleteField { .. } => "delete_field",
            Self::DeleteObject { .. } => "delete_object",
        }
    }
}

/// Ordered writes applied atomically
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create empty batch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append write
    #[inline]
    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    /// Number of writes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether there is nothing to write
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Writes in application order
    pub fn iter(&self) -> std::slice::Iter<'_, WriteOp> {
        self.ops.iter()
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a WriteBatch {
    type Item = &'a WriteOp;
    type IntoIter = std::slice::Iter<'a, WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

/// Metadata catalog storage
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Read a workspace's objects with nested fields
    async fn fetch_objects(
        &self,
        workspace_id: WorkspaceId,
        filter: ObjectFilter,
    ) -> Result<Vec<ObjectMetadata>, PersistenceError>;

    /// Apply every write of `batch` or none of them
    async fn commit(&self, workspace_id: WorkspaceId, batch: WriteBatch)
        -> Result<(), PersistenceError>;
}

/// Per-workspace feature flag lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FeatureFlagSource: Send + Sync {
    /// Flags of a workspace
    async fn flags(&self, workspace_id: WorkspaceId) -> Result<FeatureFlagMap, SyncError>;
}

/// Queue consumed by the DDL executor
///
/// Plans are queued before their metadata is committed, so a lost queue
/// write never leaves committed metadata without its migrations.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MigrationSink: Send + Sync {
    /// Queue plan entries for later execution
    async fn save(
        &self,
        workspace_id: WorkspaceId,
        entries: Vec<MigrationPlanEntry>,
    ) -> Result<(), SyncError>;

    /// Withdraw queued entries whose metadata commit failed
    async fn discard(
        &self,
        workspace_id: WorkspaceId,
        ids: Vec<MigrationId>,
    ) -> Result<(), SyncError>;

    /// Entries queued and not yet executed
    async fn pending(
        &self,
        workspace_id: WorkspaceId,
    ) -> Result<Vec<MigrationPlanEntry>, SyncError>;
}
