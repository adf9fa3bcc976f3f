//! Metadata Persister
//!
//! Converts a change-set into one ordered [`WriteBatch`] and commits it
//! atomically. Creates get their row ids minted here so the caller can
//! build migrations from concrete identities.

use crate::error::SyncError;
use crate::repository::{MetadataRepository, WriteBatch, WriteOp};
use crate::storage::WorkspaceSyncStorage;
use std::collections::HashSet;
use wsync_metadata::{
    FieldId, FieldMetadata, FieldPatch, MetadataError, ObjectId, ObjectMetadata, ObjectPatch,
    WorkspaceId,
};

/// Post-write view of a committed change-set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataUpdateResult {
    /// Created objects with minted ids, fields included
    pub created_objects: Vec<ObjectMetadata>,
    pub updated_objects: Vec<ObjectPatch>,
    /// Deleted objects as they were persisted
    pub deleted_objects: Vec<ObjectMetadata>,
    /// Fields created on pre-existing objects
    pub created_fields: Vec<FieldMetadata>,
    pub updated_fields: Vec<FieldPatch>,
    /// Fields deleted from surviving objects
    pub deleted_fields: Vec<FieldMetadata>,
}

/// Applies change-sets to a [`MetadataRepository`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataUpdater {
    dry_run: bool,
}

impl MetadataUpdater {
    /// Create committing updater
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute results without committing
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Persist `storage` in one unit of work
    ///
    /// # Errors
    /// - `SyncError::DataIntegrity` if an entry lacks the ids it needs
    /// - `SyncError::Persistence` if the commit fails; nothing is written
    pub async fn update_object_metadata<R>(
        &self,
        repository: &R,
        workspace_id: WorkspaceId,
        storage: &WorkspaceSyncStorage,
    ) -> Result<MetadataUpdateResult, SyncError>
    where
        R: MetadataRepository + ?Sized,
    {
        let (batch, result) = Self::prepare(storage)?;
        self.commit(repository, workspace_id, batch).await?;
        Ok(result)
    }

    /// Commit a prepared batch; empty batches and dry runs write nothing
    ///
    /// # Errors
    /// Returns `SyncError::Persistence` if the commit fails; nothing is written
    pub async fn commit<R>(
        &self,
        repository: &R,
        workspace_id: WorkspaceId,
        batch: WriteBatch,
    ) -> Result<(), SyncError>
    where
        R: MetadataRepository + ?Sized,
    {
        if batch.is_empty() {
            tracing::debug!(%workspace_id, "nothing to persist");
            return Ok(());
        }
        if self.dry_run {
            tracing::info!(%workspace_id, writes = batch.len(), "dry run, skipping commit");
            return Ok(());
        }

        let writes = batch.len();
        if let Err(error) = repository.commit(workspace_id, batch).await {
            tracing::warn!(%workspace_id, %error, "metadata commit failed");
            return Err(error.into());
        }
        tracing::info!(%workspace_id, writes, "metadata committed");
        Ok(())
    }

    /// Build the ordered batch and its post-write result
    ///
    /// Order: object creates, field creates, object updates, field
    /// updates, field deletes, object deletes. Deleting an object first
    /// deletes its persisted standard fields.
    ///
    /// # Errors
    /// Returns error if a field to create has no owner, or an entry to
    /// delete was never persisted
    pub fn prepare(
        storage: &WorkspaceSyncStorage,
    ) -> Result<(WriteBatch, MetadataUpdateResult), SyncError> {
        let mut batch = WriteBatch::new();
        let mut result = MetadataUpdateResult::default();

        for object in storage.objects_to_create() {
            let mut created = object.clone();
            let id = ObjectId::new();
            created.id = Some(id);
            for field in &mut created.fields {
                field.id = Some(FieldId::new());
                field.object_metadata_id = Some(id);
            }
            let mut row = created.clone();
            row.fields.clear();
            batch.push(WriteOp::CreateObject { object: row });
            result.created_objects.push(created);
        }
        for created in &result.created_objects {
            for field in &created.fields {
                batch.push(WriteOp::CreateField {
                    field: field.clone(),
                });
            }
        }
        for field in storage.fields_to_create() {
            if field.object_metadata_id.is_none() {
                return Err(MetadataError::MissingOwner(field.name.clone()).into());
            }
            let mut created = field.clone();
            created.id = Some(FieldId::new());
            batch.push(WriteOp::CreateField {
                field: created.clone(),
            });
            result.created_fields.push(created);
        }

        for patch in storage.objects_to_update() {
            batch.push(WriteOp::UpdateObject {
                patch: patch.clone(),
            });
            result.updated_objects.push(patch.clone());
        }
        for patch in storage.fields_to_update() {
            batch.push(WriteOp::UpdateField {
                patch: patch.clone(),
            });
            result.updated_fields.push(patch.clone());
        }

        let mut deleted_field_ids = HashSet::new();
        for field in storage.fields_to_delete() {
            let (id, owner) = persisted_field_ids(field)?;
            if deleted_field_ids.insert(id) {
                batch.push(WriteOp::DeleteField {
                    id,
                    object_metadata_id: owner,
                });
                result.deleted_fields.push(field.clone());
            }
        }
        for object in storage.objects_to_delete() {
            for field in object.standard_fields() {
                let (id, owner) = persisted_field_ids(field)?;
                if deleted_field_ids.insert(id) {
                    batch.push(WriteOp::DeleteField {
                        id,
                        object_metadata_id: owner,
                    });
                }
            }
        }
        for object in storage.objects_to_delete() {
            let id = object
                .id
                .ok_or_else(|| MetadataError::NotPersisted(object.name_singular.clone()))?;
            batch.push(WriteOp::DeleteObject { id });
            result.deleted_objects.push(object.clone());
        }

        Ok((batch, result))
    }
}

fn persisted_field_ids(field: &FieldMetadata) -> Result<(FieldId, ObjectId), MetadataError> {
    let id = field
        .id
        .ok_or_else(|| MetadataError::NotPersisted(field.name.clone()))?;
    let owner = field
        .object_metadata_id
        .ok_or_else(|| MetadataError::MissingOwner(field.name.clone()))?;
    Ok((id, owner))
}
