//! In-memory collaborators
//!
//! Used by tests and by the CLI, which loads a JSON snapshot into
//! [`InMemoryMetadataRepository`] and writes it back after a run.

use crate::error::{PersistenceError, SyncError};
use crate::migration::{MigrationId, MigrationPlanEntry};
use crate::repository::{
    FeatureFlagSource, MetadataRepository, MigrationSink, ObjectFilter, WriteBatch, WriteOp,
};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use wsync_metadata::{FeatureFlagMap, FieldId, ObjectId, ObjectMetadata, WorkspaceId};

/// Serializable state of an [`InMemoryMetadataRepository`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub workspaces: BTreeMap<WorkspaceId, Vec<ObjectMetadata>>,
}

/// Metadata repository held in process memory
///
/// Commits stage a copy of the workspace, apply every write to it and
/// swap it in only when all writes succeed.
#[derive(Debug, Default)]
pub struct InMemoryMetadataRepository {
    workspaces: RwLock<BTreeMap<WorkspaceId, Vec<ObjectMetadata>>>,
    fail_next_commit: AtomicBool,
    commits: AtomicUsize,
}

impl InMemoryMetadataRepository {
    /// Create empty repository
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create repository from a snapshot
    #[must_use]
    pub fn from_snapshot(snapshot: RepositorySnapshot) -> Self {
        Self {
            workspaces: RwLock::new(snapshot.workspaces),
            ..Self::default()
        }
    }

    /// Parse a JSON snapshot
    ///
    /// # Errors
    /// Returns error if `json` is not a valid snapshot
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let snapshot: RepositorySnapshot =
            serde_json::from_str(json).map_err(|e| PersistenceError::Snapshot(e.to_string()))?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Current state as a snapshot
    #[must_use]
    pub fn snapshot(&self) -> RepositorySnapshot {
        RepositorySnapshot {
            workspaces: self.workspaces.read().clone(),
        }
    }

    /// Current state as pretty JSON
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| PersistenceError::Snapshot(e.to_string()))
    }

    /// Insert an object as if persisted earlier
    ///
    /// Missing row ids are minted and fields are attached to the object.
    /// Returns the stored object.
    pub fn insert(&self, workspace_id: WorkspaceId, mut object: ObjectMetadata) -> ObjectMetadata {
        let id = *object.id.get_or_insert_with(ObjectId::new);
        object.workspace_id = workspace_id;
        for field in &mut object.fields {
            field.id.get_or_insert_with(FieldId::new);
            field.object_metadata_id = Some(id);
        }
        self.workspaces
            .write()
            .entry(workspace_id)
            .or_default()
            .push(object.clone());
        object
    }

    /// Objects of a workspace, unfiltered
    #[must_use]
    pub fn objects(&self, workspace_id: WorkspaceId) -> Vec<ObjectMetadata> {
        self.workspaces
            .read()
            .get(&workspace_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Make the next commit fail without applying anything
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of successful commits
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

fn object_mut(
    objects: &mut [ObjectMetadata],
    id: ObjectId,
) -> Result<&mut ObjectMetadata, PersistenceError> {
    objects
        .iter_mut()
        .find(|object| object.id == Some(id))
        .ok_or(PersistenceError::UnknownObject(id))
}

fn apply(objects: &mut Vec<ObjectMetadata>, op: WriteOp) -> Result<(), PersistenceError> {
    match op {
        WriteOp::CreateObject { object } => {
            let id = object.id.ok_or_else(|| {
                PersistenceError::Conflict(format!("object '{}' has no id", object.name_singular))
            })?;
            let clash = objects.iter().any(|existing| {
                existing.id == Some(id)
                    || (object.standard_id.is_some() && existing.standard_id == object.standard_id)
            });
            if clash {
                return Err(PersistenceError::Conflict(format!(
                    "object '{}' already exists",
                    object.name_singular
                )));
            }
            objects.push(object);
        }
        WriteOp::CreateField { field } => {
            let owner = field.object_metadata_id.ok_or_else(|| {
                PersistenceError::Conflict(format!("field '{}' has no owner", field.name))
            })?;
            let object = object_mut(objects, owner)?;
            if object.fields.iter().any(|existing| {
                existing.id == field.id
                    || (field.standard_id.is_some() && existing.standard_id == field.standard_id)
            }) {
                return Err(PersistenceError::Conflict(format!(
                    "field '{}.{}' already exists",
                    object.name_singular, field.name
                )));
            }
            object.fields.push(field);
        }
        WriteOp::UpdateObject { patch } => {
            patch.apply_to(object_mut(objects, patch.id)?);
        }
        WriteOp::UpdateField { patch } => {
            let object = object_mut(objects, patch.object_metadata_id)?;
            let field = object
                .fields
                .iter_mut()
                .find(|field| field.id == Some(patch.id))
                .ok_or(PersistenceError::UnknownField(patch.id))?;
            patch.apply_to(field);
        }
        WriteOp::DeleteField {
            id,
            object_metadata_id,
        } => {
            let object = object_mut(objects, object_metadata_id)?;
            let before = object.fields.len();
            object.fields.retain(|field| field.id != Some(id));
            if object.fields.len() == before {
                return Err(PersistenceError::UnknownField(id));
            }
        }
        WriteOp::DeleteObject { id } => {
            let before = objects.len();
            objects.retain(|object| object.id != Some(id));
            if objects.len() == before {
                return Err(PersistenceError::UnknownObject(id));
            }
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl MetadataRepository for InMemoryMetadataRepository {
    async fn fetch_objects(
        &self,
        workspace_id: WorkspaceId,
        filter: ObjectFilter,
    ) -> Result<Vec<ObjectMetadata>, PersistenceError> {
        Ok(self
            .workspaces
            .read()
            .get(&workspace_id)
            .map(|objects| objects.iter().filter_map(|object| filter.apply(object)).collect())
            .unwrap_or_default())
    }

    async fn commit(
        &self,
        workspace_id: WorkspaceId,
        batch: WriteBatch,
    ) -> Result<(), PersistenceError> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(PersistenceError::CommitFailed("injected failure".to_string()));
        }

        let mut workspaces = self.workspaces.write();
        let mut staged = workspaces.get(&workspace_id).cloned().unwrap_or_default();
        for op in batch {
            apply(&mut staged, op)?;
        }
        workspaces.insert(workspace_id, staged);
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Feature flags held in process memory
#[derive(Debug, Default)]
pub struct InMemoryFeatureFlags {
    flags: DashMap<WorkspaceId, FeatureFlagMap>,
}

impl InMemoryFeatureFlags {
    /// Create empty source (every flag disabled)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flags of a workspace
    pub fn set(&self, workspace_id: WorkspaceId, flags: FeatureFlagMap) {
        self.flags.insert(workspace_id, flags);
    }

    /// With the flags of a workspace set
    #[must_use]
    pub fn with(self, workspace_id: WorkspaceId, flags: FeatureFlagMap) -> Self {
        self.set(workspace_id, flags);
        self
    }
}

#[async_trait::async_trait]
impl FeatureFlagSource for InMemoryFeatureFlags {
    async fn flags(&self, workspace_id: WorkspaceId) -> Result<FeatureFlagMap, SyncError> {
        Ok(self
            .flags
            .get(&workspace_id)
            .map(|flags| flags.value().clone())
            .unwrap_or_default())
    }
}

/// Migration queue held in process memory
#[derive(Debug, Default)]
pub struct InMemoryMigrationSink {
    pending: DashMap<WorkspaceId, Vec<MigrationPlanEntry>>,
}

impl InMemoryMigrationSink {
    /// Create empty sink
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop and return queued entries of a workspace
    pub fn drain(&self, workspace_id: WorkspaceId) -> Vec<MigrationPlanEntry> {
        self.pending
            .remove(&workspace_id)
            .map(|(_, entries)| entries)
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl MigrationSink for InMemoryMigrationSink {
    async fn save(
        &self,
        workspace_id: WorkspaceId,
        entries: Vec<MigrationPlanEntry>,
    ) -> Result<(), SyncError> {
        self.pending.entry(workspace_id).or_default().extend(entries);
        Ok(())
    }

    async fn discard(
        &self,
        workspace_id: WorkspaceId,
        ids: Vec<MigrationId>,
    ) -> Result<(), SyncError> {
        if let Some(mut entries) = self.pending.get_mut(&workspace_id) {
            entries.retain(|entry| !ids.contains(&entry.id));
        }
        Ok(())
    }

    async fn pending(
        &self,
        workspace_id: WorkspaceId,
    ) -> Result<Vec<MigrationPlanEntry>, SyncError> {
        Ok(self
            .pending
            .get(&workspace_id)
            .map(|entries| entries.value().clone())
            .unwrap_or_default())
    }
}
