//! Reconciliation entry point
//!
//! One run: fetch persisted metadata, build the canonical standard set,
//! diff by identity into a change-set, persist it, and turn the persisted
//! creates and deletes into a migration plan.

use crate::comparator::{
    FieldComparator, FieldComparatorResult, ObjectComparator, ObjectComparatorResult,
};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::identity::map_by_identity;
use crate::merger::compute_standard_object;
use crate::migration::{
    MigrationAction, MigrationPlan, MigrationPlanEntry, WorkspaceMigrationObjectFactory,
};
use crate::repository::{MetadataRepository, MigrationSink, ObjectFilter};
use crate::storage::{ChangeSummary, WorkspaceSyncStorage};
use crate::updater::{MetadataUpdateResult, MetadataUpdater};
use std::collections::HashMap;
use std::sync::Arc;
use wsync_metadata::{
    FeatureFlagMap, ObjectId, ObjectMetadata, SchemaFingerprint, WorkspaceSyncContext,
};
use wsync_standard::{
    standard_object_definitions, CanonicalObject, StandardObjectDefinition, StandardObjectFactory,
};

/// Result of one reconciliation run
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    /// Ordered physical-schema operations
    pub plan: MigrationPlan,
    /// Sizes of the persisted change-set
    pub summary: ChangeSummary,
    /// Fingerprint of the canonical standard set used
    pub fingerprint: SchemaFingerprint,
    /// Whether metadata writes were skipped
    pub dry_run: bool,
}

/// Synchronizes one workspace's metadata with the standard definitions
#[derive(Clone)]
pub struct WorkspaceSyncMetadataService {
    repository: Arc<dyn MetadataRepository>,
    definitions: Arc<[StandardObjectDefinition]>,
    config: SyncConfig,
}

impl std::fmt::Debug for WorkspaceSyncMetadataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceSyncMetadataService")
            .field("definitions", &self.definitions.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WorkspaceSyncMetadataService {
    /// Create service over the built-in catalog
    #[must_use]
    pub fn new(repository: Arc<dyn MetadataRepository>) -> Self {
        Self {
            repository,
            definitions: standard_object_definitions().into(),
            config: SyncConfig::default(),
        }
    }

    /// With alternative standard definitions
    #[must_use]
    pub fn with_definitions(mut self, definitions: Vec<StandardObjectDefinition>) -> Self {
        self.definitions = definitions.into();
        self
    }

    /// With configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Standard definitions in use
    #[inline]
    #[must_use]
    pub fn definitions(&self) -> &[StandardObjectDefinition] {
        &self.definitions
    }

    /// Run one reconciliation for `context`
    ///
    /// Returns the migration plan for the caller to queue; on dry run the
    /// plan is computed from provisional ids and nothing is written.
    ///
    /// # Errors
    /// - `SyncError::Definition` if the standard definitions are malformed
    /// - `SyncError::DataIntegrity` on identity collisions or classification flips
    /// - `SyncError::Persistence` if reading or committing metadata fails
    #[tracing::instrument(skip_all, fields(workspace_id = %context.workspace_id))]
    pub async fn synchronize(
        &self,
        context: &WorkspaceSyncContext,
        flags: &FeatureFlagMap,
    ) -> Result<SyncOutcome, SyncError> {
        self.reconcile(context, None, flags).await
    }

    /// Run one reconciliation and queue its plan on `sink`
    ///
    /// The plan is queued before the metadata commit and withdrawn if the
    /// commit fails, so committed metadata always has its migrations
    /// queued. Empty plans and dry runs queue nothing.
    ///
    /// # Errors
    /// As [`Self::synchronize`], plus `SyncError::Sink` if queueing fails;
    /// metadata is then left untouched
    #[tracing::instrument(skip_all, fields(workspace_id = %context.workspace_id))]
    pub async fn synchronize_into(
        &self,
        context: &WorkspaceSyncContext,
        sink: &dyn MigrationSink,
        flags: &FeatureFlagMap,
    ) -> Result<SyncOutcome, SyncError> {
        self.reconcile(context, Some(sink), flags).await
    }

    async fn reconcile(
        &self,
        context: &WorkspaceSyncContext,
        sink: Option<&dyn MigrationSink>,
        flags: &FeatureFlagMap,
    ) -> Result<SyncOutcome, SyncError> {
        let workspace_id = context.workspace_id;

        let persisted = self
            .repository
            .fetch_objects(workspace_id, ObjectFilter::standard_fields())
            .await?;
        let canonical = StandardObjectFactory::create(&self.definitions, context, flags)?;
        let metadata: Vec<_> = canonical.iter().map(|c| c.metadata.clone()).collect();
        let fingerprint = SchemaFingerprint::compute(&metadata)?;
        tracing::info!(
            persisted = persisted.len(),
            canonical = canonical.len(),
            fingerprint = %fingerprint.short(),
            "comparing workspace metadata"
        );

        let storage = compute_change_set(&persisted, &canonical)?;
        let summary = storage.summary();
        tracing::info!(%summary, "change-set computed");

        let (batch, result) = MetadataUpdater::prepare(&storage)?;
        let plan = self.build_plan(&persisted, &result);
        tracing::info!(entries = plan.len(), "migration plan built");

        let queued = match sink {
            Some(sink) if !self.config.dry_run && !plan.is_empty() => {
                sink.save(workspace_id, plan.entries().to_vec()).await?;
                tracing::info!(entries = plan.len(), "migrations queued");
                Some((sink, plan.iter().map(|entry| entry.id).collect::<Vec<_>>()))
            }
            _ => None,
        };

        let updater = MetadataUpdater::new().with_dry_run(self.config.dry_run);
        if let Err(error) = updater
            .commit(self.repository.as_ref(), workspace_id, batch)
            .await
        {
            if let Some((sink, ids)) = queued {
                if let Err(discard_error) = sink.discard(workspace_id, ids).await {
                    tracing::warn!(%discard_error, "queued migrations could not be withdrawn");
                }
            }
            return Err(error);
        }

        Ok(SyncOutcome {
            plan,
            summary,
            fingerprint,
            dry_run: self.config.dry_run,
        })
    }

    fn build_plan(
        &self,
        persisted: &[ObjectMetadata],
        result: &MetadataUpdateResult,
    ) -> MigrationPlan {
        let mut entries = WorkspaceMigrationObjectFactory::create(
            &result.created_objects,
            MigrationAction::Create,
        );
        entries.extend(WorkspaceMigrationObjectFactory::create(
            &result.deleted_objects,
            MigrationAction::Delete,
        ));
        if self.config.field_migrations {
            entries.extend(field_entries(persisted, result));
        }
        MigrationPlan::ordered(entries)
    }
}

/// Diff persisted metadata against the canonical set
///
/// Pure. Persisted non-custom objects with no canonical counterpart are
/// marked for deletion; custom objects are only used to expand templates.
///
/// # Errors
/// Returns error on identity collisions or classification flips
pub fn compute_change_set(
    persisted: &[ObjectMetadata],
    canonical: &[CanonicalObject],
) -> Result<WorkspaceSyncStorage, SyncError> {
    let persisted_map = map_by_identity(persisted)?;
    let canonical_map = map_by_identity(canonical)?;
    let custom_objects: Vec<_> = persisted
        .iter()
        .filter(|object| object.is_custom)
        .cloned()
        .collect();

    let mut storage = WorkspaceSyncStorage::new();

    for (key, object) in &persisted_map {
        if object.is_custom || canonical_map.contains_key(key) {
            continue;
        }
        tracing::debug!(object = %object.name_singular, "standard object no longer defined");
        storage.add_delete_object((*object).clone())?;
    }

    for (key, canonical) in &canonical_map {
        let persisted = persisted_map.get(key).copied();
        storage.merge(compare_standard_object(canonical, persisted, &custom_objects)?)?;
    }

    Ok(storage)
}

fn compare_standard_object(
    canonical: &CanonicalObject,
    persisted: Option<&ObjectMetadata>,
    custom_objects: &[ObjectMetadata],
) -> Result<WorkspaceSyncStorage, SyncError> {
    let target = compute_standard_object(canonical, persisted, custom_objects)?;
    let mut storage = WorkspaceSyncStorage::new();

    let decision = ObjectComparator::compare(persisted, &target)?;
    tracing::debug!(object = %target.name_singular, action = decision.action(), "object compared");
    match decision {
        ObjectComparatorResult::Create(object) => {
            storage.add_create_object(object)?;
            return Ok(storage);
        }
        ObjectComparatorResult::Update(patch) => storage.add_update_object(patch),
        ObjectComparatorResult::Noop => {}
    }

    if let Some(persisted) = persisted {
        for result in FieldComparator::compare(persisted, &target)? {
            match result {
                FieldComparatorResult::Create(field) => storage.add_create_field(field)?,
                FieldComparatorResult::Update(patch) => storage.add_update_field(patch),
                FieldComparatorResult::Delete(field) => storage.add_delete_field(field)?,
            }
        }
    }

    Ok(storage)
}

fn field_entries(
    persisted: &[ObjectMetadata],
    result: &MetadataUpdateResult,
) -> Vec<MigrationPlanEntry> {
    let tables: HashMap<ObjectId, &str> = persisted
        .iter()
        .filter_map(|object| object.id.map(|id| (id, object.target_table_name.as_str())))
        .collect();

    let mut entries = Vec::new();
    let sides = [
        (&result.created_fields, MigrationAction::Create),
        (&result.deleted_fields, MigrationAction::Delete),
    ];
    for (fields, action) in sides {
        for field in fields {
            let Some(table) = field.object_metadata_id.and_then(|id| tables.get(&id)) else {
                continue;
            };
            entries.extend(WorkspaceMigrationObjectFactory::create_columns(
                table,
                std::iter::once(field),
                action,
            ));
        }
    }
    entries
}
