//! Multi-workspace runner
//!
//! Wraps the service with the collaborator plumbing: flag lookup,
//! per-workspace serialization and migration queueing. Runs for different
//! workspaces proceed concurrently; runs for the same workspace queue up.

use crate::error::SyncError;
use crate::repository::{FeatureFlagSource, MigrationSink};
use crate::service::{SyncOutcome, WorkspaceSyncMetadataService};
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use wsync_metadata::{WorkspaceId, WorkspaceSyncContext};

/// Runs reconciliations and queues their plans
pub struct WorkspaceSyncRunner {
    service: WorkspaceSyncMetadataService,
    flags: Arc<dyn FeatureFlagSource>,
    sink: Arc<dyn MigrationSink>,
    locks: DashMap<WorkspaceId, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for WorkspaceSyncRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceSyncRunner")
            .field("service", &self.service)
            .field("locked_workspaces", &self.locks.len())
            .finish_non_exhaustive()
    }
}

impl WorkspaceSyncRunner {
    /// Create runner
    #[must_use]
    pub fn new(
        service: WorkspaceSyncMetadataService,
        flags: Arc<dyn FeatureFlagSource>,
        sink: Arc<dyn MigrationSink>,
    ) -> Self {
        Self {
            service,
            flags,
            sink,
            locks: DashMap::new(),
        }
    }

    /// Underlying service
    #[inline]
    #[must_use]
    pub fn service(&self) -> &WorkspaceSyncMetadataService {
        &self.service
    }

    fn lock_for(&self, workspace_id: WorkspaceId) -> Arc<Mutex<()>> {
        self.locks.entry(workspace_id).or_default().value().clone()
    }

    /// Drop the workspace lock once no run holds or awaits it
    fn release(&self, workspace_id: WorkspaceId, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.locks.remove_if(&workspace_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Synchronize one workspace
    ///
    /// Non-empty plans are queued on the sink ahead of the metadata commit
    /// unless the run is a dry run.
    ///
    /// # Errors
    /// Propagates flag, reconciliation and sink failures; a failed run
    /// leaves nothing to resume and should be retried from scratch
    #[tracing::instrument(skip_all, fields(workspace_id = %context.workspace_id))]
    pub async fn run(&self, context: WorkspaceSyncContext) -> Result<SyncOutcome, SyncError> {
        let workspace_id = context.workspace_id;
        let lock = self.lock_for(workspace_id);
        let result = {
            let _guard = lock.lock().await;
            self.run_exclusive(&context).await
        };
        self.release(workspace_id, lock);

        if let Err(error) = &result {
            tracing::warn!(%error, retryable = error.is_retryable(), "synchronization failed");
        }
        result
    }

    async fn run_exclusive(
        &self,
        context: &WorkspaceSyncContext,
    ) -> Result<SyncOutcome, SyncError> {
        let flags = self.flags.flags(context.workspace_id).await?;
        self.service
            .synchronize_into(context, self.sink.as_ref(), &flags)
            .await
    }

    /// Synchronize several workspaces, bounded by
    /// `max_concurrent_workspaces`; results keep input order
    pub async fn sync_many(
        &self,
        contexts: Vec<WorkspaceSyncContext>,
    ) -> Vec<(WorkspaceId, Result<SyncOutcome, SyncError>)> {
        let limit = self.service.config().max_concurrent_workspaces.max(1);
        stream::iter(contexts)
            .map(|context| async move { (context.workspace_id, self.run(context).await) })
            .buffered(limit)
            .collect()
            .await
    }
}
