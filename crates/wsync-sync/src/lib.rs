//! wsync Synchronization Engine
//!
//! Reconciles a workspace's persisted metadata with the standard object
//! definitions and produces the migration plan for the DDL executor.
//!
//! # Core Concepts
//!
//! - [`map_by_identity`]: value-keyed matching of persisted and canonical metadata
//! - [`compute_standard_object`]: per-attribute precedence between canonical and workspace values
//! - [`ObjectComparator`] / [`FieldComparator`]: tagged CREATE/UPDATE/NOOP/DELETE decisions
//! - [`WorkspaceSyncStorage`]: explicit change-set threaded through a run
//! - [`MetadataUpdater`]: atomic, ordered persistence of the change-set
//! - [`MigrationPlan`]: creates before deletes, tables and columns ordered
//! - [`WorkspaceSyncMetadataService::synchronize`]: the single entry point
//!
//! # Example
//!
//! ```rust,ignore
//! use wsync_sync::{InMemoryMetadataRepository, WorkspaceSyncMetadataService};
//!
//! let service = WorkspaceSyncMetadataService::new(Arc::new(InMemoryMetadataRepository::new()));
//! let outcome = service.synchronize(&context, &flags).await?;
//! for entry in &outcome.plan {
//!     println!("{entry}");
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod comparator;
mod config;
mod error;
mod identity;
mod memory;
mod merger;
mod migration;
mod repository;
mod runner;
mod service;
mod storage;
mod updater;

// Re-exports
pub use comparator::{
    FieldComparator, FieldComparatorResult, ObjectComparator, ObjectComparatorResult,
};
pub use config::{LogFormat, SyncConfig};
pub use error::{DataIntegrityError, PersistenceError, SyncError};
pub use identity::{map_by_identity, Identified, IdentityMap};
pub use memory::{
    InMemoryFeatureFlags, InMemoryMetadataRepository, InMemoryMigrationSink, RepositorySnapshot,
};
pub use merger::{
    compute_standard_object, field_attribute_owner, object_attribute_owner, AttributeOwner,
};
pub use migration::{
    ColumnDescriptor, MigrationAction, MigrationId, MigrationPlan, MigrationPlanEntry,
    MigrationTarget, WorkspaceMigrationObjectFactory,
};
pub use repository::{
    FeatureFlagSource, MetadataRepository, MigrationSink, ObjectFilter, WriteBatch, WriteOp,
};
pub use runner::WorkspaceSyncRunner;
pub use service::{compute_change_set, SyncOutcome, WorkspaceSyncMetadataService};
pub use storage::{ChangeSummary, WorkspaceSyncStorage};
pub use updater::{MetadataUpdateResult, MetadataUpdater};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
