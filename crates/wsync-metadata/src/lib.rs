//! wsync Metadata Model
//!
//! Typed object/field metadata for workspace schemas.
//!
//! # Core Concepts
//!
//! - [`ObjectMetadata`]: one entity type, owning its [`FieldMetadata`]
//! - [`StandardId`]: deterministic identity of standard schema elements
//! - [`UniqueIdentifier`] / [`FieldKey`]: value-typed matching keys
//! - [`ObjectPatch`] / [`FieldPatch`]: minimal per-attribute updates
//! - [`FeatureFlagMap`]: per-workspace flags gating optional elements
//!
//! # Example
//!
//! ```rust,ignore
//! use wsync_metadata::{ObjectMetadata, ObjectPatch, StandardId, WorkspaceId};
//!
//! let target = ObjectMetadata::new(ws, "company", "companies", "Company", "Companies")
//!     .with_standard_id(StandardId::for_object("company"));
//! let patch = ObjectPatch::diff(&persisted, &target)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod context;
mod error;
mod field;
mod fingerprint;
mod flags;
mod ids;
mod object;
mod patch;

// Re-exports
pub use context::WorkspaceSyncContext;
pub use error::MetadataError;
pub use field::{FieldKey, FieldMetadata, FieldOption, FieldType};
pub use fingerprint::SchemaFingerprint;
pub use flags::{FeatureFlagKey, FeatureFlagMap};
pub use ids::{DataSourceId, FieldId, IdError, ObjectId, StandardId, UniqueIdentifier, WorkspaceId};
pub use object::{ObjectMetadata, Provenance};
pub use patch::{
    FieldAttribute, FieldChange, FieldPatch, ObjectAttribute, ObjectChange, ObjectPatch,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
