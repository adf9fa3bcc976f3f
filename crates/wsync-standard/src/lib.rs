//! wsync Standard Schema
//!
//! Static standard-object definitions and the factory that materializes
//! them for one workspace.
//!
//! # Core Concepts
//!
//! - [`StandardObjectDefinition`]: static, serde-loadable object template
//! - [`DynamicFieldDefinition`]: field template expanded per custom object
//! - [`StandardObjectFactory`]: definitions + context + flags to [`CanonicalObject`]s
//! - [`validate_definitions`]: fail-fast catalog checks
//!
//! # Example
//!
//! ```rust,ignore
//! use wsync_standard::{standard_object_definitions, StandardObjectFactory};
//!
//! let objects = StandardObjectFactory::create(
//!     &standard_object_definitions(),
//!     &context,
//!     &flags,
//! )?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod catalog;
mod definition;
mod error;
mod factory;
mod validate;

// Re-exports
pub use catalog::standard_object_definitions;
pub use definition::{
    definitions_to_yaml, load_definitions_yaml, DynamicFieldDefinition, StandardFieldDefinition,
    StandardObjectDefinition, StaticFieldDefinition,
};
pub use error::DefinitionError;
pub use factory::{CanonicalObject, StandardObjectFactory};
pub use validate::{validate_definitions, validate_name, MAX_NAME_LEN};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
