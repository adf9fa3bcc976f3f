//! wsync command-line driver
//!
//! Runs reconciliations against a JSON repository snapshot and inspects
//! standard catalogs.
//!
//! # Core Concepts
//!
//! - [`sync`]: reconcile one workspace and rewrite the snapshot
//! - [`catalog`]: list the standard objects for a flag set
//! - [`validate`]: check a YAML catalog before shipping it
//! - [`init_tracing`]: stderr subscriber driven by `SyncConfig`
//!
//! # Example
//!
//! ```rust,ignore
//! let report = wsync_cli::sync(&args).await?;
//! println!("{}", wsync_cli::render_report(&report, false)?);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod commands;
mod telemetry;

// Re-exports
pub use commands::{
    catalog, load_config, load_definitions, load_flags, render_report, sync, validate, SyncArgs,
    SyncReport,
};
pub use telemetry::init_tracing;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
