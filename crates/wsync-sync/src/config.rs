//! Synchronization configuration

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Reconciliation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Compute plans without committing metadata or queueing migrations
    pub dry_run: bool,
    /// Also emit column entries for field creates/deletes on existing objects
    pub field_migrations: bool,
    /// Upper bound on workspaces synchronized at once
    pub max_concurrent_workspaces: usize,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With dry run
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// With column-level migrations
    #[inline]
    #[must_use]
    pub fn with_field_migrations(mut self, enabled: bool) -> Self {
        self.field_migrations = enabled;
        self
    }

    /// With concurrency bound (at least one)
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_workspaces(mut self, max: usize) -> Self {
        self.max_concurrent_workspaces = max.max(1);
        self
    }

    /// With log level directive
    #[inline]
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// With log format
    #[inline]
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Parse from TOML; missing keys take defaults
    ///
    /// # Errors
    /// Returns error if the document is not valid TOML for this struct
    pub fn from_toml_str(toml: &str) -> Result<Self, SyncError> {
        let config: Self = toml::from_str(toml).map_err(|e| SyncError::Config(e.to_string()))?;
        let max = config.max_concurrent_workspaces;
        Ok(config.with_max_concurrent_workspaces(max))
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            field_migrations: false,
            max_concurrent_workspaces: 4,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}
