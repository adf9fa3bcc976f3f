//! Subcommand implementations
//!
//! Each command returns its rendered output; `main` only prints it.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wsync_metadata::{FeatureFlagMap, WorkspaceId, WorkspaceSyncContext};
use wsync_standard::{
    load_definitions_yaml, standard_object_definitions, validate_definitions,
    StandardObjectDefinition, StandardObjectFactory,
};
use wsync_sync::{
    ChangeSummary, InMemoryFeatureFlags, InMemoryMetadataRepository, InMemoryMigrationSink,
    MigrationPlanEntry, SyncConfig, WorkspaceSyncMetadataService, WorkspaceSyncRunner,
};

/// Inputs of `wsync sync`
#[derive(Debug, Clone)]
pub struct SyncArgs {
    /// JSON repository snapshot, created on first run
    pub state: PathBuf,
    pub workspace_id: WorkspaceId,
    pub flags: Option<PathBuf>,
    pub definitions: Option<PathBuf>,
    pub config: SyncConfig,
    pub json: bool,
}

/// Result of `wsync sync`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub workspace_id: WorkspaceId,
    pub dry_run: bool,
    pub fingerprint: String,
    pub summary: ChangeSummary,
    pub migrations: Vec<MigrationPlanEntry>,
}

impl SyncReport {
    /// Human-readable rendering
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let mode = if self.dry_run { " (dry run)" } else { "" };
        let _ = writeln!(out, "workspace {}{mode}", self.workspace_id);
        let short = &self.fingerprint[..16.min(self.fingerprint.len())];
        let _ = writeln!(out, "standard schema {short}");
        let _ = writeln!(out, "metadata {}", self.summary);
        if self.migrations.is_empty() {
            out.push_str("no migrations\n");
        }
        for entry in &self.migrations {
            let _ = writeln!(out, "  {entry}");
        }
        out
    }
}

/// Configuration file, or defaults
///
/// # Errors
/// Returns error if the file cannot be read or parsed
pub fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    match path {
        Some(path) => Ok(SyncConfig::load(path)?),
        None => Ok(SyncConfig::default()),
    }
}

/// Feature flags from a JSON object such as `{"IS_CALENDAR_ENABLED": true}`
///
/// # Errors
/// Returns error if the file cannot be read or parsed
pub fn load_flags(path: Option<&Path>) -> Result<FeatureFlagMap> {
    let Some(path) = path else {
        return Ok(FeatureFlagMap::new());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading flags {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing flags {}", path.display()))
}

/// Catalog from YAML, or the built-in one
///
/// # Errors
/// Returns error if the file cannot be read or parsed
pub fn load_definitions(path: Option<&Path>) -> Result<Vec<StandardObjectDefinition>> {
    let Some(path) = path else {
        return Ok(standard_object_definitions());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading definitions {}", path.display()))?;
    load_definitions_yaml(&contents)
        .with_context(|| format!("parsing definitions {}", path.display()))
}

/// Reconcile one workspace of a snapshot file
///
/// The snapshot is rewritten unless the run is a dry run.
///
/// # Errors
/// Returns error on unreadable inputs or a failed reconciliation
pub async fn sync(args: &SyncArgs) -> Result<SyncReport> {
    let definitions = load_definitions(args.definitions.as_deref())?;
    let flags = load_flags(args.flags.as_deref())?;

    let repository = if args.state.exists() {
        let contents = std::fs::read_to_string(&args.state)
            .with_context(|| format!("reading state {}", args.state.display()))?;
        InMemoryMetadataRepository::from_json(&contents)?
    } else {
        tracing::info!(state = %args.state.display(), "starting from an empty snapshot");
        InMemoryMetadataRepository::new()
    };
    let repository = Arc::new(repository);

    let service = WorkspaceSyncMetadataService::new(repository.clone())
        .with_definitions(definitions)
        .with_config(args.config.clone());
    let runner = WorkspaceSyncRunner::new(
        service,
        Arc::new(InMemoryFeatureFlags::new().with(args.workspace_id, flags)),
        Arc::new(InMemoryMigrationSink::new()),
    );
    let outcome = runner
        .run(WorkspaceSyncContext::new(args.workspace_id))
        .await?;

    if !outcome.dry_run {
        std::fs::write(&args.state, repository.to_json()?)
            .with_context(|| format!("writing state {}", args.state.display()))?;
    }

    Ok(SyncReport {
        workspace_id: args.workspace_id,
        dry_run: outcome.dry_run,
        fingerprint: outcome.fingerprint.to_string(),
        summary: outcome.summary,
        migrations: outcome.plan.into_entries(),
    })
}

/// Render a sync report as text or JSON
///
/// # Errors
/// Returns error if JSON serialization fails
pub fn render_report(report: &SyncReport, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(report)?)
    } else {
        Ok(report.render_text())
    }
}

/// Standard objects a workspace with `flags` would receive
///
/// # Errors
/// Returns error if the catalog is malformed
pub fn catalog(
    definitions: &[StandardObjectDefinition],
    flags: &FeatureFlagMap,
    json: bool,
) -> Result<String> {
    let context = WorkspaceSyncContext::new(WorkspaceId::new());
    let canonical = StandardObjectFactory::create(definitions, &context, flags)?;

    if json {
        let objects: Vec<_> = canonical.iter().map(|c| &c.metadata).collect();
        return Ok(serde_json::to_string_pretty(&objects)?);
    }

    let mut out = String::new();
    for object in &canonical {
        let metadata = &object.metadata;
        let standard_id = object
            .standard_id()
            .map(|id| id.short())
            .unwrap_or_default();
        let _ = write!(
            out,
            "{:<16} {:<20} {:>3} fields",
            standard_id,
            metadata.name_singular,
            metadata.fields.len()
        );
        if !object.templates.is_empty() {
            let _ = write!(out, ", {} per custom object", object.templates.len());
        }
        out.push('\n');
    }
    Ok(out)
}

/// Check a YAML catalog
///
/// # Errors
/// Returns error if the file is unreadable or the catalog is malformed
pub fn validate(path: &Path) -> Result<String> {
    let definitions = load_definitions(Some(path))?;
    validate_definitions(&definitions)
        .with_context(|| format!("validating {}", path.display()))?;
    Ok(format!("{} object definitions valid", definitions.len()))
}
