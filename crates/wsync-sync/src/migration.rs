//! Migration Plan Builder
//!
//! Turns persisted creates and deletes into physical-schema entries for
//! the DDL executor. Metadata updates never produce entries.
//!
//! # Ordering
//!
//! [`MigrationPlan::ordered`] puts every CREATE before every DELETE.
//! Among creates, tables precede columns; among deletes, columns precede
//! tables. Entries of the same rank keep their input order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use ulid::Ulid;
use wsync_metadata::{FieldMetadata, FieldType, ObjectMetadata};

/// Migration entry identifier (sortable by creation time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationId(Ulid);

impl MigrationId {
    /// Generate new identifier
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for MigrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MigrationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationAction {
    Create,
    Delete,
}

impl Display for MigrationAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("CREATE"),
            Self::Delete => f.write_str("DELETE"),
        }
    }
}

/// Column of a table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub is_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

impl ColumnDescriptor {
    /// Column backing `field`, if its type is stored in a column
    #[must_use]
    pub fn from_field(field: &FieldMetadata) -> Option<Self> {
        field.field_type.has_column().then(|| Self {
            name: field.name.clone(),
            field_type: field.field_type,
            is_nullable: field.is_nullable,
            default_value: field.default_value.clone(),
        })
    }
}

/// Schema element an entry acts on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MigrationTarget {
    /// Whole table; columns are listed for creates only
    Table {
        name: String,
        columns: Vec<ColumnDescriptor>,
    },
    /// Single column of an existing table
    Column {
        table: String,
        column: ColumnDescriptor,
    },
}

impl MigrationTarget {
    /// Table this target lives in
    #[must_use]
    pub fn table_name(&self) -> &str {
        match self {
            Self::Table { name, .. } => name,
            Self::Column { table, .. } => table,
        }
    }

    /// Whether this is a table-level target
    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Self::Table { .. })
    }
}

/// One queued physical-schema operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlanEntry {
    pub id: MigrationId,
    pub action: MigrationAction,
    pub target: MigrationTarget,
}

impl MigrationPlanEntry {
    /// Create entry with a fresh id
    #[must_use]
    pub fn new(action: MigrationAction, target: MigrationTarget) -> Self {
        Self {
            id: MigrationId::new(),
            action,
            target,
        }
    }

    /// Sort rank enforcing the plan ordering
    const fn rank(&self) -> u8 {
        match (self.action, self.target.is_table()) {
            (MigrationAction::Create, true) => 0,
            (MigrationAction::Create, false) => 1,
            (MigrationAction::Delete, false) => 2,
            (MigrationAction::Delete, true) => 3,
        }
    }
}

impl Display for MigrationPlanEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.target {
            MigrationTarget::Table { name, columns } if self.action == MigrationAction::Create => {
                write!(f, "{} table {name} ({} columns)", self.action, columns.len())
            }
            MigrationTarget::Table { name, .. } => write!(f, "{} table {name}", self.action),
            MigrationTarget::Column { table, column } => {
                write!(f, "{} column {table}.{}", self.action, column.name)
            }
        }
    }
}

/// Ordered migration plan of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlan {
    entries: Vec<MigrationPlanEntry>,
    generated_at: DateTime<Utc>,
}

impl MigrationPlan {
    /// Plan with no entries
    #[must_use]
    pub fn empty() -> Self {
        Self::ordered(Vec::new())
    }

    /// Build a plan, enforcing entry ordering regardless of input order
    #[must_use]
    pub fn ordered(mut entries: Vec<MigrationPlanEntry>) -> Self {
        entries.sort_by_key(MigrationPlanEntry::rank);
        Self {
            entries,
            generated_at: Utc::now(),
        }
    }

    /// Entries in application order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[MigrationPlanEntry] {
        &self.entries
    }

    /// When the plan was built
    #[inline]
    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the plan is a no-op
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries
    pub fn iter(&self) -> std::slice::Iter<'_, MigrationPlanEntry> {
        self.entries.iter()
    }

    /// Take the entries
    #[must_use]
    pub fn into_entries(self) -> Vec<MigrationPlanEntry> {
        self.entries
    }
}

impl IntoIterator for MigrationPlan {
    type Item = MigrationPlanEntry;
    type IntoIter = std::vec::IntoIter<MigrationPlanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a MigrationPlan {
    type Item = &'a MigrationPlanEntry;
    type IntoIter = std::slice::Iter<'a, MigrationPlanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Pure builder of plan entries from persisted metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceMigrationObjectFactory;

impl WorkspaceMigrationObjectFactory {
    /// One table entry per object
    ///
    /// Creates list every column-backed field; deletes list none.
    #[must_use]
    pub fn create(objects: &[ObjectMetadata], action: MigrationAction) -> Vec<MigrationPlanEntry> {
        objects
            .iter()
            .map(|object| {
                let columns = match action {
                    MigrationAction::Create => object
                        .fields
                        .iter()
                        .filter_map(ColumnDescriptor::from_field)
                        .collect(),
                    MigrationAction::Delete => Vec::new(),
                };
                MigrationPlanEntry::new(
                    action,
                    MigrationTarget::Table {
                        name: object.target_table_name.clone(),
                        columns,
                    },
                )
            })
            .collect()
    }

    /// One column entry per column-backed field of `table`
    #[must_use]
    pub fn create_columns<'a>(
        table: &str,
        fields: impl IntoIterator<Item = &'a FieldMetadata>,
        action: MigrationAction,
    ) -> Vec<MigrationPlanEntry> {
        fields
            .into_iter()
            .filter_map(ColumnDescriptor::from_field)
            .map(|column| {
                MigrationPlanEntry::new(
                    action,
                    MigrationTarget::Column {
                        table: table.to_string(),
                        column,
                    },
                )
            })
            .collect()
    }
}
