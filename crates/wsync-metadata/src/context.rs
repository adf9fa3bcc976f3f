//! Per-run workspace context

use crate::ids::{DataSourceId, WorkspaceId};
use serde::{Deserialize, Serialize};

/// Identifies the workspace a reconciliation run targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSyncContext {
    pub workspace_id: WorkspaceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<DataSourceId>,
}

impl WorkspaceSyncContext {
    /// Context without data source
    #[inline]
    #[must_use]
    pub const fn new(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            data_source_id: None,
        }
    }

    /// With data source
    #[inline]
    #[must_use]
    pub const fn with_data_source(mut self, data_source_id: DataSourceId) -> Self {
        self.data_source_id = Some(data_source_id);
        self
    }
}
