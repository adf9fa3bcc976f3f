//! Feature flags gating optional standard objects and fields

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Platform feature flags known to the standard catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureFlagKey {
    IsBlocklistEnabled,
    IsCalendarEnabled,
    IsMessagingEnabled,
    IsWorkflowEnabled,
}

impl Display for FeatureFlagKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IsBlocklistEnabled => "IS_BLOCKLIST_ENABLED",
            Self::IsCalendarEnabled => "IS_CALENDAR_ENABLED",
            Self::IsMessagingEnabled => "IS_MESSAGING_ENABLED",
            Self::IsWorkflowEnabled => "IS_WORKFLOW_ENABLED",
        };
        f.write_str(name)
    }
}

/// Flag values for one workspace
///
/// Missing keys read as disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureFlagMap(BTreeMap<FeatureFlagKey, bool>);

impl FeatureFlagMap {
    /// Empty map (every flag disabled)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With flag set
    #[inline]
    #[must_use]
    pub fn with(mut self, key: FeatureFlagKey, enabled: bool) -> Self {
        self.0.insert(key, enabled);
        self
    }

    /// Set flag
    #[inline]
    pub fn set(&mut self, key: FeatureFlagKey, enabled: bool) {
        self.0.insert(key, enabled);
    }

    /// Whether `key` is enabled
    #[inline]
    #[must_use]
    pub fn is_enabled(&self, key: FeatureFlagKey) -> bool {
        self.0.get(&key).copied().unwrap_or(false)
    }

    /// Whether an optional gate is open (`None` is always open)
    #[inline]
    #[must_use]
    pub fn allows(&self, gate: Option<FeatureFlagKey>) -> bool {
        gate.map_or(true, |key| self.is_enabled(key))
    }

    /// Enabled keys
    pub fn enabled(&self) -> impl Iterator<Item = FeatureFlagKey> + '_ {
        self.0
            .iter()
            .filter_map(|(key, enabled)| enabled.then_some(*key))
    }
}

impl FromIterator<(FeatureFlagKey, bool)> for FeatureFlagMap {
    fn from_iter<I: IntoIterator<Item = (FeatureFlagKey, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
