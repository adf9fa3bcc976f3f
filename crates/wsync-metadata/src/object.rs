//! Object metadata

use crate::field::{FieldKey, FieldMetadata};
use crate::ids::{DataSourceId, ObjectId, StandardId, UniqueIdentifier, WorkspaceId};
use serde::{Deserialize, Serialize};

/// Where an object definition comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Shipped by the platform
    Standard,
    /// Created by the workspace
    Custom,
}

/// One entity type of a workspace schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Persisted row id (`None` until written)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Stable identifier for standard objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_id: Option<StandardId>,
    pub workspace_id: WorkspaceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<DataSourceId>,
    pub name_singular: String,
    pub name_plural: String,
    pub label_singular: String,
    pub label_plural: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    pub target_table_name: String,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub fields: Vec<FieldMetadata>,
}

fn default_true() -> bool {
    true
}

impl ObjectMetadata {
    /// Create an active, non-custom object without fields
    ///
    /// The table name defaults to `name_singular`.
    #[must_use]
    pub fn new(
        workspace_id: WorkspaceId,
        name_singular: impl Into<String>,
        name_plural: impl Into<String>,
        label_singular: impl Into<String>,
        label_plural: impl Into<String>,
    ) -> Self {
        let name_singular = name_singular.into();
        Self {
            id: None,
            standard_id: None,
            workspace_id,
            data_source_id: None,
            target_table_name: name_singular.clone(),
            name_singular,
            name_plural: name_plural.into(),
            label_singular: label_singular.into(),
            label_plural: label_plural.into(),
            description: None,
            icon: None,
            is_custom: false,
            is_active: true,
            is_system: false,
            fields: Vec::new(),
        }
    }

    /// With standard id
    #[inline]
    #[must_use]
    pub fn with_standard_id(mut self, standard_id: StandardId) -> Self {
        self.standard_id = Some(standard_id);
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark as custom; custom tables are prefixed with `_`
    #[must_use]
    pub fn custom(mut self) -> Self {
        self.is_custom = true;
        self.target_table_name = format!("_{}", self.name_singular);
        self
    }

    /// With field appended
    #[inline]
    #[must_use]
    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.fields.push(field);
        self
    }

    /// Provenance marker derived from `is_custom`
    #[inline]
    #[must_use]
    pub fn provenance(&self) -> Provenance {
        if self.is_custom {
            Provenance::Custom
        } else {
            Provenance::Standard
        }
    }

    /// Key used to match this object across collections
    #[must_use]
    pub fn unique_identifier(&self) -> Option<UniqueIdentifier> {
        match (self.standard_id, self.id) {
            (Some(standard_id), _) => Some(UniqueIdentifier::Standard(standard_id)),
            (None, Some(id)) => Some(UniqueIdentifier::Custom(id)),
            (None, None) => None,
        }
    }

    /// Find field by key
    #[must_use]
    pub fn field(&self, key: FieldKey) -> Option<&FieldMetadata> {
        self.fields
            .iter()
            .find(|field| field.unique_identifier() == Some(key))
    }

    /// Find field by name
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Fields that are not custom
    pub fn standard_fields(&self) -> impl Iterator<Item = &FieldMetadata> {
        self.fields.iter().filter(|field| !field.is_custom)
    }

    /// Same object with custom fields removed
    #[must_use]
    pub fn without_custom_fields(mut self) -> Self {
        self.fields.retain(|field| !field.is_custom);
        self
    }
}
