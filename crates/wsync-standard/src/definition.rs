//! Static standard-object definitions
//!
//! Definitions are plain serde data so a catalog can be compiled in
//! ([`crate::catalog`]) or loaded from YAML ([`load_definitions_yaml`]).

use crate::error::DefinitionError;
use serde::{Deserialize, Serialize};
use wsync_metadata::{FeatureFlagKey, FieldOption, FieldType, StandardId};

/// Static definition of one standard object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardObjectDefinition {
    pub name_singular: String,
    pub name_plural: String,
    pub label_singular: String,
    pub label_plural: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    /// Flag that must be enabled for the object to exist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<FeatureFlagKey>,
    #[serde(default)]
    pub fields: Vec<StandardFieldDefinition>,
}

impl StandardObjectDefinition {
    /// Create definition without fields
    #[must_use]
    pub fn new(
        name_singular: impl Into<String>,
        name_plural: impl Into<String>,
        label_singular: impl Into<String>,
        label_plural: impl Into<String>,
    ) -> Self {
        Self {
            name_singular: name_singular.into(),
            name_plural: name_plural.into(),
            label_singular: label_singular.into(),
            label_plural: label_plural.into(),
            description: None,
            icon: None,
            is_system: false,
            gate: None,
            fields: Vec::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With icon
    #[inline]
    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Mark as system object
    #[inline]
    #[must_use]
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// Gate behind a feature flag
    #[inline]
    #[must_use]
    pub fn gated(mut self, flag: FeatureFlagKey) -> Self {
        self.gate = Some(flag);
        self
    }

    /// Append static field
    #[inline]
    #[must_use]
    pub fn field(mut self, field: StaticFieldDefinition) -> Self {
        self.fields.push(StandardFieldDefinition::Static(field));
        self
    }

    /// Append per-custom-object field template
    #[inline]
    #[must_use]
    pub fn per_custom_object(mut self, template: DynamicFieldDefinition) -> Self {
        self.fields.push(StandardFieldDefinition::PerCustomObject(template));
        self
    }

    /// Prepend the `id`, `createdAt` and `updatedAt` system fields
    #[must_use]
    pub fn with_system_fields(mut self) -> Self {
        let system = [
            StaticFieldDefinition::new("id", "Id", FieldType::Uuid)
                .required()
                .system()
                .default_value(serde_json::json!("uuid")),
            StaticFieldDefinition::new("createdAt", "Creation date", FieldType::DateTime)
                .required()
                .system()
                .default_value(serde_json::json!("now")),
            StaticFieldDefinition::new("updatedAt", "Update date", FieldType::DateTime)
                .required()
                .system()
                .default_value(serde_json::json!("now")),
        ];
        let rest = std::mem::take(&mut self.fields);
        self.fields = system
            .into_iter()
            .map(StandardFieldDefinition::Static)
            .chain(rest)
            .collect();
        self
    }

    /// Deterministic identifier of this object
    #[inline]
    #[must_use]
    pub fn standard_id(&self) -> StandardId {
        StandardId::for_object(&self.name_singular)
    }

    /// Static field definitions
    pub fn static_fields(&self) -> impl Iterator<Item = &StaticFieldDefinition> {
        self.fields.iter().filter_map(|field| match field {
            StandardFieldDefinition::Static(field) => Some(field),
            StandardFieldDefinition::PerCustomObject(_) => None,
        })
    }

    /// Per-custom-object templates
    pub fn templates(&self) -> impl Iterator<Item = &DynamicFieldDefinition> {
        self.fields.iter().filter_map(|field| match field {
            StandardFieldDefinition::Static(_) => None,
            StandardFieldDefinition::PerCustomObject(template) => Some(template),
        })
    }
}

/// Field entry of a standard object definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StandardFieldDefinition {
    /// Exactly one field
    Static(StaticFieldDefinition),
    /// Expanded once per custom object of the workspace
    PerCustomObject(DynamicFieldDefinition),
}

impl StandardFieldDefinition {
    /// Name used for duplicate detection
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Static(field) => &field.name,
            Self::PerCustomObject(template) => &template.key,
        }
    }

    /// Feature gate
    #[must_use]
    pub fn gate(&self) -> Option<FeatureFlagKey> {
        match self {
            Self::Static(field) => field.gate,
            Self::PerCustomObject(template) => template.gate,
        }
    }
}

/// One concrete standard field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticFieldDefinition {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_true")]
    pub is_nullable: bool,
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    /// Target object `name_singular` for relation fields
    #[serde(default)]
    pub relation_target: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub gate: Option<FeatureFlagKey>,
}

fn default_true() -> bool {
    true
}

impl StaticFieldDefinition {
    /// Create nullable field definition
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            description: None,
            icon: None,
            is_nullable: true,
            default_value: None,
            options: Vec::new(),
            relation_target: None,
            is_system: false,
            gate: None,
        }
    }

    /// Relation field pointing at `target`
    #[must_use]
    pub fn relation(
        name: impl Into<String>,
        label: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let mut field = Self::new(name, label, FieldType::Relation);
        field.relation_target = Some(target.into());
        field
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With icon
    #[inline]
    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Not nullable
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    /// Mark as system field
    #[inline]
    #[must_use]
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// With default value
    #[inline]
    #[must_use]
    pub fn default_value(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// With select options
    #[inline]
    #[must_use]
    pub fn options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    /// Gate behind a feature flag
    #[inline]
    #[must_use]
    pub fn gated(mut self, flag: FeatureFlagKey) -> Self {
        self.gate = Some(flag);
        self
    }
}

/// Field template expanded for every custom object
///
/// Expands into a relation field named after the custom object and, when
/// `join_column` is set, a `<name>Id` UUID foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldDefinition {
    /// Template key, seeds the template standard id
    pub key: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub join_column: bool,
    #[serde(default)]
    pub gate: Option<FeatureFlagKey>,
}

impl DynamicFieldDefinition {
    /// Create template
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: None,
            icon: None,
            join_column: false,
            gate: None,
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With icon
    #[inline]
    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Also emit a foreign-key column
    #[inline]
    #[must_use]
    pub fn with_join_column(mut self) -> Self {
        self.join_column = true;
        self
    }
}

/// Parse a catalog from YAML
///
/// # Errors
/// Returns error if the document is not a list of object definitions
pub fn load_definitions_yaml(yaml: &str) -> Result<Vec<StandardObjectDefinition>, DefinitionError> {
    serde_yaml::from_str(yaml).map_err(DefinitionError::InvalidYaml)
}

/// Render a catalog as YAML
///
/// # Errors
/// Returns error if serialization fails
pub fn definitions_to_yaml(
    definitions: &[StandardObjectDefinition],
) -> Result<String, DefinitionError> {
    serde_yaml::to_string(definitions).map_err(DefinitionError::InvalidYaml)
}
