//! Field metadata

use crate::ids::{FieldId, ObjectId, StandardId};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Uuid,
    Text,
    Number,
    Numeric,
    Boolean,
    DateTime,
    Date,
    Email,
    Phone,
    Link,
    Currency,
    FullName,
    Rating,
    Select,
    MultiSelect,
    Relation,
    Position,
    RawJson,
}

impl FieldType {
    /// Whether values of this type live in the owning table
    ///
    /// Relation fields are virtual: the physical column is the separate
    /// UUID join column.
    #[inline]
    #[must_use]
    pub const fn has_column(self) -> bool {
        !matches!(self, Self::Relation)
    }

    /// Whether the type carries select options
    #[inline]
    #[must_use]
    pub const fn has_options(self) -> bool {
        matches!(self, Self::Select | Self::MultiSelect | Self::Rating)
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uuid => "UUID",
            Self::Text => "TEXT",
            Self::Number => "NUMBER",
            Self::Numeric => "NUMERIC",
            Self::Boolean => "BOOLEAN",
            Self::DateTime => "DATE_TIME",
            Self::Date => "DATE",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Link => "LINK",
            Self::Currency => "CURRENCY",
            Self::FullName => "FULL_NAME",
            Self::Rating => "RATING",
            Self::Select => "SELECT",
            Self::MultiSelect => "MULTI_SELECT",
            Self::Relation => "RELATION",
            Self::Position => "POSITION",
            Self::RawJson => "RAW_JSON",
        };
        f.write_str(name)
    }
}

/// One choice of a select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FieldOption {
    /// Create option at position
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>, position: u32) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            position,
            color: None,
        }
    }
}

/// One attribute of an object
///
/// Owned by exactly one [`ObjectMetadata`](crate::ObjectMetadata).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    /// Persisted row id (`None` until written)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FieldId>,
    /// Stable identifier for standard fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_id: Option<StandardId>,
    /// Owning object row id (`None` until the owner is written)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_metadata_id: Option<ObjectId>,
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
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Target object `name_singular` for relation fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_target: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_system: bool,
}

fn default_true() -> bool {
    true
}

impl FieldMetadata {
    /// Create an active, nullable, non-custom field
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: None,
            standard_id: None,
            object_metadata_id: None,
            name: name.into(),
            label: label.into(),
            field_type,
            description: None,
            icon: None,
            is_nullable: true,
            default_value: None,
            options: Vec::new(),
            relation_target: None,
            is_custom: false,
            is_active: true,
            is_system: false,
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

    /// With icon
    #[inline]
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Mark as custom (workspace-owned)
    #[inline]
    #[must_use]
    pub fn custom(mut self) -> Self {
        self.is_custom = true;
        self
    }

    /// With nullability
    #[inline]
    #[must_use]
    pub fn with_nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    /// With relation target
    #[inline]
    #[must_use]
    pub fn with_relation_target(mut self, target: impl Into<String>) -> Self {
        self.relation_target = Some(target.into());
        self
    }

    /// Key used to match this field across collections
    ///
    /// Custom fields without standard id have no cross-collection identity
    /// beyond their row id, which is reused here as a custom key.
    #[must_use]
    pub fn unique_identifier(&self) -> Option<FieldKey> {
        match (self.standard_id, self.id) {
            (Some(standard_id), _) => Some(FieldKey::Standard(standard_id)),
            (None, Some(id)) => Some(FieldKey::Custom(id)),
            (None, None) => None,
        }
    }
}

/// Field counterpart of [`UniqueIdentifier`](crate::UniqueIdentifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum FieldKey {
    /// Keyed by standard id
    Standard(StandardId),
    /// Custom field without standard id
    Custom(FieldId),
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(id) => write!(f, "standard:{id}"),
            Self::Custom(id) => write!(f, "custom:{id}"),
        }
    }
}
