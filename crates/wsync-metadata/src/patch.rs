//! Minimal attribute patches
//!
//! An UPDATE carries only the attributes that changed, one [`ObjectChange`]
//! or [`FieldChange`] per attribute, so persistence writes exactly what
//! differs. Patches are addressed by the persisted row id.

use crate::error::MetadataError;
use crate::field::{FieldKey, FieldMetadata, FieldOption, FieldType};
use crate::ids::{FieldId, ObjectId, StandardId, UniqueIdentifier};
use crate::object::ObjectMetadata;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Tracked object attribute names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectAttribute {
    NameSingular,
    NamePlural,
    LabelSingular,
    LabelPlural,
    Description,
    Icon,
    IsActive,
    IsSystem,
    TargetTableName,
}

impl ObjectAttribute {
    /// Every tracked attribute, in comparison order
    pub const ALL: [Self; 9] = [
        Self::NameSingular,
        Self::NamePlural,
        Self::LabelSingular,
        Self::LabelPlural,
        Self::Description,
        Self::Icon,
        Self::IsActive,
        Self::IsSystem,
        Self::TargetTableName,
    ];
}

/// Tracked field attribute names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldAttribute {
    Name,
    Label,
    Type,
    Description,
    Icon,
    IsNullable,
    DefaultValue,
    Options,
    RelationTarget,
    IsActive,
    IsSystem,
}

impl FieldAttribute {
    /// Every tracked attribute, in comparison order
    pub const ALL: [Self; 11] = [
        Self::Name,
        Self::Label,
        Self::Type,
        Self::Description,
        Self::Icon,
        Self::IsNullable,
        Self::DefaultValue,
        Self::Options,
        Self::RelationTarget,
        Self::IsActive,
        Self::IsSystem,
    ];
}

/// New value of one object attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "camelCase")]
pub enum ObjectChange {
    NameSingular(String),
    NamePlural(String),
    LabelSingular(String),
    LabelPlural(String),
    Description(Option<String>),
    Icon(Option<String>),
    IsActive(bool),
    IsSystem(bool),
    TargetTableName(String),
}

impl ObjectChange {
    /// Attribute this change targets
    #[must_use]
    pub const fn attribute(&self) -> ObjectAttribute {
        match self {
            Self::NameSingular(_) => ObjectAttribute::NameSingular,
            Self::NamePlural(_) => ObjectAttribute::NamePlural,
            Self::LabelSingular(_) => ObjectAttribute::LabelSingular,
            Self::LabelPlural(_) => ObjectAttribute::LabelPlural,
            Self::Description(_) => ObjectAttribute::Description,
            Self::Icon(_) => ObjectAttribute::Icon,
            Self::IsActive(_) => ObjectAttribute::IsActive,
            Self::IsSystem(_) => ObjectAttribute::IsSystem,
            Self::TargetTableName(_) => ObjectAttribute::TargetTableName,
        }
    }

    /// Read `attribute` from `object` as a change value
    #[must_use]
    pub fn read(object: &ObjectMetadata, attribute: ObjectAttribute) -> Self {
        match attribute {
            ObjectAttribute::NameSingular => Self::NameSingular(object.name_singular.clone()),
            ObjectAttribute::NamePlural => Self::NamePlural(object.name_plural.clone()),
            ObjectAttribute::LabelSingular => Self::LabelSingular(object.label_singular.clone()),
            ObjectAttribute::LabelPlural => Self::LabelPlural(object.label_plural.clone()),
            ObjectAttribute::Description => Self::Description(object.description.clone()),
            ObjectAttribute::Icon => Self::Icon(object.icon.clone()),
            ObjectAttribute::IsActive => Self::IsActive(object.is_active),
            ObjectAttribute::IsSystem => Self::IsSystem(object.is_system),
            ObjectAttribute::TargetTableName => {
                Self::TargetTableName(object.target_table_name.clone())
            }
        }
    }

    /// Write this value into `object`
    pub fn apply(&self, object: &mut ObjectMetadata) {
        match self {
            Self::NameSingular(v) => object.name_singular.clone_from(v),
            Self::NamePlural(v) => object.name_plural.clone_from(v),
            Self::LabelSingular(v) => object.label_singular.clone_from(v),
            Self::LabelPlural(v) => object.label_plural.clone_from(v),
            Self::Description(v) => object.description.clone_from(v),
            Self::Icon(v) => object.icon.clone_from(v),
            Self::IsActive(v) => object.is_active = *v,
            Self::IsSystem(v) => object.is_system = *v,
            Self::TargetTableName(v) => object.target_table_name.clone_from(v),
        }
    }
}

/// New value of one field attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "camelCase")]
pub enum FieldChange {
    Name(String),
    Label(String),
    Type(FieldType),
    Description(Option<String>),
    Icon(Option<String>),
    IsNullable(bool),
    DefaultValue(Option<serde_json::Value>),
    Options(Vec<FieldOption>),
    RelationTarget(Option<String>),
    IsActive(bool),
    IsSystem(bool),
}

impl FieldChange {
    /// Attribute this change targets
    #[must_use]
    pub const fn attribute(&self) -> FieldAttribute {
        match self {
            Self::Name(_) => FieldAttribute::Name,
            Self::Label(_) => FieldAttribute::Label,
            Self::Type(_) => FieldAttribute::Type,
            Self::Description(_) => FieldAttribute::Description,
            Self::Icon(_) => FieldAttribute::Icon,
            Self::IsNullable(_) => FieldAttribute::IsNullable,
            Self::DefaultValue(_) => FieldAttribute::DefaultValue,
            Self::Options(_) => FieldAttribute::Options,
            Self::RelationTarget(_) => FieldAttribute::RelationTarget,
            Self::IsActive(_) => FieldAttribute::IsActive,
            Self::IsSystem(_) => FieldAttribute::IsSystem,
        }
    }

    /// Read `attribute` from `field` as a change value
    #[must_use]
    pub fn read(field: &FieldMetadata, attribute: FieldAttribute) -> Self {
        match attribute {
            FieldAttribute::Name => Self::Name(field.name.clone()),
            FieldAttribute::Label => Self::Label(field.label.clone()),
            FieldAttribute::Type => Self::Type(field.field_type),
            FieldAttribute::Description => Self::Description(field.description.clone()),
            FieldAttribute::Icon => Self::Icon(field.icon.clone()),
            FieldAttribute::IsNullable => Self::IsNullable(field.is_nullable),
            FieldAttribute::DefaultValue => Self::DefaultValue(field.default_value.clone()),
            FieldAttribute::Options => Self::Options(field.options.clone()),
            FieldAttribute::RelationTarget => Self::RelationTarget(field.relation_target.clone()),
            FieldAttribute::IsActive => Self::IsActive(field.is_active),
            FieldAttribute::IsSystem => Self::IsSystem(field.is_system),
        }
    }

    /// Write this value into `field`
    pub fn apply(&self, field: &mut FieldMetadata) {
        match self {
            Self::Name(v) => field.name.clone_from(v),
            Self::Label(v) => field.label.clone_from(v),
            Self::Type(v) => field.field_type = *v,
            Self::Description(v) => field.description.clone_from(v),
            Self::Icon(v) => field.icon.clone_from(v),
            Self::IsNullable(v) => field.is_nullable = *v,
            Self::DefaultValue(v) => field.default_value.clone_from(v),
            Self::Options(v) => field.options.clone_from(v),
            Self::RelationTarget(v) => field.relation_target.clone_from(v),
            Self::IsActive(v) => field.is_active = *v,
            Self::IsSystem(v) => field.is_system = *v,
        }
    }
}

/// UPDATE payload for an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPatch {
    /// Persisted row being updated
    pub id: ObjectId,
    pub standard_id: Option<StandardId>,
    /// Changed attributes, in [`ObjectAttribute::ALL`] order
    pub changes: Vec<ObjectChange>,
}

impl ObjectPatch {
    /// Diff two objects over the tracked attributes
    ///
    /// Returns `None` when nothing tracked differs.
    ///
    /// # Errors
    /// Returns error if `persisted` has no row id
    pub fn diff(
        persisted: &ObjectMetadata,
        target: &ObjectMetadata,
    ) -> Result<Option<Self>, MetadataError> {
        let id = persisted
            .id
            .ok_or_else(|| MetadataError::NotPersisted(persisted.name_singular.clone()))?;

        let changes: Vec<_> = ObjectAttribute::ALL
            .iter()
            .filter_map(|&attribute| {
                let wanted = ObjectChange::read(target, attribute);
                (ObjectChange::read(persisted, attribute) != wanted).then_some(wanted)
            })
            .collect();

        if changes.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            id,
            standard_id: persisted.standard_id.or(target.standard_id),
            changes,
        }))
    }

    /// Identity used by the change-set
    #[inline]
    #[must_use]
    pub fn unique_identifier(&self) -> UniqueIdentifier {
        self.standard_id
            .map_or(UniqueIdentifier::Custom(self.id), UniqueIdentifier::Standard)
    }

    /// Changed attribute names
    #[must_use]
    pub fn changed_attributes(&self) -> Vec<ObjectAttribute> {
        self.changes.iter().map(ObjectChange::attribute).collect()
    }

    /// Apply every change to `object`
    pub fn apply_to(&self, object: &mut ObjectMetadata) {
        for change in &self.changes {
            change.apply(object);
        }
    }

    /// Fold a later patch for the same row into this one (last write wins)
    pub fn merge(&mut self, later: Self) {
        for change in later.changes {
            let attribute = change.attribute();
            match self.changes.iter_mut().find(|c| c.attribute() == attribute) {
                Some(existing) => *existing = change,
                None => self.changes.push(change),
            }
        }
        self.changes.sort_by_key(ObjectChange::attribute);
    }
}

/// UPDATE payload for a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    /// Persisted row being updated
    pub id: FieldId,
    /// Owning object row
    pub object_metadata_id: ObjectId,
    pub standard_id: Option<StandardId>,
    /// Changed attributes, in [`FieldAttribute::ALL`] order
    pub changes: Vec<FieldChange>,
}

impl FieldPatch {
    /// Diff two fields over the tracked attributes
    ///
    /// # Errors
    /// Returns error if `persisted` or its owner has no row id
    pub fn diff(
        persisted: &FieldMetadata,
        target: &FieldMetadata,
    ) -> Result<Option<Self>, MetadataError> {
        let id = persisted
            .id
            .ok_or_else(|| MetadataError::NotPersisted(persisted.name.clone()))?;
        let object_metadata_id = persisted
            .object_metadata_id
            .ok_or_else(|| MetadataError::MissingOwner(persisted.name.clone()))?;

        let changes: Vec<_> = FieldAttribute::ALL
            .iter()
            .filter_map(|&attribute| {
                let wanted = FieldChange::read(target, attribute);
                (FieldChange::read(persisted, attribute) != wanted).then_some(wanted)
            })
            .collect();

        if changes.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            id,
            object_metadata_id,
            standard_id: persisted.standard_id.or(target.standard_id),
            changes,
        }))
    }

    /// Identity used by the change-set
    #[inline]
    #[must_use]
    pub fn key(&self) -> FieldKey {
        self.standard_id
            .map_or(FieldKey::Custom(self.id), FieldKey::Standard)
    }

    /// Changed attribute names
    #[must_use]
    pub fn changed_attributes(&self) -> Vec<FieldAttribute> {
        self.changes.iter().map(FieldChange::attribute).collect()
    }

    /// Apply every change to `field`
    pub fn apply_to(&self, field: &mut FieldMetadata) {
        for change in &self.changes {
            change.apply(field);
        }
    }

    /// Fold a later patch for the same row into this one (last write wins)
    pub fn merge(&mut self, later: Self) {
        for change in later.changes {
            let attribute = change.attribute();
            match self.changes.iter_mut().find(|c| c.attribute() == attribute) {
                Some(existing) => *existing = change,
                None => self.changes.push(change),
            }
        }
        self.changes.sort_by_key(FieldChange::attribute);
    }
}

impl Display for ObjectPatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "object {} {:?}", self.id, self.changed_attributes())
    }
}

impl Display for FieldPatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "field {} {:?}", self.id, self.changed_attributes())
    }
}
