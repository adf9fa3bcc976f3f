//! Standard-Object Merger
//!
//! Builds the target object a persisted standard object is diffed against.
//! Precedence between canonical and workspace values is decided per
//! attribute by [`object_attribute_owner`] and [`field_attribute_owner`].

use crate::error::DataIntegrityError;
use std::collections::{HashMap, HashSet};
use wsync_metadata::{
    FieldAttribute, FieldChange, FieldKey, FieldMetadata, ObjectAttribute, ObjectChange,
    ObjectMetadata,
};
use wsync_standard::CanonicalObject;

/// Which side wins for an attribute of an existing object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeOwner {
    /// Shipped definition wins
    Canonical,
    /// Persisted workspace value wins
    Workspace,
}

/// Owner of a tracked object attribute
#[must_use]
pub const fn object_attribute_owner(attribute: ObjectAttribute) -> AttributeOwner {
    match attribute {
        ObjectAttribute::Icon | ObjectAttribute::IsActive => AttributeOwner::Workspace,
        ObjectAttribute::NameSingular
        | ObjectAttribute::NamePlural
        | ObjectAttribute::LabelSingular
        | ObjectAttribute::LabelPlural
        | ObjectAttribute::Description
        | ObjectAttribute::IsSystem
        | ObjectAttribute::TargetTableName => AttributeOwner::Canonical,
    }
}

/// Owner of a tracked field attribute
#[must_use]
pub const fn field_attribute_owner(attribute: FieldAttribute) -> AttributeOwner {
    match attribute {
        FieldAttribute::Icon | FieldAttribute::IsActive => AttributeOwner::Workspace,
        FieldAttribute::Name
        | FieldAttribute::Label
        | FieldAttribute::Type
        | FieldAttribute::Description
        | FieldAttribute::IsNullable
        | FieldAttribute::DefaultValue
        | FieldAttribute::Options
        | FieldAttribute::RelationTarget
        | FieldAttribute::IsSystem => AttributeOwner::Canonical,
    }
}

/// Compute the target for one standard object
///
/// Templates are expanded against `custom_objects`. When `persisted` is
/// present, row ids and data source are carried over, workspace-owned
/// attributes keep their persisted values, and matched fields inherit
/// their row ids. Custom fields of `persisted` are never copied.
///
/// # Errors
/// Returns `DataIntegrityError::DynamicFieldCollision` if a field expanded
/// for a custom object takes the name of another field of the object
pub fn compute_standard_object(
    canonical: &CanonicalObject,
    persisted: Option<&ObjectMetadata>,
    custom_objects: &[ObjectMetadata],
) -> Result<ObjectMetadata, DataIntegrityError> {
    let mut target = canonical.metadata.clone();
    let mut names: HashSet<String> = target.fields.iter().map(|f| f.name.clone()).collect();
    for field in canonical.expand_templates(custom_objects) {
        if !names.insert(field.name.clone()) {
            return Err(DataIntegrityError::DynamicFieldCollision {
                object: target.name_singular,
                field: field.name,
            });
        }
        target.fields.push(field);
    }

    let Some(persisted) = persisted else {
        return Ok(target);
    };

    target.id = persisted.id;
    target.data_source_id = persisted.data_source_id.or(target.data_source_id);
    for attribute in ObjectAttribute::ALL {
        if object_attribute_owner(attribute) == AttributeOwner::Workspace {
            ObjectChange::read(persisted, attribute).apply(&mut target);
        }
    }

    let persisted_fields: HashMap<FieldKey, &FieldMetadata> = persisted
        .standard_fields()
        .filter_map(|field| field.unique_identifier().map(|key| (key, field)))
        .collect();

    for field in &mut target.fields {
        field.object_metadata_id = persisted.id;
        let Some(existing) = field
            .unique_identifier()
            .and_then(|key| persisted_fields.get(&key))
        else {
            continue;
        };
        merge_field(field, existing);
    }

    Ok(target)
}

fn merge_field(target: &mut FieldMetadata, persisted: &FieldMetadata) {
    target.id = persisted.id;
    target.object_metadata_id = persisted.object_metadata_id.or(target.object_metadata_id);
    for attribute in FieldAttribute::ALL {
        if field_attribute_owner(attribute) == AttributeOwner::Workspace {
            FieldChange::read(persisted, attribute).apply(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wsync_metadata::{
        DataSourceId, FeatureFlagMap, FieldId, FieldType, ObjectId, StandardId, WorkspaceId,
        WorkspaceSyncContext,
    };
    use wsync_standard::{
        DynamicFieldDefinition, StandardObjectDefinition, StandardObjectFactory,
        StaticFieldDefinition,
    };

    fn canonical(ws: WorkspaceId) -> CanonicalObject {
        let definitions = vec![
            StandardObjectDefinition::new("contact", "contacts", "Contact", "Contacts")
                .description("A contact")
                .icon("IconUser")
                .field(StaticFieldDefinition::new("name", "Name", FieldType::Text).icon("IconAbc"))
                .field(StaticFieldDefinition::new("email", "Email", FieldType::Email))
                .per_custom_object(DynamicFieldDefinition::new("custom").with_join_column()),
        ];
        let context = WorkspaceSyncContext::new(ws);
        StandardObjectFactory::create(&definitions, &context, &FeatureFlagMap::new())
            .unwrap()
            .remove(0)
    }

    fn persisted_from(target: &ObjectMetadata) -> ObjectMetadata {
        let mut object = target.clone();
        let id = ObjectId::new();
        object.id = Some(id);
        object.data_source_id = Some(DataSourceId::new());
        for field in &mut object.fields {
            field.id = Some(FieldId::new());
            field.object_metadata_id = Some(id);
        }
        object
    }

    #[test]
    fn absent_persisted_yields_canonical() {
        let ws = WorkspaceId::new();
        let canonical = canonical(ws);
        let target = compute_standard_object(&canonical, None, &[]).unwrap();
        assert_eq!(target, canonical.metadata);
    }

    #[test]
    fn workspace_owned_attributes_are_preserved() {
        let ws = WorkspaceId::new();
        let canonical = canonical(ws);
        let mut persisted = persisted_from(&canonical.metadata);
        persisted.icon = Some("IconHeart".into());
        persisted.is_active = false;
        persisted.description = Some("Old description".into());
        persisted.fields[0].icon = Some("IconStar".into());
        persisted.fields[0].label = "Full name".to_string();

        let target = compute_standard_object(&canonical, Some(&persisted), &[]).unwrap();
        assert_eq!(target.id, persisted.id);
        assert_eq!(target.data_source_id, persisted.data_source_id);
        assert_eq!(target.icon.as_deref(), Some("IconHeart"));
        assert!(!target.is_active);
        assert_eq!(target.description.as_deref(), Some("A contact"));
        assert_eq!(target.fields[0].icon.as_deref(), Some("IconStar"));
        assert_eq!(target.fields[0].label, "Name");
        assert_eq!(target.fields[0].id, persisted.fields[0].id);
    }

    #[test]
    fn custom_fields_are_not_copied() {
        let ws = WorkspaceId::new();
        let canonical = canonical(ws);
        let mut persisted = persisted_from(&canonical.metadata);
        let mut tier = FieldMetadata::new("loyaltyTier", "Loyalty Tier", FieldType::Text).custom();
        tier.id = Some(FieldId::new());
        tier.object_metadata_id = persisted.id;
        persisted.fields.push(tier);

        let target = compute_standard_object(&canonical, Some(&persisted), &[]).unwrap();
        assert!(target.field_by_name("loyaltyTier").is_none());
    }

    #[test]
    fn new_fields_point_at_persisted_owner() {
        let ws = WorkspaceId::new();
        let canonical = canonical(ws);
        let mut persisted = persisted_from(&canonical.metadata);
        persisted.fields.pop();

        let target = compute_standard_object(&canonical, Some(&persisted), &[]).unwrap();
        let email = target.field_by_name("email").unwrap();
        assert_eq!(email.id, None);
        assert_eq!(email.object_metadata_id, persisted.id);
    }

    #[test]
    fn templates_expand_for_custom_objects() {
        let ws = WorkspaceId::new();
        let canonical = canonical(ws);
        let mut pet = ObjectMetadata::new(ws, "pet", "pets", "Pet", "Pets").custom();
        pet.id = Some(ObjectId::new());

        let target = compute_standard_object(&canonical, None, &[pet]).unwrap();
        let names: Vec<_> = target.fields.iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, vec!["name", "email", "pet", "petId"]);
        assert!(target.fields[2].standard_id.is_some());
        assert_ne!(
            target.fields[2].standard_id,
            Some(StandardId::for_field("contact", "custom"))
        );
    }

    #[test]
    fn custom_object_named_like_a_standard_field_is_rejected() {
        let ws = WorkspaceId::new();
        let canonical = canonical(ws);
        let mut email = ObjectMetadata::new(ws, "email", "emails", "Email", "Emails").custom();
        email.id = Some(ObjectId::new());

        let error = compute_standard_object(&canonical, None, &[email]).unwrap_err();
        assert!(matches!(
            error,
            DataIntegrityError::DynamicFieldCollision { ref object, ref field }
                if object == "contact" && field == "email"
        ));
    }

    #[test]
    fn join_column_collision_is_rejected() {
        let ws = WorkspaceId::new();
        let canonical = canonical(ws);
        let mut pet = ObjectMetadata::new(ws, "pet", "pets", "Pet", "Pets").custom();
        pet.id = Some(ObjectId::new());
        let mut pet_id = ObjectMetadata::new(ws, "petId", "petIds", "Pet Id", "Pet Ids").custom();
        pet_id.id = Some(ObjectId::new());

        let error = compute_standard_object(&canonical, None, &[pet, pet_id]).unwrap_err();
        assert!(matches!(
            error,
            DataIntegrityError::DynamicFieldCollision { ref field, .. } if field == "petId"
        ));
    }

    #[test]
    fn precedence_table_is_explicit() {
        let workspace: Vec<_> = ObjectAttribute::ALL
            .into_iter()
            .filter(|&a| object_attribute_owner(a) == AttributeOwner::Workspace)
            .collect();
        assert_eq!(workspace, vec![ObjectAttribute::Icon, ObjectAttribute::IsActive]);

        let workspace: Vec<_> = FieldAttribute::ALL
            .into_iter()
            .filter(|&a| field_attribute_owner(a) == AttributeOwner::Workspace)
            .collect();
        assert_eq!(workspace, vec![FieldAttribute::Icon, FieldAttribute::IsActive]);
    }
}
