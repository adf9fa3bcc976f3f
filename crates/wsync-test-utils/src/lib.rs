//! Testing utilities for wsync workspace
//!
//! Shared fixtures and proptest strategies.

#![allow(missing_docs)]

use proptest::prelude::*;
use std::collections::BTreeSet;
use wsync_metadata::{
    FieldId, FieldMetadata, FieldType, ObjectId, ObjectMetadata, StandardId, WorkspaceId,
};
use wsync_standard::{StandardObjectDefinition, StaticFieldDefinition};

/// `contact { name, email }`
pub fn contact_definition() -> StandardObjectDefinition {
    StandardObjectDefinition::new("contact", "contacts", "Contact", "Contacts")
        .field(StaticFieldDefinition::new("name", "Name", FieldType::Text))
        .field(StaticFieldDefinition::new("email", "Email", FieldType::Email))
}

/// `legacyThing { note }`
pub fn legacy_thing_definition() -> StandardObjectDefinition {
    StandardObjectDefinition::new("legacyThing", "legacyThings", "Legacy Thing", "Legacy Things")
        .field(StaticFieldDefinition::new("note", "Note", FieldType::Text))
}

/// Standard object shaped like the factory would emit it, not yet persisted
pub fn standard_object(
    workspace_id: WorkspaceId,
    name: &str,
    fields: &[(&str, FieldType)],
) -> ObjectMetadata {
    let mut object = ObjectMetadata::new(workspace_id, name, format!("{name}s"), name, name)
        .with_standard_id(StandardId::for_object(name));
    for (field, field_type) in fields {
        object.fields.push(
            FieldMetadata::new(*field, *field, *field_type)
                .with_standard_id(StandardId::for_field(name, field)),
        );
    }
    object
}

/// Assign row ids to an object and its fields
pub fn persisted(mut object: ObjectMetadata) -> ObjectMetadata {
    let id = *object.id.get_or_insert_with(ObjectId::new);
    for field in &mut object.fields {
        field.id.get_or_insert_with(FieldId::new);
        field.object_metadata_id = Some(id);
    }
    object
}

/// Persisted custom object without standard id
pub fn custom_object(workspace_id: WorkspaceId, name: &str, label: &str) -> ObjectMetadata {
    persisted(
        ObjectMetadata::new(workspace_id, name, format!("{name}s"), label, format!("{label}s"))
            .custom()
            .with_field(FieldMetadata::new("title", "Title", FieldType::Text).custom()),
    )
}

/// Workspace-owned field without standard id
pub fn custom_field(name: &str, label: &str) -> FieldMetadata {
    let mut field = FieldMetadata::new(name, label, FieldType::Text).custom();
    field.id = Some(FieldId::new());
    field
}

fn arb_field_type() -> impl Strategy<Value = FieldType> {
    prop_oneof![
        Just(FieldType::Text),
        Just(FieldType::Number),
        Just(FieldType::Boolean),
        Just(FieldType::DateTime),
        Just(FieldType::Email),
        Just(FieldType::Uuid),
    ]
}

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{2,10}"
}

/// One object definition with distinct field names
pub fn arb_object_definition(name: String) -> impl Strategy<Value = StandardObjectDefinition> {
    prop::collection::btree_map(arb_name(), (arb_field_type(), any::<bool>()), 0..6).prop_map(
        move |fields| {
            fields.into_iter().fold(
                StandardObjectDefinition::new(
                    name.clone(),
                    format!("{name}s"),
                    name.clone(),
                    format!("{name}s"),
                ),
                |definition, (field, (field_type, nullable))| {
                    let mut field = StaticFieldDefinition::new(field.clone(), field, field_type);
                    field.is_nullable = nullable;
                    definition.field(field)
                },
            )
        },
    )
}

/// Valid catalog of up to five relation-free objects
pub fn arb_definitions() -> impl Strategy<Value = Vec<StandardObjectDefinition>> {
    prop::collection::btree_set(arb_name(), 0..5).prop_flat_map(|names: BTreeSet<String>| {
        names
            .into_iter()
            .map(arb_object_definition)
            .collect::<Vec<_>>()
    })
}
