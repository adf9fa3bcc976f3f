//! Standard Schema Factory
//!
//! Turns static definitions into the canonical [`ObjectMetadata`] trees of
//! one workspace. Pure: the same definitions, context and flags always
//! yield the same objects, identifiers included.

use crate::definition::{DynamicFieldDefinition, StandardObjectDefinition, StaticFieldDefinition};
use crate::error::DefinitionError;
use crate::validate::validate_definitions;
use std::collections::HashSet;
use tracing::debug;
use wsync_metadata::{
    FeatureFlagMap, FieldMetadata, FieldType, ObjectId, ObjectMetadata, StandardId,
    WorkspaceSyncContext,
};

/// Canonical standard object plus its unexpanded field templates
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalObject {
    /// Static part of the object
    pub metadata: ObjectMetadata,
    /// Enabled per-custom-object templates, in definition order
    pub templates: Vec<DynamicFieldDefinition>,
}

impl CanonicalObject {
    /// Standard id of the object
    #[inline]
    #[must_use]
    pub fn standard_id(&self) -> Option<StandardId> {
        self.metadata.standard_id
    }

    /// Expand every template once per persisted custom object
    ///
    /// Custom objects are visited in `name_singular` order; objects that
    /// have no row id yet cannot anchor a dynamic field and are skipped.
    #[must_use]
    pub fn expand_templates(&self, custom_objects: &[ObjectMetadata]) -> Vec<FieldMetadata> {
        let Some(object_id) = self.metadata.standard_id else {
            return Vec::new();
        };

        let mut customs: Vec<_> = custom_objects
            .iter()
            .filter(|object| object.is_custom)
            .filter_map(|object| object.id.map(|id| (id, object)))
            .collect();
        customs.sort_by(|(_, a), (_, b)| a.name_singular.cmp(&b.name_singular));

        let mut fields = Vec::new();
        for template in &self.templates {
            let template_id = StandardId::for_field(&self.metadata.name_singular, &template.key);
            for (custom_id, custom) in &customs {
                fields.extend(expand_template(template, template_id, *custom_id, custom));
            }
        }

        debug!(
            object = %self.metadata.name_singular,
            standard_id = %object_id.short(),
            count = fields.len(),
            "expanded dynamic fields"
        );
        fields
    }
}

fn expand_template(
    template: &DynamicFieldDefinition,
    template_id: StandardId,
    custom_id: ObjectId,
    custom: &ObjectMetadata,
) -> Vec<FieldMetadata> {
    let mut relation = FieldMetadata::new(
        custom.name_singular.clone(),
        custom.label_singular.clone(),
        FieldType::Relation,
    )
    .with_standard_id(StandardId::for_dynamic_field(template_id, custom_id))
    .with_relation_target(custom.name_singular.clone());
    relation.description.clone_from(&template.description);
    relation.icon.clone_from(&template.icon);

    if !template.join_column {
        return vec![relation];
    }

    let mut join = FieldMetadata::new(
        format!("{}Id", custom.name_singular),
        format!("{} ID (foreign key)", custom.label_singular),
        FieldType::Uuid,
    )
    .with_standard_id(StandardId::derive(
        "dynamic-join-column",
        &format!("{template_id}:{custom_id}"),
    ));
    join.is_system = true;

    vec![relation, join]
}

/// Builds canonical standard objects for a workspace
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardObjectFactory;

impl StandardObjectFactory {
    /// Create canonical objects from `definitions`
    ///
    /// Validates the full catalog first, then drops objects, fields and
    /// templates whose gate is not enabled in `flags`.
    ///
    /// # Errors
    /// Returns error if the catalog is malformed, or if an enabled relation
    /// field targets an object disabled by `flags`
    pub fn create(
        definitions: &[StandardObjectDefinition],
        context: &WorkspaceSyncContext,
        flags: &FeatureFlagMap,
    ) -> Result<Vec<CanonicalObject>, DefinitionError> {
        validate_definitions(definitions)?;

        let enabled: Vec<_> = definitions
            .iter()
            .filter(|definition| flags.allows(definition.gate))
            .collect();
        let enabled_names: HashSet<&str> = enabled
            .iter()
            .map(|definition| definition.name_singular.as_str())
            .collect();

        let objects = enabled
            .into_iter()
            .map(|definition| build_object(definition, context, flags, &enabled_names))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            workspace_id = %context.workspace_id,
            objects = objects.len(),
            "built canonical standard objects"
        );
        Ok(objects)
    }
}

fn build_object(
    definition: &StandardObjectDefinition,
    context: &WorkspaceSyncContext,
    flags: &FeatureFlagMap,
    enabled_names: &HashSet<&str>,
) -> Result<CanonicalObject, DefinitionError> {
    let mut metadata = ObjectMetadata::new(
        context.workspace_id,
        definition.name_singular.clone(),
        definition.name_plural.clone(),
        definition.label_singular.clone(),
        definition.label_plural.clone(),
    )
    .with_standard_id(definition.standard_id());
    metadata.data_source_id = context.data_source_id;
    metadata.description.clone_from(&definition.description);
    metadata.icon.clone_from(&definition.icon);
    metadata.is_system = definition.is_system;

    for field in definition.static_fields() {
        if !flags.allows(field.gate) {
            continue;
        }
        if let Some(target) = field.relation_target.as_deref() {
            if !enabled_names.contains(target) {
                return Err(DefinitionError::RelationTargetGated {
                    object: definition.name_singular.clone(),
                    field: field.name.clone(),
                    target: target.to_string(),
                });
            }
        }
        metadata.fields.push(build_field(&definition.name_singular, field));
    }

    let templates = definition
        .templates()
        .filter(|template| flags.allows(template.gate))
        .cloned()
        .collect();

    Ok(CanonicalObject {
        metadata,
        templates,
    })
}

fn build_field(object_name: &str, definition: &StaticFieldDefinition) -> FieldMetadata {
    let mut field = FieldMetadata::new(
        definition.name.clone(),
        definition.label.clone(),
        definition.field_type,
    )
    .with_standard_id(StandardId::for_field(object_name, &definition.name))
    .with_nullable(definition.is_nullable);
    field.description.clone_from(&definition.description);
    field.icon.clone_from(&definition.icon);
    field.default_value.clone_from(&definition.default_value);
    field.options.clone_from(&definition.options);
    field.relation_target.clone_from(&definition.relation_target);
    field.is_system = definition.is_system;
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::standard_object_definitions;
    use pretty_assertions::assert_eq;
    use wsync_metadata::{DataSourceId, FeatureFlagKey, WorkspaceId};

    fn context() -> WorkspaceSyncContext {
        WorkspaceSyncContext::new(WorkspaceId::new())
    }

    fn names(objects: &[CanonicalObject]) -> Vec<&str> {
        objects
            .iter()
            .map(|object| object.metadata.name_singular.as_str())
            .collect()
    }

    #[test]
    fn ungated_catalog_without_flags() {
        let objects = StandardObjectFactory::create(
            &standard_object_definitions(),
            &context(),
            &FeatureFlagMap::new(),
        )
        .unwrap();
        assert_eq!(
            names(&objects),
            vec![
                "workspaceMember",
                "company",
                "person",
                "opportunity",
                "activity",
                "activityTarget",
                "attachment",
                "favorite",
            ]
        );
        assert!(objects.iter().all(|object| !object.metadata.is_custom));
        assert!(objects.iter().all(|object| object.metadata.id.is_none()));
    }

    #[test]
    fn flags_enable_gated_objects_and_fields() {
        let flags = FeatureFlagMap::new().with(FeatureFlagKey::IsCalendarEnabled, true);
        let objects =
            StandardObjectFactory::create(&standard_object_definitions(), &context(), &flags)
                .unwrap();
        assert!(names(&objects).contains(&"calendarEvent"));
        assert!(!names(&objects).contains(&"blocklist"));

        let person = objects
            .iter()
            .find(|object| object.metadata.name_singular == "person")
            .unwrap();
        assert!(person.metadata.field_by_name("calendarEventParticipants").is_some());
    }

    #[test]
    fn output_is_deterministic() {
        let ctx = context().with_data_source(DataSourceId::new());
        let flags = FeatureFlagMap::new().with(FeatureFlagKey::IsMessagingEnabled, true);
        let definitions = standard_object_definitions();
        let first = StandardObjectFactory::create(&definitions, &ctx, &flags).unwrap();
        let second = StandardObjectFactory::create(&definitions, &ctx, &flags).unwrap();
        assert_eq!(first, second);
        assert!(first
            .iter()
            .all(|object| object.metadata.data_source_id == ctx.data_source_id));
    }

    #[test]
    fn identity_is_shared_across_workspaces() {
        let definitions = standard_object_definitions();
        let flags = FeatureFlagMap::new();
        let a = StandardObjectFactory::create(&definitions, &context(), &flags).unwrap();
        let b = StandardObjectFactory::create(&definitions, &context(), &flags).unwrap();
        let ids = |objects: &[CanonicalObject]| -> Vec<_> {
            objects.iter().map(CanonicalObject::standard_id).collect()
        };
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn relation_to_gated_off_object_fails() {
        let definitions = vec![
            StandardObjectDefinition::new("contact", "contacts", "Contact", "Contacts")
                .field(StaticFieldDefinition::relation("thread", "Thread", "thread")),
            StandardObjectDefinition::new("thread", "threads", "Thread", "Threads")
                .gated(FeatureFlagKey::IsMessagingEnabled),
        ];
        let result =
            StandardObjectFactory::create(&definitions, &context(), &FeatureFlagMap::new());
        assert!(matches!(
            result,
            Err(DefinitionError::RelationTargetGated { target, .. }) if target == "thread"
        ));
    }

    #[test]
    fn malformed_catalog_fails_fast() {
        let definitions = vec![
            StandardObjectDefinition::new("contact", "contacts", "Contact", "Contacts"),
            StandardObjectDefinition::new("contact", "contactz", "Contact", "Contacts"),
        ];
        let result =
            StandardObjectFactory::create(&definitions, &context(), &FeatureFlagMap::new());
        assert!(result.is_err());
    }

    #[test]
    fn templates_expand_per_custom_object_sorted() {
        let ws = WorkspaceId::new();
        let definitions = vec![
            StandardObjectDefinition::new("favorite", "favorites", "Favorite", "Favorites")
                .per_custom_object(DynamicFieldDefinition::new("custom").with_join_column()),
        ];
        let context = WorkspaceSyncContext::new(ws);
        let objects =
            StandardObjectFactory::create(&definitions, &context, &FeatureFlagMap::new()).unwrap();

        let mut pet = ObjectMetadata::new(ws, "pet", "pets", "Pet", "Pets").custom();
        pet.id = Some(ObjectId::new());
        let mut boat = ObjectMetadata::new(ws, "boat", "boats", "Boat", "Boats").custom();
        boat.id = Some(ObjectId::new());
        let unsaved = ObjectMetadata::new(ws, "car", "cars", "Car", "Cars").custom();

        let fields = objects[0].expand_templates(&[pet.clone(), boat, unsaved]);
        let names: Vec<_> = fields.iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, vec!["boat", "boatId", "pet", "petId"]);
        assert_eq!(fields[2].relation_target.as_deref(), Some("pet"));
        assert!(fields[3].is_system);

        let again = objects[0].expand_templates(&[pet]);
        assert_eq!(again[0].standard_id, fields[2].standard_id);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::BTreeSet;

        fn arb_name() -> impl Strategy<Value = String> {
            "[a-z][a-z0-9]{2,10}"
        }

        /// Objects with distinct names, some of them gated on messaging
        fn arb_catalog() -> impl Strategy<Value = Vec<StandardObjectDefinition>> {
            (
                prop::collection::btree_set(arb_name(), 0..5),
                prop::collection::btree_set(arb_name(), 0..6),
            )
                .prop_flat_map(|(objects, fields)| {
                    let count = objects.len();
                    (
                        Just(objects),
                        Just(fields),
                        prop::collection::vec(any::<bool>(), count),
                    )
                })
                .prop_map(|(objects, fields, gated): (BTreeSet<_>, BTreeSet<_>, Vec<_>)| {
                    objects
                        .into_iter()
                        .zip(gated)
                        .map(|(name, gated)| {
                            let mut definition = StandardObjectDefinition::new(
                                name.clone(),
                                format!("{name}List"),
                                name.clone(),
                                format!("{name}List"),
                            );
                            for field in &fields {
                                definition = definition.field(StaticFieldDefinition::new(
                                    field.clone(),
                                    field.clone(),
                                    FieldType::Text,
                                ));
                            }
                            if gated {
                                definition = definition.gated(FeatureFlagKey::IsMessagingEnabled);
                            }
                            definition
                        })
                        .collect()
                })
        }

        proptest! {
            #[test]
            fn creation_is_deterministic(definitions in arb_catalog(), messaging in any::<bool>()) {
                let ctx = context().with_data_source(DataSourceId::new());
                let flags =
                    FeatureFlagMap::new().with(FeatureFlagKey::IsMessagingEnabled, messaging);
                let first = StandardObjectFactory::create(&definitions, &ctx, &flags).unwrap();
                let second = StandardObjectFactory::create(&definitions, &ctx, &flags).unwrap();
                prop_assert_eq!(first, second);
            }

            #[test]
            fn identities_follow_names_not_workspaces(
                definitions in arb_catalog(),
                messaging in any::<bool>(),
            ) {
                let flags =
                    FeatureFlagMap::new().with(FeatureFlagKey::IsMessagingEnabled, messaging);
                let create = || StandardObjectFactory::create(&definitions, &context(), &flags);
                let left = create().unwrap();
                let right = create().unwrap();

                let expected = definitions
                    .iter()
                    .filter(|definition| messaging || definition.gate.is_none())
                    .count();
                prop_assert_eq!(left.len(), expected);
                prop_assert_eq!(right.len(), expected);

                for (left, right) in left.iter().zip(&right) {
                    let name = left.metadata.name_singular.as_str();
                    prop_assert_ne!(left.metadata.workspace_id, right.metadata.workspace_id);
                    prop_assert_eq!(left.standard_id(), right.standard_id());
                    prop_assert_eq!(left.standard_id(), Some(StandardId::for_object(name)));
                    for (field, other) in left.metadata.fields.iter().zip(&right.metadata.fields) {
                        prop_assert_eq!(
                            field.standard_id,
                            Some(StandardId::for_field(name, &field.name))
                        );
                        prop_assert_eq!(field.standard_id, other.standard_id);
                    }
                }
            }
        }
    }
}
