//! Field comparator
//!
//! Runs only for objects matched as NOOP or UPDATE. Custom fields present
//! on the persisted side are workspace-owned and never deleted.

use crate::error::DataIntegrityError;
use crate::identity::map_by_identity;
use wsync_metadata::{FieldMetadata, FieldPatch, ObjectMetadata};

/// Decision for one field identity
#[derive(Debug, Clone, PartialEq)]
pub enum FieldComparatorResult {
    /// Field missing from the persisted object
    Create(FieldMetadata),
    /// Tracked attributes differ
    Update(FieldPatch),
    /// Persisted standard field no longer defined
    Delete(FieldMetadata),
}

/// Compares the field sets of two matched objects
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldComparator;

impl FieldComparator {
    /// Diff fields by identity
    ///
    /// Creates and updates come first in target order, then deletes in
    /// persisted order. Identical fields emit nothing.
    ///
    /// # Errors
    /// Returns error on duplicate or missing field identities, or if a
    /// matched field flipped between custom and standard
    pub fn compare(
        persisted: &ObjectMetadata,
        target: &ObjectMetadata,
    ) -> Result<Vec<FieldComparatorResult>, DataIntegrityError> {
        let persisted_fields = map_by_identity(&persisted.fields)?;
        let target_fields = map_by_identity(&target.fields)?;
        let mut results = Vec::new();

        for (key, wanted) in &target_fields {
            let Some(existing) = persisted_fields.get(key) else {
                results.push(FieldComparatorResult::Create((*wanted).clone()));
                continue;
            };
            if existing.is_custom != wanted.is_custom {
                return Err(DataIntegrityError::FieldClassificationMismatch {
                    object: persisted.name_singular.clone(),
                    field: existing.name.clone(),
                    persisted: existing.is_custom,
                    target: wanted.is_custom,
                });
            }
            if let Some(patch) = FieldPatch::diff(existing, wanted)? {
                results.push(FieldComparatorResult::Update(patch));
            }
        }

        for (key, existing) in &persisted_fields {
            if existing.is_custom || target_fields.contains_key(key) {
                continue;
            }
            results.push(FieldComparatorResult::Delete((*existing).clone()));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wsync_metadata::{FieldChange, FieldId, FieldType, ObjectId, StandardId, WorkspaceId};

    fn standard_field(name: &str, field_type: FieldType) -> FieldMetadata {
        FieldMetadata::new(name, name, field_type)
            .with_standard_id(StandardId::for_field("contact", name))
    }

    fn contact(fields: Vec<FieldMetadata>) -> ObjectMetadata {
        let mut object =
            ObjectMetadata::new(WorkspaceId::new(), "contact", "contacts", "Contact", "Contacts")
                .with_standard_id(StandardId::for_object("contact"));
        object.fields = fields;
        object
    }

    fn persist(mut object: ObjectMetadata) -> ObjectMetadata {
        let id = ObjectId::new();
        object.id = Some(id);
        for field in &mut object.fields {
            field.id.get_or_insert_with(FieldId::new);
            field.object_metadata_id = Some(id);
        }
        object
    }

    #[test]
    fn identical_fields_emit_nothing() {
        let target = contact(vec![
            standard_field("name", FieldType::Text),
            standard_field("email", FieldType::Email),
        ]);
        let persisted = persist(target.clone());
        assert!(FieldComparator::compare(&persisted, &target).unwrap().is_empty());
    }

    #[test]
    fn create_update_delete_in_order() {
        let persisted = persist(contact(vec![
            standard_field("legacy", FieldType::Text),
            standard_field("name", FieldType::Text),
        ]));
        let target = contact(vec![
            standard_field("email", FieldType::Email),
            standard_field("name", FieldType::FullName),
        ]);

        let results = FieldComparator::compare(&persisted, &target).unwrap();
        assert_eq!(results.len(), 3);
        assert!(matches!(&results[0], FieldComparatorResult::Create(f) if f.name == "email"));
        let FieldComparatorResult::Update(patch) = &results[1] else {
            panic!("expected update");
        };
        assert_eq!(patch.changes, vec![FieldChange::Type(FieldType::FullName)]);
        assert!(matches!(&results[2], FieldComparatorResult::Delete(f) if f.name == "legacy"));
    }

    #[test]
    fn custom_fields_are_never_deleted() {
        let mut tier = FieldMetadata::new("loyaltyTier", "Loyalty Tier", FieldType::Text).custom();
        tier.id = Some(FieldId::new());
        let persisted = persist(contact(vec![standard_field("name", FieldType::Text), tier]));
        let target = contact(vec![standard_field("name", FieldType::Text)]);

        let results = FieldComparator::compare(&persisted, &target).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn classification_flip_is_integrity_error() {
        let mut persisted_field = standard_field("name", FieldType::Text).custom();
        persisted_field.id = Some(FieldId::new());
        let persisted = persist(contact(vec![persisted_field]));
        let target = contact(vec![standard_field("name", FieldType::Text)]);

        assert!(matches!(
            FieldComparator::compare(&persisted, &target),
            Err(DataIntegrityError::FieldClassificationMismatch { .. })
        ));
    }

    #[test]
    fn duplicate_target_identity_is_integrity_error() {
        let persisted = persist(contact(Vec::new()));
        let target = contact(vec![
            standard_field("name", FieldType::Text),
            standard_field("name", FieldType::Text),
        ]);
        assert!(matches!(
            FieldComparator::compare(&persisted, &target),
            Err(DataIntegrityError::DuplicateIdentity { .. })
        ));
    }
}
