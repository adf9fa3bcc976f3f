//! Change-Set Accumulator
//!
//! An explicit value threaded through one reconciliation run. Every
//! collection is keyed by identity and keeps discovery order; adding the
//! same identity twice replaces the entry (update patches are merged).

use crate::error::DataIntegrityError;
use crate::identity::Identified;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use wsync_metadata::{
    FieldKey, FieldMetadata, FieldPatch, ObjectMetadata, ObjectPatch, UniqueIdentifier,
};

/// Pending object and field operations of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceSyncStorage {
    objects_to_create: IndexMap<UniqueIdentifier, ObjectMetadata>,
    objects_to_update: IndexMap<UniqueIdentifier, ObjectPatch>,
    objects_to_delete: IndexMap<UniqueIdentifier, ObjectMetadata>,
    fields_to_create: IndexMap<FieldKey, FieldMetadata>,
    fields_to_update: IndexMap<FieldKey, FieldPatch>,
    fields_to_delete: IndexMap<FieldKey, FieldMetadata>,
}

fn key_of<T: Identified>(item: &T) -> Result<T::Key, DataIntegrityError> {
    item.identity()
        .ok_or_else(|| DataIntegrityError::MissingIdentifier(item.display_name().to_string()))
}

impl WorkspaceSyncStorage {
    /// Create empty change-set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an object creation
    ///
    /// # Errors
    /// Returns error if the object has no identity
    pub fn add_create_object(&mut self, object: ObjectMetadata) -> Result<(), DataIntegrityError> {
        let key = key_of(&object)?;
        self.objects_to_delete.shift_remove(&key);
        self.objects_to_create.insert(key, object);
        Ok(())
    }

    /// Queue an object update, merging with an earlier patch for the same row
    pub fn add_update_object(&mut self, patch: ObjectPatch) {
        let key = patch.unique_identifier();
        match self.objects_to_update.get_mut(&key) {
            Some(existing) => existing.merge(patch),
            None => {
                self.objects_to_update.insert(key, patch);
            }
        }
    }

    /// Queue an object deletion
    ///
    /// # Errors
    /// Returns error if the object has no identity
    pub fn add_delete_object(&mut self, object: ObjectMetadata) -> Result<(), DataIntegrityError> {
        let key = key_of(&object)?;
        self.objects_to_create.shift_remove(&key);
        self.objects_to_delete.insert(key, object);
        Ok(())
    }

    /// Queue a field creation
    ///
    /// # Errors
    /// Returns error if the field has no identity
    pub fn add_create_field(&mut self, field: FieldMetadata) -> Result<(), DataIntegrityError> {
        let key = key_of(&field)?;
        self.fields_to_delete.shift_remove(&key);
        self.fields_to_create.insert(key, field);
        Ok(())
    }

    /// Queue a field update, merging with an earlier patch for the same row
    pub fn add_update_field(&mut self, patch: FieldPatch) {
        let key = patch.key();
        match self.fields_to_update.get_mut(&key) {
            Some(existing) => existing.merge(patch),
            None => {
                self.fields_to_update.insert(key, patch);
            }
        }
    }

    /// Queue a field deletion
    ///
    /// # Errors
    /// Returns error if the field has no identity
    pub fn add_delete_field(&mut self, field: FieldMetadata) -> Result<(), DataIntegrityError> {
        let key = key_of(&field)?;
        self.fields_to_create.shift_remove(&key);
        self.fields_to_delete.insert(key, field);
        Ok(())
    }

    /// Fold another change-set into this one, entry by entry
    ///
    /// # Errors
    /// Returns error if an entry of `other` has no identity
    pub fn merge(&mut self, other: Self) -> Result<(), DataIntegrityError> {
        for object in other.objects_to_create.into_values() {
            self.add_create_object(object)?;
        }
        for patch in other.objects_to_update.into_values() {
            self.add_update_object(patch);
        }
        for object in other.objects_to_delete.into_values() {
            self.add_delete_object(object)?;
        }
        for field in other.fields_to_create.into_values() {
            self.add_create_field(field)?;
        }
        for patch in other.fields_to_update.into_values() {
            self.add_update_field(patch);
        }
        for field in other.fields_to_delete.into_values() {
            self.add_delete_field(field)?;
        }
        Ok(())
    }

    /// Objects to create, in discovery order
    pub fn objects_to_create(&self) -> impl ExactSizeIterator<Item = &ObjectMetadata> + '_ {
        self.objects_to_create.values()
    }

    /// Object patches, in discovery order
    pub fn objects_to_update(&self) -> impl ExactSizeIterator<Item = &ObjectPatch> + '_ {
        self.objects_to_update.values()
    }

    /// Objects to delete, in discovery order
    pub fn objects_to_delete(&self) -> impl ExactSizeIterator<Item = &ObjectMetadata> + '_ {
        self.objects_to_delete.values()
    }

    /// Fields to create, in discovery order
    pub fn fields_to_create(&self) -> impl ExactSizeIterator<Item = &FieldMetadata> + '_ {
        self.fields_to_create.values()
    }

    /// Field patches, in discovery order
    pub fn fields_to_update(&self) -> impl ExactSizeIterator<Item = &FieldPatch> + '_ {
        self.fields_to_update.values()
    }

    /// Fields to delete, in discovery order
    pub fn fields_to_delete(&self) -> impl ExactSizeIterator<Item = &FieldMetadata> + '_ {
        self.fields_to_delete.values()
    }

    /// Whether nothing was accumulated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summary().is_empty()
    }

    /// Counts per collection
    #[must_use]
    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary {
            objects_created: self.objects_to_create.len(),
            objects_updated: self.objects_to_update.len(),
            objects_deleted: self.objects_to_delete.len(),
            fields_created: self.fields_to_create.len(),
            fields_updated: self.fields_to_update.len(),
            fields_deleted: self.fields_to_delete.len(),
        }
    }
}

/// Counts of the six change-set collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub objects_created: usize,
    pub objects_updated: usize,
    pub objects_deleted: usize,
    pub fields_created: usize,
    pub fields_updated: usize,
    pub fields_deleted: usize,
}

impl ChangeSummary {
    /// Whether every count is zero
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Sum of all counts
    #[must_use]
    pub const fn total(&self) -> usize {
        self.objects_created
            + self.objects_updated
            + self.objects_deleted
            + self.fields_created
            + self.fields_updated
            + self.fields_deleted
    }
}

impl Display for ChangeSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "objects +{} ~{} -{}, fields +{} ~{} -{}",
            self.objects_created,
            self.objects_updated,
            self.objects_deleted,
            self.fields_created,
            self.fields_updated,
            self.fields_deleted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wsync_metadata::{
        FieldChange, FieldId, FieldType, ObjectChange, ObjectId, StandardId, WorkspaceId,
    };

    fn object(name: &str) -> ObjectMetadata {
        ObjectMetadata::new(WorkspaceId::new(), name, format!("{name}s"), name, name)
            .with_standard_id(StandardId::for_object(name))
    }

    fn field(name: &str) -> FieldMetadata {
        FieldMetadata::new(name, name, FieldType::Text)
            .with_standard_id(StandardId::for_field("contact", name))
    }

    #[test]
    fn same_identity_replaces_instead_of_duplicating() {
        let mut storage = WorkspaceSyncStorage::new();
        storage.add_create_object(object("contact")).unwrap();
        let mut again = object("contact");
        again.label_plural = "People".into();
        storage.add_create_object(again).unwrap();

        assert_eq!(storage.objects_to_create().len(), 1);
        assert_eq!(storage.objects_to_create().next().unwrap().label_plural, "People");
    }

    #[test]
    fn update_patches_merge_last_write_wins() {
        let id = ObjectId::new();
        let standard_id = Some(StandardId::for_object("contact"));
        let mut storage = WorkspaceSyncStorage::new();
        storage.add_update_object(ObjectPatch {
            id,
            standard_id,
            changes: vec![
                ObjectChange::LabelSingular("A".into()),
                ObjectChange::Icon(Some("IconA".into())),
            ],
        });
        storage.add_update_object(ObjectPatch {
            id,
            standard_id,
            changes: vec![ObjectChange::LabelSingular("B".into())],
        });

        let patches: Vec<_> = storage.objects_to_update().collect();
        assert_eq!(patches.len(), 1);
        assert_eq!(
            patches[0].changes,
            vec![
                ObjectChange::LabelSingular("B".into()),
                ObjectChange::Icon(Some("IconA".into())),
            ]
        );
    }

    #[test]
    fn create_and_delete_are_mutually_exclusive() {
        let mut storage = WorkspaceSyncStorage::new();
        storage.add_create_field(field("email")).unwrap();
        storage.add_delete_field(field("email")).unwrap();
        assert_eq!(storage.fields_to_create().len(), 0);
        assert_eq!(storage.fields_to_delete().len(), 1);

        storage.add_create_object(object("contact")).unwrap();
        storage.add_delete_object(object("contact")).unwrap();
        storage.add_create_object(object("contact")).unwrap();
        assert_eq!(storage.objects_to_delete().len(), 0);
        assert_eq!(storage.objects_to_create().len(), 1);
    }

    #[test]
    fn discovery_order_is_kept() {
        let mut storage = WorkspaceSyncStorage::new();
        for name in ["person", "company", "opportunity"] {
            storage.add_create_object(object(name)).unwrap();
        }
        let names: Vec<_> = storage
            .objects_to_create()
            .map(|object| object.name_singular.as_str())
            .collect();
        assert_eq!(names, vec!["person", "company", "opportunity"]);
    }

    #[test]
    fn identityless_entries_are_rejected() {
        let mut storage = WorkspaceSyncStorage::new();
        let loose = FieldMetadata::new("loose", "Loose", FieldType::Text);
        assert!(storage.add_create_field(loose).is_err());
        assert!(storage.is_empty());
    }

    #[test]
    fn merge_folds_entry_by_entry() {
        let field_id = FieldId::new();
        let owner = ObjectId::new();
        let standard_id = Some(StandardId::for_field("contact", "name"));

        let mut run = WorkspaceSyncStorage::new();
        run.add_create_object(object("person")).unwrap();
        run.add_update_field(FieldPatch {
            id: field_id,
            object_metadata_id: owner,
            standard_id,
            changes: vec![FieldChange::Label("Name".into())],
        });

        let mut partial = WorkspaceSyncStorage::new();
        partial.add_create_object(object("company")).unwrap();
        partial.add_update_field(FieldPatch {
            id: field_id,
            object_metadata_id: owner,
            standard_id,
            changes: vec![FieldChange::IsNullable(false)],
        });
        run.merge(partial).unwrap();

        assert_eq!(
            run.summary(),
            ChangeSummary {
                objects_created: 2,
                fields_updated: 1,
                ..ChangeSummary::default()
            }
        );
        let patch = run.fields_to_update().next().unwrap();
        assert_eq!(
            patch.changes,
            vec![FieldChange::Label("Name".into()), FieldChange::IsNullable(false)]
        );
        assert_eq!(run.summary().to_string(), "objects +2 ~0 -0, fields +0 ~1 -0");
    }
}
