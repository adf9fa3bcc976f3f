//! Identity Mapper
//!
//! Indexes metadata by a value-typed key so persisted and canonical
//! collections are matched by identity, never by position.

use crate::error::DataIntegrityError;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::fmt::Display;
use std::hash::Hash;
use wsync_metadata::{FieldKey, FieldMetadata, ObjectMetadata, UniqueIdentifier};
use wsync_standard::CanonicalObject;

/// Metadata that can be keyed by identity
pub trait Identified {
    /// Identity type
    type Key: Copy + Eq + Hash + Display;

    /// Identity, if any
    fn identity(&self) -> Option<Self::Key>;

    /// Human-readable name for errors
    fn display_name(&self) -> &str;
}

impl Identified for ObjectMetadata {
    type Key = UniqueIdentifier;

    fn identity(&self) -> Option<UniqueIdentifier> {
        self.unique_identifier()
    }

    fn display_name(&self) -> &str {
        &self.name_singular
    }
}

impl Identified for FieldMetadata {
    type Key = FieldKey;

    fn identity(&self) -> Option<FieldKey> {
        self.unique_identifier()
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Identified for CanonicalObject {
    type Key = UniqueIdentifier;

    fn identity(&self) -> Option<UniqueIdentifier> {
        self.metadata.unique_identifier()
    }

    fn display_name(&self) -> &str {
        &self.metadata.name_singular
    }
}

/// Identity-keyed view preserving input order
pub type IdentityMap<'a, T> = IndexMap<<T as Identified>::Key, &'a T>;

/// Index `items` by identity
///
/// # Errors
/// Returns error if an item has no identity or two items share one
pub fn map_by_identity<'a, T, I>(items: I) -> Result<IdentityMap<'a, T>, DataIntegrityError>
where
    T: Identified + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut map = IndexMap::new();
    for item in items {
        let key = item
            .identity()
            .ok_or_else(|| DataIntegrityError::MissingIdentifier(item.display_name().to_string()))?;
        match map.entry(key) {
            Entry::Occupied(existing) => {
                let existing: &&T = existing.get();
                return Err(DataIntegrityError::DuplicateIdentity {
                    identity: key.to_string(),
                    first: existing.display_name().to_string(),
                    second: item.display_name().to_string(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(item);
            }
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsync_metadata::{FieldType, ObjectId, StandardId, WorkspaceId};

    fn standard(name: &str) -> ObjectMetadata {
        ObjectMetadata::new(WorkspaceId::new(), name, format!("{name}s"), name, name)
            .with_standard_id(StandardId::for_object(name))
    }

    #[test]
    fn keys_by_standard_id_in_input_order() {
        let objects = vec![standard("person"), standard("company")];
        let map = map_by_identity(&objects).unwrap();
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(
            keys,
            vec![
                UniqueIdentifier::Standard(StandardId::for_object("person")),
                UniqueIdentifier::Standard(StandardId::for_object("company")),
            ]
        );
    }

    #[test]
    fn custom_objects_key_by_row_id() {
        let mut pet =
            ObjectMetadata::new(WorkspaceId::new(), "pet", "pets", "Pet", "Pets").custom();
        let id = ObjectId::new();
        pet.id = Some(id);
        let objects = [pet];
        let map = map_by_identity(&objects).unwrap();
        assert!(map.contains_key(&UniqueIdentifier::Custom(id)));
    }

    #[test]
    fn collision_is_integrity_error() {
        let objects = vec![standard("person"), standard("person")];
        assert!(matches!(
            map_by_identity(&objects),
            Err(DataIntegrityError::DuplicateIdentity { .. })
        ));
    }

    #[test]
    fn missing_identity_is_integrity_error() {
        let fields = [FieldMetadata::new("loose", "Loose", FieldType::Text)];
        assert!(matches!(
            map_by_identity(&fields),
            Err(DataIntegrityError::MissingIdentifier(name)) if name == "loose"
        ));
    }

    #[test]
    fn empty_input_maps_to_empty() {
        let objects: Vec<ObjectMetadata> = Vec::new();
        assert!(map_by_identity(&objects).unwrap().is_empty());
    }
}
