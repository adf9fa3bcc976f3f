//! Catalog validation
//!
//! Runs over the full catalog regardless of feature flags, so a defect in
//! a gated object is caught even where the flag is off.

use crate::definition::{StandardFieldDefinition, StandardObjectDefinition};
use crate::error::DefinitionError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use wsync_metadata::{FieldType, StandardId};

/// Maximum length of object and field names
pub const MAX_NAME_LEN: usize = 63;

static CAMEL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-zA-Z0-9]*$").expect("camelCase pattern compiles"));

/// Check a name against the naming rules (lowerCamelCase, bounded length)
///
/// # Errors
/// Returns error describing the first violated rule
pub fn validate_name(name: &str) -> Result<(), DefinitionError> {
    if name.is_empty() {
        return Err(DefinitionError::invalid_name(name, "empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(DefinitionError::invalid_name(
            name,
            format!("longer than {MAX_NAME_LEN} characters"),
        ));
    }
    if !CAMEL_CASE.is_match(name) {
        return Err(DefinitionError::invalid_name(name, "must be lowerCamelCase"));
    }
    Ok(())
}

/// Validate a whole catalog
///
/// # Errors
/// Returns the first defect found, in catalog order
pub fn validate_definitions(
    definitions: &[StandardObjectDefinition],
) -> Result<(), DefinitionError> {
    let object_names: HashSet<&str> = definitions
        .iter()
        .map(|definition| definition.name_singular.as_str())
        .collect();

    let mut seen_objects = HashSet::new();
    let mut seen_ids: HashSet<StandardId> = HashSet::new();

    for definition in definitions {
        validate_object(definition)?;

        if !seen_objects.insert(definition.name_singular.as_str()) {
            return Err(DefinitionError::DuplicateObject(
                definition.name_singular.clone(),
            ));
        }
        if !seen_ids.insert(definition.standard_id()) {
            return Err(DefinitionError::DuplicateStandardId(
                definition.name_singular.clone(),
            ));
        }

        let mut seen_fields = HashSet::new();
        for field in &definition.fields {
            validate_name(field.name())?;
            if !seen_fields.insert(field.name()) {
                return Err(DefinitionError::DuplicateField {
                    object: definition.name_singular.clone(),
                    field: field.name().to_string(),
                });
            }

            let field_id = StandardId::for_field(&definition.name_singular, field.name());
            if !seen_ids.insert(field_id) {
                return Err(DefinitionError::DuplicateStandardId(format!(
                    "{}.{}",
                    definition.name_singular,
                    field.name()
                )));
            }

            if let StandardFieldDefinition::Static(field) = field {
                validate_relation(
                    &definition.name_singular,
                    &field.name,
                    field.field_type,
                    field.relation_target.as_deref(),
                    &object_names,
                )?;
            }
        }
    }

    Ok(())
}

fn validate_object(definition: &StandardObjectDefinition) -> Result<(), DefinitionError> {
    validate_name(&definition.name_singular)?;
    validate_name(&definition.name_plural)?;
    if definition.name_singular == definition.name_plural {
        return Err(DefinitionError::invalid_name(
            &definition.name_singular,
            "singular and plural names must differ",
        ));
    }
    Ok(())
}

fn validate_relation(
    object: &str,
    field: &str,
    field_type: FieldType,
    target: Option<&str>,
    object_names: &HashSet<&str>,
) -> Result<(), DefinitionError> {
    match (field_type, target) {
        (FieldType::Relation, None) => Err(DefinitionError::MissingRelationTarget {
            object: object.to_string(),
            field: field.to_string(),
        }),
        (FieldType::Relation, Some(target)) if !object_names.contains(target) => {
            Err(DefinitionError::UnknownRelationTarget {
                object: object.to_string(),
                field: field.to_string(),
                target: target.to_string(),
            })
        }
        (FieldType::Relation, Some(_)) | (_, None) => Ok(()),
        (_, Some(_)) => Err(DefinitionError::UnexpectedRelationTarget {
            object: object.to_string(),
            field: field.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::standard_object_definitions;
    use crate::definition::{DynamicFieldDefinition, StaticFieldDefinition};

    fn object(name: &str, plural: &str) -> StandardObjectDefinition {
        StandardObjectDefinition::new(name, plural, "L", "Ls")
    }

    #[test]
    fn builtin_catalog_is_valid() {
        validate_definitions(&standard_object_definitions()).unwrap();
    }

    #[test]
    fn empty_catalog_is_valid() {
        validate_definitions(&[]).unwrap();
    }

    #[test]
    fn rejects_duplicate_object() {
        let defs = vec![object("contact", "contacts"), object("contact", "contactz")];
        assert!(matches!(
            validate_definitions(&defs),
            Err(DefinitionError::DuplicateObject(name)) if name == "contact"
        ));
    }

    #[test]
    fn rejects_duplicate_field_including_templates() {
        let defs = vec![object("contact", "contacts")
            .field(StaticFieldDefinition::new("custom", "C", FieldType::Text))
            .per_custom_object(DynamicFieldDefinition::new("custom"))];
        assert!(matches!(
            validate_definitions(&defs),
            Err(DefinitionError::DuplicateField { .. })
        ));
    }

    #[test]
    fn rejects_relation_to_unknown_object() {
        let defs = vec![object("contact", "contacts")
            .field(StaticFieldDefinition::relation("company", "Company", "company"))];
        assert!(matches!(
            validate_definitions(&defs),
            Err(DefinitionError::UnknownRelationTarget { target, .. }) if target == "company"
        ));
    }

    #[test]
    fn rejects_relation_without_target() {
        let defs = vec![object("contact", "contacts")
            .field(StaticFieldDefinition::new("company", "Company", FieldType::Relation))];
        assert!(matches!(
            validate_definitions(&defs),
            Err(DefinitionError::MissingRelationTarget { .. })
        ));
    }

    #[test]
    fn rejects_target_on_plain_field() {
        let mut field = StaticFieldDefinition::new("company", "Company", FieldType::Text);
        field.relation_target = Some("contact".to_string());
        let defs = vec![object("contact", "contacts").field(field)];
        assert!(matches!(
            validate_definitions(&defs),
            Err(DefinitionError::UnexpectedRelationTarget { .. })
        ));
    }

    #[test]
    fn rejects_bad_names() {
        assert!(validate_name("Contact").is_err());
        assert!(validate_name("contact_name").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(validate_name("contactName2").is_ok());

        let defs = vec![object("sheep", "sheep")];
        assert!(matches!(
            validate_definitions(&defs),
            Err(DefinitionError::InvalidName { .. })
        ));
    }
}
