//! Identity primitives
//!
//! Persisted rows are addressed by random [`ObjectId`] / [`FieldId`] values
//! minted at write time. Standard schema elements additionally carry a
//! [`StandardId`] derived from their static definition, which is what the
//! reconciliation compares on.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID
            #[inline]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Underlying UUID
            #[inline]
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_newtype!(
    /// Tenant identifier
    WorkspaceId
);
uuid_newtype!(
    /// Persisted object metadata row identifier
    ObjectId
);
uuid_newtype!(
    /// Persisted field metadata row identifier
    FieldId
);
uuid_newtype!(
    /// Data source (physical schema) the workspace objects live in
    DataSourceId
);

/// Stable identifier of a standard schema element
///
/// Derived from the static definition (never generated per workspace), so
/// the same standard object maps to the same identifier in every workspace
/// and across releases, even when its names change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StandardId(Uuid);

impl StandardId {
    /// Derive identifier from a namespaced seed
    ///
    /// Blake3 of `namespace:seed`, truncated to 16 bytes.
    #[must_use]
    pub fn derive(namespace: &str, seed: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(namespace.as_bytes());
        hasher.update(b":");
        hasher.update(seed.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest.as_bytes()[..16]);
        Self(Uuid::from_bytes(bytes))
    }

    /// Identifier of a standard object, keyed by its definition name
    #[inline]
    #[must_use]
    pub fn for_object(name_singular: &str) -> Self {
        Self::derive("standard-object", name_singular)
    }

    /// Identifier of a standard field within a standard object
    #[inline]
    #[must_use]
    pub fn for_field(object_name_singular: &str, field_name: &str) -> Self {
        Self::derive(
            "standard-field",
            &format!("{object_name_singular}.{field_name}"),
        )
    }

    /// Identifier of a field expanded from a per-custom-object template
    #[inline]
    #[must_use]
    pub fn for_dynamic_field(template: StandardId, custom_object: ObjectId) -> Self {
        Self::derive("dynamic-field", &format!("{template}:{custom_object}"))
    }

    /// Wrap an existing UUID (e.g. read back from storage)
    #[inline]
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Raw bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Short hex form for logs (first 8 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0.as_bytes()[..4])
    }
}

impl Display for StandardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StandardId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Key used to match persisted metadata against canonical metadata
///
/// Standard elements are keyed by their [`StandardId`]; custom objects that
/// never had one are keyed by their persisted row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum UniqueIdentifier {
    /// Keyed by standard id
    Standard(StandardId),
    /// Custom object without standard id
    Custom(ObjectId),
}

impl Display for UniqueIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(id) => write!(f, "standard:{id}"),
            Self::Custom(id) => write!(f, "custom:{id}"),
        }
    }
}

/// Identifier parsing errors
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Not a UUID
    #[error("invalid identifier: {0}")]
    Invalid(#[from] uuid::Error),
}
