//! Entity field descriptors

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a searchable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    Text,
    /// Whole number
    Integer,
    /// Any finite number; integer values are accepted
    Number,
    /// True/false flag
    Boolean,
    /// Point in time, carried as text
    Timestamp,
}

impl FieldType {
    /// Whether `lt`/`gt` are meaningful for this type
    pub fn is_ordered(&self) -> bool {
        !matches!(self, Self::Boolean)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// A field of a searchable entity.
///
/// Usually generated with [`search_fields!`](crate::search_fields).
pub trait EntityField: Copy + fmt::Debug + Send + Sync + 'static {
    /// Name the remote service knows the field by
    fn name(&self) -> &'static str;

    /// Declared type, used to reject mismatched filter values
    fn field_type(&self) -> FieldType;
}

/// An entity that can be returned from an advanced search.
pub trait Searchable: DeserializeOwned {
    /// Fields that may appear in filters and sort orders
    type Field: EntityField;
}

/// Declare a field enum for a searchable entity.
///
/// ```
/// use portico_core::query::{EntityField, FieldType};
///
/// portico_core::search_fields! {
///     /// Fields of an account
///     pub enum AccountField {
///         Status => "status": Text,
///         Balance => "balance": Number,
///     }
/// }
///
/// assert_eq!(AccountField::Balance.name(), "balance");
/// assert_eq!(AccountField::Status.field_type(), FieldType::Text);
/// ```
#[macro_export]
macro_rules! search_fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal : $ty:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::query::EntityField for $name {
            fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant => $wire ),+
                }
            }

            fn field_type(&self) -> $crate::query::FieldType {
                match self {
                    $( Self::$variant => $crate::query::FieldType::$ty ),+
                }
            }
        }
    };
}
