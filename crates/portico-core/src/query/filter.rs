//! Filter predicates

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::fields::{EntityField, FieldType};
use crate::errors::{PorticoError, Result};

/// Comparison applied by the remote to a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Exact match
    Eq,
    /// Strictly less than
    Lt,
    /// Strictly greater than
    Gt,
    /// Member of the supplied list
    In,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Eq => "eq",
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::In => "in",
        };
        f.write_str(name)
    }
}

/// How the filters of a query combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    /// Every filter must hold
    And,
    /// At least one filter must hold
    Or,
}

/// Value compared against a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean scalar
    Boolean(bool),
    /// Integer scalar
    Integer(i64),
    /// Floating-point scalar
    Number(f64),
    /// Text scalar (also used for timestamps)
    Text(String),
    /// List of scalars, only valid with `in`
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Whether this is a list
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Whether this scalar can be compared against a field of type `ty`.
    fn scalar_matches(&self, ty: FieldType) -> bool {
        match (self, ty) {
            (Self::Text(_), FieldType::Text | FieldType::Timestamp) => true,
            (Self::Integer(_), FieldType::Integer | FieldType::Number) => true,
            (Self::Number(n), FieldType::Number) => n.is_finite(),
            (Self::Boolean(_), FieldType::Boolean) => true,
            _ => false,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::List(_) => "list",
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

macro_rules! integer_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FilterValue {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

integer_value!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// A single field/operator/value predicate.
///
/// Construction checks the value against the field's declared type, so a
/// `Filter` that exists is always well-formed.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<F> {
    field: F,
    operator: FilterOperator,
    value: FilterValue,
}

impl<F: EntityField> Filter<F> {
    /// Build a filter, validating `value` against `field`.
    pub fn new(field: F, operator: FilterOperator, value: impl Into<FilterValue>) -> Result<Self> {
        let value = value.into();
        let ty = field.field_type();
        let mismatch = |found: &FilterValue| {
            PorticoError::validation(format!(
                "Filter on '{}' ({ty}) cannot use {operator} with a {} value",
                field.name(),
                found.type_name()
            ))
        };

        match (operator, &value) {
            (FilterOperator::In, FilterValue::List(items)) => {
                if let Some(bad) = items.iter().find(|item| !item.scalar_matches(ty)) {
                    return Err(mismatch(bad));
                }
            }
            (FilterOperator::In, other) => return Err(mismatch(other)),
            (FilterOperator::Lt | FilterOperator::Gt, _) if !ty.is_ordered() => {
                return Err(PorticoError::validation(format!(
                    "Field '{}' ({ty}) is not ordered; {operator} is not allowed",
                    field.name()
                )));
            }
            (_, scalar) => {
                if !scalar.scalar_matches(ty) {
                    return Err(mismatch(scalar));
                }
            }
        }

        Ok(Self {
            field,
            operator,
            value,
        })
    }

    /// `field == value`
    pub fn eq(field: F, value: impl Into<FilterValue>) -> Result<Self> {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// `field < value`
    pub fn lt(field: F, value: impl Into<FilterValue>) -> Result<Self> {
        Self::new(field, FilterOperator::Lt, value)
    }

    /// `field > value`
    pub fn gt(field: F, value: impl Into<FilterValue>) -> Result<Self> {
        Self::new(field, FilterOperator::Gt, value)
    }

    /// `field ∈ values`
    pub fn is_in<V: Into<FilterValue>>(
        field: F,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self> {
        let list = FilterValue::List(values.into_iter().map(Into::into).collect());
        Self::new(field, FilterOperator::In, list)
    }

    /// Field being filtered
    pub fn field(&self) -> F {
        self.field
    }

    /// Comparison operator
    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    /// Comparison value
    pub fn value(&self) -> &FilterValue {
        &self.value
    }
}

impl<F: EntityField> Serialize for Filter<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Filter", 3)?;
        state.serialize_field("field", self.field.name())?;
        state.serialize_field("operator", &self.operator)?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}
