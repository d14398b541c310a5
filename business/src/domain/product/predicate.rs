use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use strum_macros::{AsRefStr, Display, EnumString};

use super::model::Product;

/// Product columns that may be filtered or sorted on.
///
/// This is the sort allow-list: parsing anything else fails, and callers
/// fall back to [`ProductField::Id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "camelCase")]
pub enum ProductField {
    #[default]
    Id,
    Name,
    Description,
    Price,
    StockQuantity,
    CreatedDatetime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `"desc"` in any case selects descending order; everything else is ascending.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// A single filter condition. A list of predicates is combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals {
        field: ProductField,
        value: Value,
    },
    /// Inclusive on both ends; a missing bound is unconstrained.
    Range {
        field: ProductField,
        min: Option<Value>,
        max: Option<Value>,
    },
    /// Case-sensitive containment.
    Substring {
        field: ProductField,
        needle: String,
    },
    Or(Vec<Predicate>),
}

fn field_value(product: &Product, field: ProductField) -> Value {
    match field {
        ProductField::Id => Value::Int(product.id),
        ProductField::Name => Value::Text(product.name.clone()),
        ProductField::Description => Value::Text(product.description.clone()),
        ProductField::Price => Value::Float(product.price),
        ProductField::StockQuantity => Value::Int(i64::from(product.stock_quantity)),
        ProductField::CreatedDatetime => Value::Timestamp(product.created_datetime),
    }
}

impl Predicate {
    /// In-memory evaluation, mirroring what the store adapter compiles to SQL.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Predicate::Equals { field, value } => {
                field_value(product, *field).compare(value) == Some(Ordering::Equal)
            }
            Predicate::Range { field, min, max } => {
                let actual = field_value(product, *field);
                let above_min = min.as_ref().is_none_or(|min| {
                    matches!(
                        actual.compare(min),
                        Some(Ordering::Greater | Ordering::Equal)
                    )
                });
                let below_max = max.as_ref().is_none_or(|max| {
                    matches!(actual.compare(max), Some(Ordering::Less | Ordering::Equal))
                });
                above_min && below_max
            }
            Predicate::Substring { field, needle } => match field_value(product, *field) {
                Value::Text(text) => text.contains(needle.as_str()),
                _ => false,
            },
            Predicate::Or(alternatives) => alternatives.iter().any(|p| p.matches(product)),
        }
    }
}

/// True when the product satisfies every predicate in the list.
pub fn matches_all(predicates: &[Predicate], product: &Product) -> bool {
    predicates.iter().all(|p| p.matches(product))
}
