use chrono::{DateTime, Utc};

use super::errors::{FieldViolation, ProductError};

pub const NAME_MAX_CHARS: usize = 255;
/// Largest value a DECIMAL(10,2) column holds.
pub const PRICE_MAX: f64 = 99_999_999.99;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock_quantity: i32,
    pub created_datetime: DateTime<Utc>,
}

/// The editable fields shared by interactive creation, edition and CSV import.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductProps {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock_quantity: i32,
}

/// A validated product that has not been assigned an id by the store yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock_quantity: i32,
    pub created_datetime: DateTime<Utc>,
}

/// Rounds to the two decimals the store keeps.
pub fn round_to_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// Checks every rule and returns all violations at once, in field order.
/// Price bounds apply to the value as stored, rounded to cents.
pub fn validate(props: &ProductProps) -> Result<(), Vec<FieldViolation>> {
    let mut violations = Vec::new();

    if props.name.trim().is_empty() {
        violations.push(FieldViolation::NameBlank);
    } else if props.name.chars().count() > NAME_MAX_CHARS {
        violations.push(FieldViolation::NameTooLong);
    }

    if props.description.trim().is_empty() {
        violations.push(FieldViolation::DescriptionBlank);
    }

    if !props.price.is_finite() {
        violations.push(FieldViolation::PriceInvalid);
    } else if round_to_cents(props.price) <= 0.0 {
        violations.push(FieldViolation::PriceNotPositive);
    } else if round_to_cents(props.price) > PRICE_MAX {
        violations.push(FieldViolation::PriceOutOfRange);
    }

    if props.stock_quantity < 0 {
        violations.push(FieldViolation::StockNegative);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl NewProduct {
    /// Validates the props and stamps the creation time with the current clock.
    pub fn new(props: ProductProps) -> Result<Self, ProductError> {
        validate(&props)?;

        Ok(Self {
            name: props.name,
            description: props.description,
            price: round_to_cents(props.price),
            stock_quantity: props.stock_quantity,
            created_datetime: Utc::now(),
        })
    }
}

impl Product {
    /// Constructor for data already persisted in the repository (no validation).
    pub fn from_repository(
        id: i64,
        name: String,
        description: String,
        price: f64,
        stock_quantity: i32,
        created_datetime: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            price,
            stock_quantity,
            created_datetime,
        }
    }

    /// Returns an edited copy. Identifier and creation time never change.
    pub fn apply(&self, props: ProductProps) -> Result<Self, ProductError> {
        validate(&props)?;

        Ok(Self {
            id: self.id,
            name: props.name,
            description: props.description,
            price: round_to_cents(props.price),
            stock_quantity: props.stock_quantity,
            created_datetime: self.created_datetime,
        })
    }
}
