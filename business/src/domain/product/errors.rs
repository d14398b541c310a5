/// A single business rule broken by a product's editable fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldViolation {
    #[error("product.name_blank")]
    NameBlank,
    #[error("product.name_too_long")]
    NameTooLong,
    #[error("product.description_blank")]
    DescriptionBlank,
    #[error("product.price_invalid")]
    PriceInvalid,
    #[error("product.price_not_positive")]
    PriceNotPositive,
    #[error("product.price_out_of_range")]
    PriceOutOfRange,
    #[error("product.stock_negative")]
    StockNegative,
}

impl FieldViolation {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            FieldViolation::NameBlank | FieldViolation::NameTooLong => "name",
            FieldViolation::DescriptionBlank => "description",
            FieldViolation::PriceInvalid
            | FieldViolation::PriceNotPositive
            | FieldViolation::PriceOutOfRange => "price",
            FieldViolation::StockNegative => "stockQuantity",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("product.validation_failed")]
    Validation(Vec<FieldViolation>),
    #[error("product.not_found")]
    NotFound,
    #[error("product.import_unreadable")]
    ImportUnreadable,
    #[error("product.export_failed")]
    ExportFailed,
    #[error("repository.persistence")]
    Repository(#[from] crate::domain::errors::RepositoryError),
}

impl From<Vec<FieldViolation>> for ProductError {
    fn from(violations: Vec<FieldViolation>) -> Self {
        ProductError::Validation(violations)
    }
}
