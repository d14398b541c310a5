use super::errors::{FieldViolation, ProductError};
use super::model::{NewProduct, ProductProps};

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_ERROR_PREVIEW: usize = 5;

/// Positional columns the importer needs: name, description, price, stock quantity.
pub const REQUIRED_COLUMNS: usize = 4;

/// Failure scoped to one data row. Never stops the import.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("Row {line}: invalid row format")]
    InvalidFormat { line: u64 },
    #[error("Row {line}: invalid data in row \"{raw}\"")]
    InvalidData { line: u64, raw: String },
    #[error("Row {line}: validation failed for row \"{raw}\" ({})", codes(.violations))]
    Validation {
        line: u64,
        raw: String,
        violations: Vec<FieldViolation>,
    },
}

fn codes(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Aggregate result of one import. Counts are exact; `errors` keeps only
/// the first messages, up to the preview size the pipeline was given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOutcome {
    pub success_count: u64,
    pub failure_count: u64,
    pub errors: Vec<String>,
}

impl ImportOutcome {
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub fn record_failure(&mut self, error: &RowError, preview: usize) {
        self.failure_count += 1;
        if self.errors.len() < preview {
            self.errors.push(error.to_string());
        }
    }

    pub fn processed(&self) -> u64 {
        self.success_count + self.failure_count
    }
}

/// Structural check and field coercion. Columns past the fourth are ignored.
pub fn coerce_row(line: u64, fields: &[&str]) -> Result<ProductProps, RowError> {
    if fields.len() < REQUIRED_COLUMNS {
        return Err(RowError::InvalidFormat { line });
    }

    let invalid = || RowError::InvalidData {
        line,
        raw: fields.join(","),
    };

    let name = fields[0].trim();
    if name.is_empty() {
        return Err(invalid());
    }
    let price = fields[2]
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(invalid)?;
    let stock_quantity = fields[3].trim().parse::<i32>().map_err(|_| invalid())?;

    Ok(ProductProps {
        name: name.to_string(),
        description: fields[1].trim().to_string(),
        price,
        stock_quantity,
    })
}

/// Runs one row through coercion and validation, producing a staged record.
pub fn stage_row(line: u64, fields: &[&str]) -> Result<NewProduct, RowError> {
    let props = coerce_row(line, fields)?;

    NewProduct::new(props).map_err(|err| match err {
        ProductError::Validation(violations) => RowError::Validation {
            line,
            raw: fields.join(","),
            violations,
        },
        _ => RowError::InvalidData {
            line,
            raw: fields.join(","),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_reject_rows_with_fewer_than_four_fields() {
        assert_eq!(
            coerce_row(2, &["Lamp", "Desk lamp", "12.5"]),
            Err(RowError::InvalidFormat { line: 2 })
        );
    }

    #[test]
    fn should_trim_and_ignore_extra_columns() {
        let props = coerce_row(2, &[" Lamp ", " Desk lamp ", " 12.50 ", " 3 ", "2024-01-01 00:00:00"])
            .unwrap();

        assert_eq!(props.name, "Lamp");
        assert_eq!(props.description, "Desk lamp");
        assert_eq!(props.price, 12.5);
        assert_eq!(props.stock_quantity, 3);
    }

    #[test]
    fn should_reject_non_numeric_price() {
        let err = coerce_row(4, &["Lamp", "Desk lamp", "abc", "3"]).unwrap_err();

        assert_eq!(
            err,
            RowError::InvalidData {
                line: 4,
                raw: "Lamp,Desk lamp,abc,3".to_string()
            }
        );
        assert_eq!(err.to_string(), "Row 4: invalid data in row \"Lamp,Desk lamp,abc,3\"");
    }

    #[test]
    fn should_reject_fractional_stock_instead_of_truncating() {
        assert!(matches!(
            coerce_row(2, &["Lamp", "Desk lamp", "12", "3.5"]),
            Err(RowError::InvalidData { .. })
        ));
    }

    #[test]
    fn should_reject_empty_name_and_empty_price() {
        assert!(coerce_row(2, &["  ", "Desk lamp", "12", "3"]).is_err());
        assert!(coerce_row(2, &["Lamp", "Desk lamp", "", "3"]).is_err());
        assert!(coerce_row(2, &["Lamp", "Desk lamp", "inf", "3"]).is_err());
    }

    #[test]
    fn should_report_validation_failure_with_raw_row() {
        let err = stage_row(7, &["Lamp", "", "-2", "3"]).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Row 7: validation failed for row \"Lamp,,-2,3\" (product.description_blank, product.price_not_positive)"
        );
    }

    #[test]
    fn should_stage_valid_row() {
        let staged = stage_row(2, &["Lamp", "Desk lamp", "12.5", "0"]).unwrap();

        assert_eq!(staged.name, "Lamp");
        assert_eq!(staged.stock_quantity, 0);
    }

    #[test]
    fn should_cap_error_messages_but_keep_exact_count() {
        let mut outcome = ImportOutcome::default();
        for line in 0..12 {
            outcome.record_failure(&RowError::InvalidFormat { line }, DEFAULT_ERROR_PREVIEW);
        }
        outcome.record_success();

        assert_eq!(outcome.failure_count, 12);
        assert_eq!(outcome.errors.len(), DEFAULT_ERROR_PREVIEW);
        assert_eq!(outcome.processed(), 13);
    }
}
