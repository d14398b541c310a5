use poem::http::StatusCode;
use poem_openapi::payload::Json;

use business::domain::errors::RepositoryError;
use business::domain::product::errors::ProductError;

use crate::api::error::{ErrorResponse, FieldErrorResponse, IntoErrorResponse};

impl IntoErrorResponse for ProductError {
    fn into_error_response(self) -> (StatusCode, Json<ErrorResponse>) {
        let mut message = self.to_string();
        let (status, name, fields) = match self {
            ProductError::Validation(violations) => (
                StatusCode::BAD_REQUEST,
                "ValidationError",
                violations
                    .iter()
                    .map(|v| FieldErrorResponse {
                        field: v.field().to_string(),
                        message: v.to_string(),
                    })
                    .collect(),
            ),
            ProductError::NotFound => (StatusCode::NOT_FOUND, "NotFound", Vec::new()),
            ProductError::ImportUnreadable => {
                (StatusCode::BAD_REQUEST, "ImportError", Vec::new())
            }
            ProductError::Repository(RepositoryError::ConstraintViolation) => {
                message = RepositoryError::ConstraintViolation.to_string();
                (StatusCode::BAD_REQUEST, "ConstraintViolation", Vec::new())
            }
            ProductError::ExportFailed | ProductError::Repository(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                Vec::new(),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                name: name.to_string(),
                message,
                fields,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use business::domain::product::errors::FieldViolation;

    #[test]
    fn should_map_validation_errors_field_by_field() {
        let (status, Json(body)) = ProductError::Validation(vec![
            FieldViolation::NameTooLong,
            FieldViolation::StockNegative,
        ])
        .into_error_response();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "product.validation_failed");
        assert_eq!(
            body.fields,
            vec![
                FieldErrorResponse {
                    field: "name".to_string(),
                    message: "product.name_too_long".to_string(),
                },
                FieldErrorResponse {
                    field: "stockQuantity".to_string(),
                    message: "product.stock_negative".to_string(),
                },
            ]
        );
    }

    #[test]
    fn should_hide_repository_details_behind_internal_error() {
        let (status, Json(body)) =
            ProductError::Repository(RepositoryError::DatabaseError).into_error_response();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.name, "InternalError");
        assert_eq!(body.message, "repository.persistence");
        assert!(body.fields.is_empty());
    }

    #[test]
    fn should_map_unreadable_import_to_bad_request() {
        let (status, Json(body)) = ProductError::ImportUnreadable.into_error_response();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "product.import_unreadable");
    }

    #[test]
    fn should_map_store_constraint_violation_to_bad_request() {
        let (status, Json(body)) =
            ProductError::Repository(RepositoryError::ConstraintViolation).into_error_response();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.name, "ConstraintViolation");
        assert_eq!(body.message, "repository.constraint_violation");
    }
}
