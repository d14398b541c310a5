use poem::http::StatusCode;
use poem_openapi::{Object, payload::Json};

/// One rejected field of a create or edit request.
#[derive(Object, Debug, Clone, PartialEq)]
pub struct FieldErrorResponse {
    pub field: String,
    pub message: String,
}

#[derive(Object, Debug)]
pub struct ErrorResponse {
    pub name: String,
    pub message: String,
    #[oai(skip_serializing_if_is_empty)]
    pub fields: Vec<FieldErrorResponse>,
}

impl ErrorResponse {
    pub fn new(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
            fields: Vec::new(),
        }
    }
}

pub trait IntoErrorResponse {
    fn into_error_response(self) -> (StatusCode, Json<ErrorResponse>);
}
