use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

use crate::domain::validation::ValidationResult;

/// Validation error response
#[derive(Debug, serde::Serialize)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub field_errors: Vec<FieldError>,
}

/// Field error details
#[derive(Debug, Clone, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationErrorResponse {
    pub fn new(field_errors: Vec<FieldError>) -> Self {
        Self {
            error: "Unprocessable Entity".to_string(),
            code: "VALIDATION_FAILED".to_string(),
            message: "Validation failed".to_string(),
            field_errors,
        }
    }
}

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(self)).into_response()
    }
}

/// Validate a payload and return a proper API error response
pub fn validate_and_respond<T>(payload: &T) -> Result<(), (StatusCode, ValidationErrorResponse)>
where
    T: Validate,
{
    payload.validate().map_err(|validation_errors| {
        let mut field_errors: Vec<FieldError> = validation_errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|error| FieldError {
                    field: field.to_string(),
                    code: error.code.to_uppercase(),
                    message: error
                        .message
                        .as_ref()
                        .map(|cow| cow.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        (
            StatusCode::UNPROCESSABLE_ENTITY,
            ValidationErrorResponse::new(field_errors),
        )
    })
}

/// One field error per reason code, in the order the rules ran
pub fn field_errors_from(field: &str, result: &ValidationResult) -> Vec<FieldError> {
    result
        .errors()
        .iter()
        .map(|code| FieldError {
            field: field.to_string(),
            code: code.as_str().to_string(),
            message: format!("{} failed {}", field, code.as_str().to_lowercase()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::ValidationCode;

    #[derive(Validate)]
    struct Contact {
        #[validate(length(min = 1, max = 10, message = "Name must be 1 to 10 characters"))]
        name: String,
    }

    #[test]
    fn test_validate_and_respond() {
        let ok = Contact {
            name: "Ada".to_string(),
        };
        assert!(validate_and_respond(&ok).is_ok());

        let bad = Contact {
            name: "A very long name".to_string(),
        };
        let (status, response) = validate_and_respond(&bad).unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.field_errors.len(), 1);
        assert_eq!(response.field_errors[0].field, "name");
        assert_eq!(response.field_errors[0].code, "LENGTH");
        assert_eq!(response.field_errors[0].message, "Name must be 1 to 10 characters");
    }

    #[test]
    fn test_field_errors_from_result() {
        let result = ValidationResult::invalid(vec![
            ValidationCode::HeaderInjection,
            ValidationCode::InvalidFormat,
        ]);
        let errors = field_errors_from("email", &result);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code, "HEADER_INJECTION");
        assert_eq!(errors[1].code, "INVALID_FORMAT");
        assert!(field_errors_from("email", &ValidationResult::valid()).is_empty());
    }
}
