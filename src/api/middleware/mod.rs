pub mod auth;
pub mod authorization;
pub mod input_sanitization;
pub mod validation;

pub use auth::{guard, AccessGuardLayer};
pub use authorization::{require_organization_access, require_permission, Authenticated};
pub use input_sanitization::InputSanitizationLayer;
pub use validation::{field_errors_from, validate_and_respond, FieldError, ValidationErrorResponse};
