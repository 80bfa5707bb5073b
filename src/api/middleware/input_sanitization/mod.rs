//! Input sanitization and validation for untrusted request data
//!
//! Validators classify input without touching it; sanitizers turn any string
//! into a value that is safe for one declared sink. The screening layer
//! rejects request targets and headers that no handler should ever see.
//!
//! The free functions below accept `Option<&str>` so that absent fields map
//! straight to the safe default (`""`, `Value::Null`, default pagination).

pub mod config;
pub mod middleware;
pub mod sanitizers;
pub mod validators;


use serde_json::Value;

use crate::domain::validation::ValidationResult;

// Re-export main types for convenience
pub use config::InputSanitizationConfig;
pub use middleware::InputSanitizationLayer;
pub use sanitizers::{MarkupLevel, Pagination, SanitizationContext, Sanitizer, MAX_SANITIZE_DEPTH};
pub use validators::Validator;

/// Sanitize for the given sink
pub fn sanitize(input: Option<&str>, context: SanitizationContext) -> String {
    Sanitizer::sanitize(input.unwrap_or_default(), context)
}

/// Strip markup down to the level's allow-list
pub fn sanitize_markup(input: Option<&str>, level: MarkupLevel) -> String {
    Sanitizer::sanitize_markup(input.unwrap_or_default(), level)
}

pub fn sanitize_plain_text(input: Option<&str>) -> String {
    Sanitizer::sanitize_plain_text(input.unwrap_or_default())
}

pub fn sanitize_email_address(input: Option<&str>) -> String {
    Sanitizer::sanitize_email_address(input.unwrap_or_default())
}

pub fn sanitize_url(input: Option<&str>) -> String {
    Sanitizer::sanitize_url(input.unwrap_or_default())
}

pub fn sanitize_phone_number(input: Option<&str>) -> String {
    Sanitizer::sanitize_phone_number(input.unwrap_or_default())
}

pub fn sanitize_file_name(input: Option<&str>) -> String {
    Sanitizer::sanitize_file_name(input.unwrap_or_default())
}

/// `Value::Null` for absent or malformed documents
pub fn sanitize_json(input: Option<&str>) -> Value {
    input.map(Sanitizer::sanitize_json).unwrap_or(Value::Null)
}

pub fn sanitize_search_query(input: Option<&str>) -> String {
    Sanitizer::sanitize_search_query(input.unwrap_or_default())
}

pub fn sanitize_ip_address(input: Option<&str>) -> String {
    Sanitizer::sanitize_ip_address(input.unwrap_or_default())
}

pub fn sanitize_user_agent(input: Option<&str>) -> String {
    Sanitizer::sanitize_user_agent(input.unwrap_or_default())
}

pub fn sanitize_field_name(input: Option<&str>) -> String {
    Sanitizer::sanitize_field_name(input.unwrap_or_default())
}

pub fn sanitize_deep(value: Value, depth: usize) -> Value {
    Sanitizer::sanitize_deep(value, depth)
}

pub fn sanitize_pagination(page: Option<&str>, limit: Option<&str>) -> Pagination {
    Sanitizer::sanitize_pagination(page, limit)
}

pub fn validate_email_address(input: Option<&str>) -> ValidationResult {
    Validator::validate_email_address(input)
}

pub fn validate_password_strength(input: Option<&str>) -> ValidationResult {
    Validator::validate_password_strength(input)
}

pub fn validate_phone_number(input: Option<&str>) -> ValidationResult {
    Validator::validate_phone_number(input)
}
