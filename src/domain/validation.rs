//! Validation outcomes shared by the request validators
//!
//! A [`ValidationResult`] is produced once and never mutated afterwards;
//! its reason codes keep the order in which rules were evaluated.

use serde::Serialize;

/// Identifier of a failed validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    Required,
    ControlCharacters,
    HeaderInjection,
    ContainsMarkup,
    SqlFragment,
    InvalidFormat,
    TooShort,
    TooLong,
    MissingLowercase,
    MissingUppercase,
    MissingDigit,
    InvalidLength,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::Required => "REQUIRED",
            ValidationCode::ControlCharacters => "CONTROL_CHARACTERS",
            ValidationCode::HeaderInjection => "HEADER_INJECTION",
            ValidationCode::ContainsMarkup => "CONTAINS_MARKUP",
            ValidationCode::SqlFragment => "SQL_FRAGMENT",
            ValidationCode::InvalidFormat => "INVALID_FORMAT",
            ValidationCode::TooShort => "TOO_SHORT",
            ValidationCode::TooLong => "TOO_LONG",
            ValidationCode::MissingLowercase => "MISSING_LOWERCASE",
            ValidationCode::MissingUppercase => "MISSING_UPPERCASE",
            ValidationCode::MissingDigit => "MISSING_DIGIT",
            ValidationCode::InvalidLength => "INVALID_LENGTH",
        }
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable accept/reject classification with ordered reason codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<ValidationCode>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Rejection carrying at least one reason code
    pub fn invalid(errors: Vec<ValidationCode>) -> Self {
        debug_assert!(!errors.is_empty(), "invalid result needs a reason code");
        Self {
            is_valid: false,
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[ValidationCode] {
        &self.errors
    }

    pub fn has_error(&self, code: ValidationCode) -> bool {
        self.errors.contains(&code)
    }
}

/// Builder pattern for rule-by-rule validation
pub struct ValidationBuilder {
    errors: Vec<ValidationCode>,
}

impl ValidationBuilder {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record `code` unless `passed` holds; each code is recorded once
    pub fn rule(mut self, passed: bool, code: ValidationCode) -> Self {
        if !passed && !self.errors.contains(&code) {
            self.errors.push(code);
        }
        self
    }

    pub fn build(self) -> ValidationResult {
        if self.errors.is_empty() {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(self.errors)
        }
    }
}

impl Default for ValidationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_in_order() {
        let result = ValidationBuilder::new()
            .rule(false, ValidationCode::TooShort)
            .rule(true, ValidationCode::MissingDigit)
            .rule(false, ValidationCode::MissingUppercase)
            .rule(false, ValidationCode::TooShort)
            .build();

        assert!(!result.is_valid());
        assert_eq!(
            result.errors(),
            &[ValidationCode::TooShort, ValidationCode::MissingUppercase]
        );
    }

    #[test]
    fn test_builder_all_rules_pass() {
        let result = ValidationBuilder::new()
            .rule(true, ValidationCode::Required)
            .build();
        assert!(result.is_valid());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn test_invalid_is_never_valid() {
        let result = ValidationResult::invalid(vec![ValidationCode::Required]);
        assert!(!result.is_valid());
        assert!(result.has_error(ValidationCode::Required));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid result needs a reason code")]
    fn test_invalid_without_codes_is_rejected() {
        let _ = ValidationResult::invalid(Vec::new());
    }

    #[test]
    fn test_serialized_shape() {
        let result = ValidationResult::invalid(vec![ValidationCode::HeaderInjection]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["is_valid"], false);
        assert_eq!(json["errors"][0], "HEADER_INJECTION");
    }
}
