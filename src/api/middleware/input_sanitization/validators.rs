use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::validation::{ValidationBuilder, ValidationCode, ValidationResult};

/// Cached regex pattern for the single accepted email shape
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9]([A-Za-z0-9._+-]*[A-Za-z0-9_+-])?@[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$",
    )
    .expect("Invalid regex pattern for email addresses")
});

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ().-]+$").expect("Invalid regex pattern for phone numbers"));

/// SQL keyword used as a statement word
static SQL_STATEMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(select|insert|update|delete|drop|union|exec|alter|create|truncate)\s")
        .expect("Invalid regex pattern for SQL statements")
});

/// Raw, percent-encoded, escaped and entity-encoded CR/LF/NUL
const HEADER_INJECTION_SEQUENCES: &[&str] = &[
    "\r", "\n", "\0", "%0d", "%0a", "%00", "\\r", "\\n", "\\0", "\\x00", "&#13;", "&#10;",
    "&#x0d;", "&#x0a;", "&#0;",
];

const SQL_FRAGMENTS: &[&str] = &["'", "\"", ";", "--", "/*", "*/"];

const MAX_EMAIL_LOCAL_LENGTH: usize = 64;
const MAX_EMAIL_LENGTH: usize = 254;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// Input validation utilities
pub struct Validator;

impl Validator {
    /// Validate an email address for use as a login or contact field
    pub fn validate_email_address(input: Option<&str>) -> ValidationResult {
        let Some(email) = input.filter(|value| !value.is_empty()) else {
            return ValidationResult::invalid(vec![ValidationCode::Required]);
        };

        let local_length = email.rsplit_once('@').map_or(email.len(), |(local, _)| local.len());
        let within_length = local_length <= MAX_EMAIL_LOCAL_LENGTH && email.len() <= MAX_EMAIL_LENGTH;

        ValidationBuilder::new()
            .rule(!has_control_characters(email), ValidationCode::ControlCharacters)
            .rule(!has_header_injection(email), ValidationCode::HeaderInjection)
            .rule(!has_markup(email), ValidationCode::ContainsMarkup)
            .rule(!has_sql_fragment(email), ValidationCode::SqlFragment)
            .rule(
                EMAIL_REGEX.is_match(email) && !email.contains(".."),
                ValidationCode::InvalidFormat,
            )
            .rule(within_length, ValidationCode::TooLong)
            .build()
    }

    /// Minimum length plus lower-case, upper-case and digit classes
    pub fn validate_password_strength(input: Option<&str>) -> ValidationResult {
        let Some(password) = input.filter(|value| !value.is_empty()) else {
            return ValidationResult::invalid(vec![ValidationCode::Required]);
        };

        let length = password.chars().count();
        ValidationBuilder::new()
            .rule(length >= MIN_PASSWORD_LENGTH, ValidationCode::TooShort)
            .rule(length <= MAX_PASSWORD_LENGTH, ValidationCode::TooLong)
            .rule(password.chars().any(char::is_lowercase), ValidationCode::MissingLowercase)
            .rule(password.chars().any(char::is_uppercase), ValidationCode::MissingUppercase)
            .rule(password.chars().any(|c| c.is_ascii_digit()), ValidationCode::MissingDigit)
            .build()
    }

    /// Validate a phone number as typed by a client
    pub fn validate_phone_number(input: Option<&str>) -> ValidationResult {
        let Some(phone) = input.filter(|value| !value.is_empty()) else {
            return ValidationResult::invalid(vec![ValidationCode::Required]);
        };

        let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
        ValidationBuilder::new()
            .rule(!has_control_characters(phone), ValidationCode::ControlCharacters)
            .rule(!has_header_injection(phone), ValidationCode::HeaderInjection)
            .rule(!has_markup(phone), ValidationCode::ContainsMarkup)
            .rule(!has_sql_fragment(phone), ValidationCode::SqlFragment)
            .rule(PHONE_REGEX.is_match(phone), ValidationCode::InvalidFormat)
            .rule(
                (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits),
                ValidationCode::InvalidLength,
            )
            .build()
    }
}

fn has_control_characters(input: &str) -> bool {
    input.chars().any(char::is_control)
}

fn has_header_injection(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    HEADER_INJECTION_SEQUENCES
        .iter()
        .any(|sequence| lower.contains(sequence))
}

fn has_markup(input: &str) -> bool {
    input.contains(['<', '>'])
}

fn has_sql_fragment(input: &str) -> bool {
    SQL_FRAGMENTS.iter().any(|fragment| input.contains(fragment))
        || SQL_STATEMENT_REGEX.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_accepts_common_shapes() {
        for email in [
            "user@example.com",
            "first.last@firm.co.uk",
            "intake+new-matter@law-firm.example.com",
            "a@b.io",
            "x_y@sub.domain.org",
        ] {
            assert!(
                Validator::validate_email_address(Some(email)).is_valid(),
                "{} should be valid",
                email
            );
        }
    }

    #[test]
    fn test_email_rejects_malformed() {
        for email in [
            "plainaddress",
            "@example.com",
            "user@",
            "user@example",
            "user@example.c",
            ".user@example.com",
            "user.@example.com",
            "us..er@example.com",
            "user@-example.com",
            "user@example..com",
            "user name@example.com",
        ] {
            let result = Validator::validate_email_address(Some(email));
            assert!(!result.is_valid(), "{} should be invalid", email);
        }
    }

    #[test]
    fn test_email_required() {
        assert_eq!(
            Validator::validate_email_address(None).errors(),
            &[ValidationCode::Required]
        );
        assert_eq!(
            Validator::validate_email_address(Some("")).errors(),
            &[ValidationCode::Required]
        );
    }

    #[test]
    fn test_email_header_injection() {
        for email in [
            "user@example.com\r\nBcc: victim@example.com",
            "user@example.com%0D%0ABcc:victim@example.com",
            "user@example.com%0aBcc:victim@example.com",
            "user@example.com\\r\\nBcc: victim@example.com",
            "user@example.com&#13;&#10;Bcc: victim@example.com",
            "user%00@example.com",
            "user\\x00@example.com",
            "user\0@example.com",
        ] {
            let result = Validator::validate_email_address(Some(email));
            assert!(!result.is_valid(), "{:?} should be invalid", email);
            assert!(result.has_error(ValidationCode::HeaderInjection), "{:?}", email);
        }
    }

    #[test]
    fn test_email_reason_codes_in_order() {
        let result = Validator::validate_email_address(Some("<b>'x'@y.com</b>"));
        assert_eq!(
            result.errors(),
            &[
                ValidationCode::ContainsMarkup,
                ValidationCode::SqlFragment,
                ValidationCode::InvalidFormat
            ]
        );
    }

    #[test]
    fn test_email_length_limits() {
        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(Validator::validate_email_address(Some(&long_local)).has_error(ValidationCode::TooLong));

        let long_domain = format!("user@{}.com", "d".repeat(250));
        assert!(Validator::validate_email_address(Some(&long_domain)).has_error(ValidationCode::TooLong));
    }

    #[test]
    fn test_password_strength() {
        assert!(Validator::validate_password_strength(Some("StrongPass123")).is_valid());
        assert!(Validator::validate_password_strength(Some("Password123")).is_valid());

        let weak = Validator::validate_password_strength(Some("password123"));
        assert_eq!(weak.errors(), &[ValidationCode::MissingUppercase]);

        let short = Validator::validate_password_strength(Some("Ab1"));
        assert_eq!(short.errors(), &[ValidationCode::TooShort]);

        let classes = Validator::validate_password_strength(Some("        "));
        assert_eq!(
            classes.errors(),
            &[
                ValidationCode::MissingLowercase,
                ValidationCode::MissingUppercase,
                ValidationCode::MissingDigit
            ]
        );

        let long = format!("Aa1{}", "x".repeat(200));
        assert_eq!(
            Validator::validate_password_strength(Some(&long)).errors(),
            &[ValidationCode::TooLong]
        );
        assert!(!Validator::validate_password_strength(None).is_valid());
    }

    #[test]
    fn test_phone_number() {
        for phone in ["+1 (555) 123-4567", "555.123.4567", "+442079460958", "1234567"] {
            assert!(Validator::validate_phone_number(Some(phone)).is_valid(), "{}", phone);
        }

        assert!(Validator::validate_phone_number(Some("12345"))
            .has_error(ValidationCode::InvalidLength));
        assert!(Validator::validate_phone_number(Some("555-1234<script>"))
            .has_error(ValidationCode::ContainsMarkup));
        assert!(Validator::validate_phone_number(Some("5551234%0d%0aX-Header: 1"))
            .has_error(ValidationCode::HeaderInjection));
        assert!(Validator::validate_phone_number(Some("5551234'; drop table x"))
            .has_error(ValidationCode::SqlFragment));
        assert!(Validator::validate_phone_number(Some("555 CALL NOW"))
            .has_error(ValidationCode::InvalidFormat));
        assert_eq!(
            Validator::validate_phone_number(Some("")).errors(),
            &[ValidationCode::Required]
        );
    }
}
