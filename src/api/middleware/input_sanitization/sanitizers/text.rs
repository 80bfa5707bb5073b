use once_cell::sync::Lazy;
use regex::Regex;

use super::{escape_html, strip_executable_sequences, truncate_chars, MarkupLevel, Sanitizer};
use crate::api::middleware::input_sanitization::validators::Validator;

const TEXT_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

pub(crate) const MAX_FILE_NAME_CHARS: usize = 255;
pub(crate) const MAX_SEARCH_QUERY_CHARS: usize = 100;
pub(crate) const MAX_USER_AGENT_CHARS: usize = 500;
pub(crate) const MAX_FIELD_NAME_CHARS: usize = 64;

static SQL_KEYWORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(select|insert|update|delete|drop|union|exec|execute|create|alter|truncate|declare|xp_cmdshell|waitfor|shutdown)\b",
    )
    .expect("Invalid regex pattern for SQL keywords")
});

static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex pattern for whitespace"));

impl Sanitizer {
    /// Remove markup, escape what remains and strip script schemes and
    /// inline handlers
    pub fn sanitize_plain_text(input: &str) -> String {
        let text = Self::sanitize_markup(input, MarkupLevel::Strict);
        let escaped = escape_html(&text, true);
        strip_executable_sequences(&escaped, TEXT_SCHEMES, true)
            .trim()
            .to_string()
    }

    /// Provider-aware email normalization; `""` when the address is invalid
    pub fn sanitize_email_address(input: &str) -> String {
        let trimmed = input.trim();
        if !Validator::validate_email_address(Some(trimmed)).is_valid() {
            return String::new();
        }
        let Some((local, domain)) = trimmed.rsplit_once('@') else {
            return String::new();
        };

        let local = local.to_lowercase();
        let domain = domain.to_ascii_lowercase();
        let (local, domain) = match domain.as_str() {
            "gmail.com" | "googlemail.com" => (
                strip_subaddress(&local, '+').replace('.', ""),
                "gmail.com".to_string(),
            ),
            "outlook.com" | "hotmail.com" | "live.com" | "msn.com" | "icloud.com" | "me.com"
            | "mac.com" => (strip_subaddress(&local, '+').to_string(), domain),
            "yahoo.com" | "ymail.com" | "rocketmail.com" => {
                (strip_subaddress(&local, '-').to_string(), domain)
            }
            _ => (local, domain),
        };

        let normalized = format!("{}@{}", local, domain);
        if Validator::validate_email_address(Some(&normalized)).is_valid() {
            normalized
        } else {
            String::new()
        }
    }

    /// Keep digits, a leading `+`, spaces, hyphens, parentheses and dots
    pub fn sanitize_phone_number(input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        for c in input.trim().chars() {
            match c {
                '0'..='9' | ' ' | '-' | '(' | ')' | '.' => out.push(c),
                '+' if out.trim().is_empty() => out.push(c),
                _ => {}
            }
        }
        out.trim().to_string()
    }

    /// Lower-cased file name with no path, header or shell metacharacters
    pub fn sanitize_file_name(input: &str) -> String {
        let lowered = input.trim().to_lowercase();
        let mut out = String::with_capacity(lowered.len());
        let mut in_whitespace = false;

        for c in lowered.chars() {
            if c.is_whitespace() {
                if !in_whitespace {
                    out.push('_');
                }
                in_whitespace = true;
                continue;
            }
            in_whitespace = false;
            if c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | ';') {
                out.push('_');
            } else {
                out.push(c);
            }
        }

        let trimmed = out.trim_matches('.');
        truncate_chars(trimmed, MAX_FILE_NAME_CHARS)
            .trim_matches('.')
            .to_string()
    }

    /// Strip quoting, terminators, comments and SQL keywords from a free-text
    /// search term
    pub fn sanitize_search_query(input: &str) -> String {
        let mut current = input.to_string();
        loop {
            let next = search_query_pass(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    /// Strip angle brackets, quotes and control characters from a user agent
    pub fn sanitize_user_agent(input: &str) -> String {
        let filtered: String = input
            .chars()
            .filter(|c| !c.is_control() && !matches!(c, '<' | '>' | '"' | '\''))
            .collect();
        let stripped = strip_executable_sequences(&filtered, &["javascript:"], false);
        truncate_chars(&stripped, MAX_USER_AGENT_CHARS).trim().to_string()
    }

    /// Identifier-safe field name: `[A-Za-z0-9_]{0,64}`
    pub fn sanitize_field_name(input: &str) -> String {
        input
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .take(MAX_FIELD_NAME_CHARS)
            .collect()
    }
}

/// Local part up to the first sub-address separator
fn strip_subaddress(local: &str, separator: char) -> &str {
    local.split(separator).next().unwrap_or(local)
}

/// Drop `--`, `/*` and `*/`, including pairs formed by an earlier removal
fn strip_comment_markers(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        out.push(c);
        if out.ends_with("--") || out.ends_with("/*") || out.ends_with("*/") {
            out.truncate(out.len() - 2);
        }
    }
    out
}

fn search_query_pass(input: &str) -> String {
    let spaced: String = input
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | ';' | '\\'))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let uncommented = strip_comment_markers(&spaced);
    let without_keywords = SQL_KEYWORD_REGEX.replace_all(&uncommented, " ");
    let collapsed = WHITESPACE_REGEX.replace_all(&without_keywords, " ");
    truncate_chars(collapsed.trim(), MAX_SEARCH_QUERY_CHARS)
        .trim()
        .to_string()
}
