//! Sink-specific sanitizers
//!
//! Every function here is total: it never panics and always returns a safe
//! value for its sink. Every function is idempotent, and every pass is a
//! single left-to-right scan (plus `regex` matching, which is linear time).

mod markup;
mod network;
mod structured;
mod text;

use serde::{Deserialize, Serialize};

pub use markup::MarkupLevel;
pub use structured::{Pagination, MAX_SANITIZE_DEPTH};

/// Core sanitization functions
pub struct Sanitizer;

/// Output sink an input is headed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SanitizationContext {
    Strict,
    Basic,
    Rich,
    Text,
    Email,
    Url,
    Phone,
    Filename,
    Json,
    Query,
    Ip,
    UserAgent,
    FieldName,
}

impl SanitizationContext {
    pub const ALL: &'static [SanitizationContext] = &[
        SanitizationContext::Strict,
        SanitizationContext::Basic,
        SanitizationContext::Rich,
        SanitizationContext::Text,
        SanitizationContext::Email,
        SanitizationContext::Url,
        SanitizationContext::Phone,
        SanitizationContext::Filename,
        SanitizationContext::Json,
        SanitizationContext::Query,
        SanitizationContext::Ip,
        SanitizationContext::UserAgent,
        SanitizationContext::FieldName,
    ];
}

impl Sanitizer {
    /// Sanitize `input` for the given sink.
    ///
    /// `Json` yields the re-serialized document (`"null"` when malformed).
    pub fn sanitize(input: &str, context: SanitizationContext) -> String {
        match context {
            SanitizationContext::Strict => Self::sanitize_markup(input, MarkupLevel::Strict),
            SanitizationContext::Basic => Self::sanitize_markup(input, MarkupLevel::Basic),
            SanitizationContext::Rich => Self::sanitize_markup(input, MarkupLevel::Rich),
            SanitizationContext::Text => Self::sanitize_plain_text(input),
            SanitizationContext::Email => Self::sanitize_email_address(input),
            SanitizationContext::Url => Self::sanitize_url(input),
            SanitizationContext::Phone => Self::sanitize_phone_number(input),
            SanitizationContext::Filename => Self::sanitize_file_name(input),
            SanitizationContext::Json => Self::sanitize_json(input).to_string(),
            SanitizationContext::Query => Self::sanitize_search_query(input),
            SanitizationContext::Ip => Self::sanitize_ip_address(input),
            SanitizationContext::UserAgent => Self::sanitize_user_agent(input),
            SanitizationContext::FieldName => Self::sanitize_field_name(input),
        }
    }

    /// Check if string contains blocked patterns (case-insensitive)
    pub fn contains_blocked_patterns(
        input: &str,
        blocked_patterns: &std::collections::HashSet<String>,
    ) -> bool {
        let input_lower = input.to_lowercase();
        blocked_patterns
            .iter()
            .any(|pattern| input_lower.contains(&pattern.to_lowercase()))
    }

    /// Check if a blocked scheme starts anywhere a URL could start.
    ///
    /// A match preceded by a scheme character (`a-z`, `0-9`, `+`, `-`, `.`)
    /// is part of a longer word and does not count.
    pub fn contains_blocked_scheme(
        input: &str,
        blocked_schemes: &std::collections::HashSet<String>,
    ) -> bool {
        let input_lower = input.to_lowercase();
        blocked_schemes.iter().any(|scheme| {
            let scheme = scheme.to_lowercase();
            input_lower.match_indices(scheme.as_str()).any(|(idx, _)| {
                input_lower[..idx].chars().next_back().map_or(true, |prev| {
                    !(prev.is_ascii_alphanumeric() || matches!(prev, '+' | '-' | '.'))
                })
            })
        })
    }
}

/// Remove control characters, optionally keeping `\n`, `\r` and `\t`
pub(crate) fn strip_control_chars(input: &str, keep_line_whitespace: bool) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || (keep_line_whitespace && matches!(c, '\n' | '\r' | '\t')))
        .collect()
}

/// Keep at most `max` characters
pub(crate) fn truncate_chars(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((idx, _)) => input[..idx].to_string(),
        None => input.to_string(),
    }
}

/// Does `bytes[at..]` start with a character reference such as `&amp;`,
/// `&#39;` or `&#x2F;`?
pub(crate) fn starts_with_entity(bytes: &[u8], at: usize) -> bool {
    let rest = &bytes[at..];
    if rest.first() != Some(&b'&') {
        return false;
    }

    let (body, max_len): (&[u8], usize) = match rest.get(1) {
        Some(b'#') => match rest.get(2) {
            Some(b'x') | Some(b'X') => (&rest[3..], 6),
            _ => (&rest[2..], 7),
        },
        _ => (&rest[1..], 32),
    };
    let hex = matches!(rest.get(1), Some(b'#')) && matches!(rest.get(2), Some(b'x') | Some(b'X'));
    let numeric = matches!(rest.get(1), Some(b'#'));

    for (i, b) in body.iter().enumerate().take(max_len + 1) {
        if *b == b';' {
            return i > 0;
        }
        let ok = if hex {
            b.is_ascii_hexdigit()
        } else if numeric {
            b.is_ascii_digit()
        } else if i == 0 {
            b.is_ascii_alphabetic()
        } else {
            b.is_ascii_alphanumeric()
        };
        if !ok {
            return false;
        }
    }
    false
}

/// HTML-escape `<`, `>`, `&` (and quotes when asked) without re-escaping
/// character references that are already present.
pub(crate) fn escape_html(input: &str, escape_quotes: bool) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    for (idx, c) in input.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if starts_with_entity(bytes, idx) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '"' if escape_quotes => out.push_str("&quot;"),
            '\'' if escape_quotes => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn ends_with_ignore_ascii_case(haystack: &str, suffix: &str) -> bool {
    let h = haystack.as_bytes();
    let s = suffix.as_bytes();
    h.len() >= s.len() && h[h.len() - s.len()..].eq_ignore_ascii_case(s)
}

/// Byte offset of the `on` that starts an `on\w+\s*=` handler ending at
/// the `=` that `out` ends with.
fn event_handler_start(out: &str) -> Option<usize> {
    let before_eq = out.strip_suffix('=')?.trim_end();
    let mut right_of_current = 0usize;
    let mut next: Option<char> = None;

    for (idx, ch) in before_eq.char_indices().rev() {
        if !(ch.is_alphanumeric() || ch == '_') {
            break;
        }
        if matches!(ch, 'o' | 'O') && matches!(next, Some('n') | Some('N')) && right_of_current >= 2 {
            return Some(idx);
        }
        next = Some(ch);
        right_of_current += 1;
    }
    None
}

/// Remove scheme prefixes (`javascript:` and friends) and, optionally,
/// inline event handlers (`onclick=`), including sequences that only form
/// after an inner occurrence is removed (`javajavascript:script:`).
///
/// Removal always happens at the tail of the output while scanning, so the
/// result contains no occurrence and a second pass changes nothing.
pub(crate) fn strip_executable_sequences(
    input: &str,
    schemes: &[&str],
    strip_event_handlers: bool,
) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        out.push(c);
        match c {
            ':' => {
                if let Some(scheme) = schemes
                    .iter()
                    .find(|scheme| ends_with_ignore_ascii_case(&out, scheme))
                {
                    out.truncate(out.len() - scheme.len());
                }
            }
            '=' if strip_event_handlers => {
                if let Some(start) = event_handler_start(&out) {
                    out.truncate(start);
                }
            }
            _ => {}
        }
    }
    out
}
