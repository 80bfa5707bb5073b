use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{strip_control_chars, Sanitizer};

/// Nesting level past which [`Sanitizer::sanitize_deep`] stops descending
pub const MAX_SANITIZE_DEPTH: usize = 10;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 20;
const MAX_PAGE: u32 = 1000;
const MAX_LIMIT: u32 = 100;

/// Clamped page/limit pair for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Clamp page to `[1, 1000]` and limit to `[1, 100]`
    pub fn clamped(page: i64, limit: i64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE as i64) as u32,
            limit: limit.clamp(1, MAX_LIMIT as i64) as u32,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Sanitizer {
    /// Parse a JSON document with control characters removed from the raw
    /// text, string values and keys. Malformed input yields `Value::Null`.
    ///
    /// `\n`, `\r` and `\t` are kept: they are legal JSON whitespace and
    /// legitimate content of multi-line string values. Callers rendering the
    /// result into a single-line sink must sanitize for that sink as well.
    ///
    /// Keys that become equal once cleaned keep the first entry in the
    /// object's iteration order.
    pub fn sanitize_json(input: &str) -> Value {
        let cleaned = strip_control_chars(input, true);
        match serde_json::from_str::<Value>(&cleaned) {
            Ok(value) => strip_json_controls(value),
            Err(_) => Value::Null,
        }
    }

    /// Apply plain-text sanitization to every key and string leaf.
    ///
    /// Sub-structures nested deeper than [`MAX_SANITIZE_DEPTH`] are returned
    /// unchanged. When two keys sanitize to the same name the first one in
    /// the object's iteration order wins and the later entry is dropped.
    pub fn sanitize_deep(value: Value, depth: usize) -> Value {
        Self::sanitize_deep_within(value, depth, MAX_SANITIZE_DEPTH)
    }

    /// [`Sanitizer::sanitize_deep`] with a configurable depth bound
    pub fn sanitize_deep_within(value: Value, depth: usize, max_depth: usize) -> Value {
        if depth > max_depth {
            return value;
        }
        match value {
            Value::String(s) => Value::String(Self::sanitize_plain_text(&s)),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| Self::sanitize_deep_within(item, depth + 1, max_depth))
                    .collect(),
            ),
            Value::Object(map) => {
                let mut cleaned = Map::new();
                for (key, item) in map {
                    insert_first(
                        &mut cleaned,
                        Self::sanitize_plain_text(&key),
                        Self::sanitize_deep_within(item, depth + 1, max_depth),
                    );
                }
                Value::Object(cleaned)
            }
            other => other,
        }
    }

    /// Parse and clamp raw page/limit query values.
    ///
    /// Absent or unparseable values fall back to page 1 and limit 20.
    pub fn sanitize_pagination(page: Option<&str>, limit: Option<&str>) -> Pagination {
        let defaults = Pagination::default();
        let page = page
            .and_then(parse_integer)
            .unwrap_or(i64::from(defaults.page));
        let limit = limit
            .and_then(parse_integer)
            .unwrap_or(i64::from(defaults.limit));
        Pagination::clamped(page, limit)
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    // "2.7" and "1e3" are accepted and truncated toward zero
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}

fn strip_json_controls(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(strip_control_chars(&s, true)),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_json_controls).collect()),
        Value::Object(map) => {
            let mut cleaned = Map::new();
            for (key, item) in map {
                insert_first(&mut cleaned, strip_control_chars(&key, true), strip_json_controls(item));
            }
            Value::Object(cleaned)
        }
        other => other,
    }
}

/// Insert unless an earlier entry already claimed the cleaned key
fn insert_first(map: &mut Map<String, Value>, key: String, value: Value) {
    if map.contains_key(&key) {
        debug!(key = %key, "Dropping object entry whose key collides after sanitization");
        return;
    }
    map.insert(key, value);
}
