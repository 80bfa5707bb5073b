use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::sanitizers::MAX_SANITIZE_DEPTH;

/// Request screening configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSanitizationConfig {
    /// Maximum length of the request target (path and query)
    pub max_uri_length: usize,
    /// Maximum length of a single header value
    pub max_header_value_length: usize,
    /// Nesting level past which JSON payloads are left as-is
    pub max_depth: usize,
    /// Case-insensitive patterns rejected in the request target
    pub blocked_patterns: HashSet<String>,
    /// URL schemes rejected where a scheme can start, so `data:` is caught
    /// in `?u=data:...` but not inside `metadata:`
    pub blocked_schemes: HashSet<String>,
}

impl Default for InputSanitizationConfig {
    fn default() -> Self {
        let mut blocked_patterns = HashSet::new();
        blocked_patterns.insert("<script".to_string());
        blocked_patterns.insert("onload=".to_string());
        blocked_patterns.insert("onerror=".to_string());
        blocked_patterns.insert("eval(".to_string());
        blocked_patterns.insert("../".to_string());
        blocked_patterns.insert("..\\".to_string());

        Self {
            max_uri_length: 8 * 1024,
            max_header_value_length: 8 * 1024,
            max_depth: MAX_SANITIZE_DEPTH,
            blocked_patterns,
            blocked_schemes: ["javascript:", "vbscript:", "data:"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl InputSanitizationConfig {
    /// Create a new config with custom settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum request target length
    pub fn with_max_uri_length(mut self, length: usize) -> Self {
        self.max_uri_length = length;
        self
    }

    /// Set maximum header value length
    pub fn with_max_header_value_length(mut self, length: usize) -> Self {
        self.max_header_value_length = length;
        self
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Add a blocked pattern
    pub fn with_blocked_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.blocked_patterns.insert(pattern.into());
        self
    }

    /// Add a blocked URL scheme, including the trailing colon
    pub fn with_blocked_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.blocked_schemes.insert(scheme.into());
        self
    }
}
