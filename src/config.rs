use std::time::Duration;

use thiserror::Error;

const MIN_LOOKUP_TIMEOUT_MS: u64 = 50;
const MAX_LOOKUP_TIMEOUT_MS: u64 = 30_000;
const RECOMMENDED_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    pub listen_addr: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_leeway_secs: u64,
    pub auth_cookie_name: String,
    pub auth_lookup_timeout_ms: u64,
    pub max_request_body_bytes: usize,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_leeway_secs", &self.jwt_leeway_secs)
            .field("auth_cookie_name", &self.auth_cookie_name)
            .field("auth_lookup_timeout_ms", &self.auth_lookup_timeout_ms)
            .field("max_request_body_bytes", &self.max_request_body_bytes)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable numbers fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            listen_addr: lookup("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            jwt_secret: lookup("JWT_SECRET").unwrap_or_default(),
            jwt_issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "lexguard".to_string()),
            jwt_leeway_secs: lookup("JWT_LEEWAY_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            auth_cookie_name: lookup("AUTH_COOKIE_NAME")
                .unwrap_or_else(|| "auth-token".to_string()),
            auth_lookup_timeout_ms: lookup("AUTH_LOOKUP_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(2000),
            max_request_body_bytes: lookup("MAX_REQUEST_BODY_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_addr.is_empty() {
            return Err(ConfigError::Missing("LISTEN_ADDR"));
        }

        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }

        if self.jwt_issuer.is_empty() {
            return Err(ConfigError::Missing("JWT_ISSUER"));
        }

        let cookie_ok = !self.auth_cookie_name.is_empty()
            && self
                .auth_cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !cookie_ok {
            return Err(ConfigError::Invalid {
                name: "AUTH_COOKIE_NAME",
                reason: "use letters, digits, '-' or '_'".to_string(),
            });
        }

        if !(MIN_LOOKUP_TIMEOUT_MS..=MAX_LOOKUP_TIMEOUT_MS).contains(&self.auth_lookup_timeout_ms)
        {
            return Err(ConfigError::Invalid {
                name: "AUTH_LOOKUP_TIMEOUT_MS",
                reason: format!(
                    "must be between {} and {}",
                    MIN_LOOKUP_TIMEOUT_MS, MAX_LOOKUP_TIMEOUT_MS
                ),
            });
        }

        if self.max_request_body_bytes == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_REQUEST_BODY_BYTES",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Short secrets are accepted but weaken HS256
    pub fn has_weak_secret(&self) -> bool {
        self.jwt_secret.len() < RECOMMENDED_SECRET_BYTES
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.auth_lookup_timeout_ms)
    }

    pub fn leeway(&self) -> Duration {
        Duration::from_secs(self.jwt_leeway_secs)
    }
}
