use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower::{Layer, Service};

use super::config::InputSanitizationConfig;
use super::sanitizers::Sanitizer;

/// Encoded NUL, CR and LF after lower-casing
const ENCODED_CONTROL_SEQUENCES: &[&str] = &["%00", "%0d", "%0a"];

/// Error type for input screening failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSanitizationError {
    InvalidHeader(String),
    InvalidUri(String),
}

impl InputSanitizationError {
    pub fn message(&self) -> &str {
        match self {
            InputSanitizationError::InvalidHeader(msg) => msg,
            InputSanitizationError::InvalidUri(msg) => msg,
        }
    }
}

impl IntoResponse for InputSanitizationError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": "Bad Request",
            "code": "INVALID_REQUEST_INPUT",
            "message": self.message(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Reject request targets with control characters, encoded CR/LF/NUL,
/// blocked patterns or blocked URL schemes
pub fn screen_uri(uri: &Uri, config: &InputSanitizationConfig) -> Result<(), InputSanitizationError> {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    if target.len() > config.max_uri_length {
        return Err(InputSanitizationError::InvalidUri(format!(
            "Request target exceeds maximum length of {} characters",
            config.max_uri_length
        )));
    }

    let lower = target.to_ascii_lowercase();
    if target.chars().any(char::is_control)
        || ENCODED_CONTROL_SEQUENCES.iter().any(|seq| lower.contains(seq))
    {
        return Err(InputSanitizationError::InvalidUri(
            "Request target contains control characters".to_string(),
        ));
    }

    let decoded = percent_decode_lossy(target);
    let blocked = |candidate: &str| {
        Sanitizer::contains_blocked_patterns(candidate, &config.blocked_patterns)
            || Sanitizer::contains_blocked_scheme(candidate, &config.blocked_schemes)
    };
    if blocked(target) || blocked(&decoded) {
        return Err(InputSanitizationError::InvalidUri(
            "Request target contains blocked content".to_string(),
        ));
    }

    Ok(())
}

/// Reject oversized header values and values carrying encoded CR/LF/NUL.
///
/// Credential headers are exempt from the encoded-sequence check since
/// tokens are opaque.
pub fn screen_headers(
    headers: &HeaderMap,
    config: &InputSanitizationConfig,
) -> Result<(), InputSanitizationError> {
    for (name, value) in headers {
        if value.len() > config.max_header_value_length {
            return Err(InputSanitizationError::InvalidHeader(format!(
                "Header {} exceeds maximum length of {} bytes",
                name, config.max_header_value_length
            )));
        }
        if name == header::AUTHORIZATION || name == header::COOKIE {
            continue;
        }

        let raw = String::from_utf8_lossy(value.as_bytes()).to_ascii_lowercase();
        if raw.chars().any(|c| c.is_control() && c != '\t')
            || ENCODED_CONTROL_SEQUENCES.iter().any(|seq| raw.contains(seq))
        {
            return Err(InputSanitizationError::InvalidHeader(format!(
                "Header {} contains control characters",
                name
            )));
        }
    }
    Ok(())
}

/// Decode `%XX` escapes once; malformed escapes are kept literally
pub(crate) fn percent_decode_lossy(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            decoded.push((hex_value(bytes[i + 1]) << 4) | hex_value(bytes[i + 2]));
            i += 3;
            continue;
        }
        decoded.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

#[derive(Clone)]
pub struct InputSanitizationLayer {
    config: Arc<InputSanitizationConfig>,
}

impl InputSanitizationLayer {
    pub fn new(config: InputSanitizationConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for InputSanitizationLayer {
    type Service = InputSanitizationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InputSanitizationService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

#[derive(Clone)]
pub struct InputSanitizationService<S> {
    inner: S,
    config: Arc<InputSanitizationConfig>,
}

impl<S> Service<Request> for InputSanitizationService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let screened = screen_uri(request.uri(), &self.config)
            .and_then(|_| screen_headers(request.headers(), &self.config));

        if let Err(rejection) = screened {
            tracing::warn!(
                path = %request.uri().path(),
                reason = %rejection.message(),
                "Rejected request during input screening"
            );
            return Box::pin(async move { Ok(rejection.into_response()) });
        }

        let future = self.inner.call(request);
        Box::pin(future)
    }
}
