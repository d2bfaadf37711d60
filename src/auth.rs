//! Shared-secret API key gate

use std::fmt;

use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

/// Header carrying the client's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Check a client-supplied key against the configured secret.
///
/// An absent or empty key never matches. Equal-length keys are compared in
/// constant time.
pub fn verify(supplied: Option<&str>, expected: &str) -> bool {
    match supplied {
        Some(key) if !key.is_empty() => key.as_bytes().ct_eq(expected.as_bytes()).into(),
        _ => false,
    }
}

/// Read the `X-API-Key` header. Non-UTF-8 values are treated as absent.
pub fn api_key_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Configured API secret. `Debug` output never includes the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn matches(&self, supplied: Option<&str>) -> bool {
        verify(supplied, &self.0)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}
