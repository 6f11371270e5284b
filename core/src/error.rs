//! Error types for the request/response pipeline.
//!
//! # Design
//! Validation problems are caught before any network call and are always
//! recoverable by editing the form. Transport problems come from the host's
//! HTTP client and are carried verbatim. A non-2xx response is not an error
//! here at all; it renders as a normal outcome flagged by its status class.

use std::fmt;

/// Example shown to the user when the URL is rejected.
pub const URL_EXAMPLE: &str = "http://localhost:3000/api/endpoint";

/// Malformed input detected by `build_request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The URL does not target `http://localhost` or `https://localhost`.
    InvalidUrl,

    /// The JSON body could not be used. Carries the parser's message.
    BadRequest(String),
}

impl ValidationError {
    /// Short title shown next to the pseudo status `400`.
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::InvalidUrl => "Invalid URL",
            ValidationError::BadRequest(_) => "Bad Request",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidUrl => write!(
                f,
                "Error: Only localhost URLs are allowed for security reasons.\n\nExample: {URL_EXAMPLE}"
            ),
            ValidationError::BadRequest(msg) => write!(f, "JSON Parse Error: {msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failures reported by a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a response: connection refused, DNS,
    /// TLS, a CORS rejection in a browser host, or a transport timeout.
    Unreachable(String),

    /// A response head arrived but its body could not be read as text.
    Body(String),
}

impl TransportError {
    pub fn message(&self) -> &str {
        match self {
            TransportError::Unreachable(msg) | TransportError::Body(msg) => msg,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Unreachable(msg) => write!(f, "request failed: {msg}"),
            TransportError::Body(msg) => write!(f, "failed to read response body: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}
