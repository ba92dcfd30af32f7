//! Error types for the notewise transform pipeline
//!
//! The first group of variants is the request taxonomy surfaced to callers
//! (HTTP status codes and CLI messages are derived from it). The remaining
//! variants wrap ambient failures from configuration, I/O and serialization.

use crate::utils::string::excerpt;
use thiserror::Error;

/// Upstream messages and raw replies are cut to this many characters
pub const DIAGNOSTIC_EXCERPT_CHARS: usize = 200;

/// Main error type for notewise operations
#[derive(Error, Debug)]
pub enum NotewiseError {
    /// Bad request shape or empty input
    #[error("Invalid request: {field}: {reason}")]
    InvalidRequest { field: String, reason: String },

    /// Missing or rejected inference credential
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Upstream throttling
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Upstream reported itself overloaded
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Unclassified upstream failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Model reply could not be recovered into a transform result
    #[error("Malformed model response: {excerpt}")]
    MalformedResponse { excerpt: String },

    /// Definition call returned no usable text
    #[error("Empty response for term '{0}'")]
    EmptyResponse(String),

    /// Note or folder not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for notewise operations
pub type Result<T> = std::result::Result<T, NotewiseError>;

impl NotewiseError {
    /// Shorthand for a validation failure on `field`
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        NotewiseError::InvalidRequest {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable wire code for this error
    pub fn code(&self) -> &'static str {
        match self {
            NotewiseError::InvalidRequest { .. } => "invalid_request",
            NotewiseError::Unauthenticated(_) => "unauthenticated",
            NotewiseError::RateLimited(_) => "rate_limited",
            NotewiseError::Unavailable(_) => "unavailable",
            NotewiseError::Upstream(_) => "upstream_error",
            NotewiseError::MalformedResponse { .. } => "malformed_response",
            NotewiseError::EmptyResponse(_) => "empty_response",
            NotewiseError::NotFound(_) => "not_found",
            NotewiseError::Config(_)
            | NotewiseError::Io(_)
            | NotewiseError::Serialization(_)
            | NotewiseError::Http(_)
            | NotewiseError::Other(_) => "internal",
        }
    }

    /// Diagnostic detail attached to the wire error, if any
    pub fn details(&self) -> Option<String> {
        match self {
            NotewiseError::InvalidRequest { field, .. } => Some(field.clone()),
            NotewiseError::MalformedResponse { excerpt } => Some(excerpt.clone()),
            NotewiseError::Upstream(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Rebuild an error received from a remote notewise server.
    ///
    /// `message` is the remote `Display` text; its variant prefix is removed
    /// so the rebuilt error displays exactly as it did on the server.
    pub fn from_code(code: &str, message: &str, details: Option<&str>) -> Self {
        let details = details.unwrap_or_default().to_string();
        let bare = |prefix: &str| message.strip_prefix(prefix).unwrap_or(message).to_string();
        match code {
            "invalid_request" => {
                let rest = bare("Invalid request: ");
                match rest.split_once(": ") {
                    Some((field, reason)) if details.is_empty() || field == details => {
                        NotewiseError::invalid(field, reason)
                    }
                    _ => NotewiseError::invalid(details, rest),
                }
            }
            "unauthenticated" => NotewiseError::Unauthenticated(bare("Unauthenticated: ")),
            "rate_limited" => NotewiseError::RateLimited(bare("Rate limited: ")),
            "unavailable" => NotewiseError::Unavailable(bare("Service unavailable: ")),
            "upstream_error" if !details.is_empty() => NotewiseError::Upstream(details),
            "upstream_error" => NotewiseError::Upstream(bare("Upstream error: ")),
            "malformed_response" => NotewiseError::MalformedResponse { excerpt: details },
            "empty_response" => {
                let term = bare("Empty response for term '");
                NotewiseError::EmptyResponse(match term.strip_suffix('\'') {
                    Some(inner) => inner.to_string(),
                    None => term,
                })
            }
            "not_found" => NotewiseError::NotFound(bare("Not found: ")),
            _ => NotewiseError::Other(message.to_string()),
        }
    }
}

/// Map an upstream failure signal onto the taxonomy.
///
/// `status` is the HTTP status when one was received; `message` is whatever
/// text the service returned alongside it.
pub fn classify_upstream(status: Option<u16>, message: &str) -> NotewiseError {
    let lowered = message.to_lowercase();
    let message = excerpt(message, DIAGNOSTIC_EXCERPT_CHARS);

    match status {
        Some(401) | Some(403) => NotewiseError::Unauthenticated(message),
        Some(429) => NotewiseError::RateLimited(message),
        Some(503) | Some(529) => NotewiseError::Unavailable(message),
        _ if lowered.contains("overloaded") => NotewiseError::Unavailable(message),
        _ if lowered.contains("rate") => NotewiseError::RateLimited(message),
        _ => NotewiseError::Upstream(message),
    }
}

/// Convert anyhow::Error to NotewiseError
impl From<anyhow::Error> for NotewiseError {
    fn from(err: anyhow::Error) -> Self {
        NotewiseError::Other(err.to_string())
    }
}
