use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tree_translate::FormatError;

/// Error types for the translation pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MtError {
    /// Missing or unusable gateway configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Language code not in the provider's table, or `auto` as a target
    #[error("Invalid language: {0}")]
    InvalidLanguage(String),

    /// One string is longer than a single provider request may be
    #[error("String {index} is {length} characters long; at most {limit} fit in one request")]
    QueryTooLong {
        index: usize,
        length: usize,
        limit: usize,
    },

    /// The input could not be parsed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A gateway call failed; the whole batch is discarded
    #[error("Translation failed: {0}")]
    Gateway(#[from] GatewayError),

    /// A newer request was started on the same session
    #[error("Translation request was superseded by a newer request")]
    Superseded,
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;

/// Classification of a failed gateway call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorKind {
    /// Credentials rejected, signature invalid, or client IP not allowed
    Authentication,
    /// Request frequency, daily quota or account balance exhausted
    QuotaExceeded,
    /// The provider answered without any translation
    EmptyResult,
    Timeout,
    /// Could not reach the proxy
    Network,
    /// Any other error reported by the provider
    Provider,
}

impl GatewayErrorKind {
    /// Classify a provider error code.
    pub fn from_provider_code(code: &str) -> Self {
        match code {
            "52001" => GatewayErrorKind::Timeout,
            "52003" | "54001" | "58000" | "90107" => GatewayErrorKind::Authentication,
            "54003" | "54004" | "54005" => GatewayErrorKind::QuotaExceeded,
            _ => GatewayErrorKind::Provider,
        }
    }

    /// Classify an HTTP status returned by the proxy itself.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            401 | 403 => Some(GatewayErrorKind::Authentication),
            429 => Some(GatewayErrorKind::QuotaExceeded),
            408 | 504 => Some(GatewayErrorKind::Timeout),
            _ => None,
        }
    }
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            GatewayErrorKind::Authentication => "authentication failed",
            GatewayErrorKind::QuotaExceeded => "quota exceeded",
            GatewayErrorKind::EmptyResult => "empty result",
            GatewayErrorKind::Timeout => "request timed out",
            GatewayErrorKind::Network => "network error",
            GatewayErrorKind::Provider => "provider error",
        };
        write!(f, "{}", description)
    }
}

/// A failed call to the translation gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}{}: {message}", code_suffix(.code))]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    /// Provider error code, when the provider sent one
    pub code: Option<String>,
    pub message: String,
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref()
        .map(|code| format!(" ({})", code))
        .unwrap_or_default()
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        GatewayError {
            kind,
            code: None,
            message: message.into(),
        }
    }

    /// An error reported by the provider with its own error code.
    pub fn from_provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        GatewayError {
            kind: GatewayErrorKind::from_provider_code(&code),
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn empty_result() -> Self {
        GatewayError::new(GatewayErrorKind::EmptyResult, "Translation result is empty")
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            GatewayErrorKind::Timeout
        } else if let Some(kind) = err.status().and_then(|s| GatewayErrorKind::from_status(s.as_u16())) {
            kind
        } else if err.is_decode() || err.is_status() {
            GatewayErrorKind::Provider
        } else {
            GatewayErrorKind::Network
        };
        GatewayError::new(kind, err.to_string())
    }
}
