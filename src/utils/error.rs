//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::time::Duration;
use thiserror::Error;

/// Reasons a domain input is rejected by the normalizer
///
/// Every rejection path has its own variant and message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Domain input is empty")]
    Empty,

    #[error("Could not parse a URL from input: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL does not contain a hostname")]
    MissingHost,

    #[error("Hostname is empty after removing 'www.' and the trailing dot")]
    EmptyHostname,

    #[error("Hostname '{0}' is reserved for local use")]
    BlockedHostname(String),

    #[error("Hostname '{0}' is under the reserved .localhost domain")]
    LocalhostSubdomain(String),

    #[error("IP address '{0}' is not accepted, use a domain name")]
    IpAddress(String),

    #[error("Hostname '{0}' cannot be encoded as ASCII")]
    Encoding(String),

    #[error("Hostname '{0}' is not a valid public hostname")]
    InvalidHostname(String),

    #[error("Hostname '{0}' must contain at least one dot")]
    MissingDot(String),
}

/// Errors from a single provider request
///
/// Never crosses the pipeline boundary: the aggregator turns it into a note.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status} for {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("Provider request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Provider credential is not configured")]
    MissingCredential,
}

/// Hard failures crossing the pipeline boundary
#[derive(Error, Debug)]
pub enum InsightsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Too many requests, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Deliberately generic: never names the credential or why it is missing
    #[error("Insights provider is not configured")]
    Configuration,

    #[error("Unable to fetch data")]
    Upstream { detail: String },
}

impl InsightsError {
    /// HTTP-style status for the presentation layer
    pub fn status_code(&self) -> u16 {
        match self {
            InsightsError::Validation(_) => 400,
            InsightsError::RateLimited { .. } => 429,
            InsightsError::Configuration => 500,
            InsightsError::Upstream { .. } => 502,
        }
    }
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
