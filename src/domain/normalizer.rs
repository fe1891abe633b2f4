//! Turns arbitrary user input into a canonical public hostname.
//!
//! Accepts bare domains, full URLs and internationalized names, and rejects
//! anything that cannot be a public website (local names, IP literals,
//! malformed hostnames). Pure: no I/O, no shared state.

use crate::utils::config::{BLOCKED_HOSTNAMES, MAX_HOSTNAME_LEN};
use crate::utils::error::ValidationError;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::OnceLock;
use url::{Host, Url};

const DEFAULT_SCHEME: &str = "https://";

/// A validated, lowercase, ASCII-compatible hostname without `www.`
///
/// Normalizing the string form again yields the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedDomain(String);

impl NormalizedDomain {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for NormalizedDomain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_domain(s)
    }
}

impl TryFrom<String> for NormalizedDomain {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        normalize_domain(&value)
    }
}

impl From<NormalizedDomain> for String {
    fn from(domain: NormalizedDomain) -> Self {
        domain.0
    }
}

/// Normalize user input into a public hostname
///
/// **Public** - first stage of every insights query
///
/// # Arguments
/// * `input` - Bare domain or URL, e.g. `"https://www.Example.com/path"`
///
/// # Returns
/// The canonical hostname, e.g. `example.com`
///
/// # Errors
/// One `ValidationError` variant per rejection reason.
pub fn normalize_domain(input: &str) -> Result<NormalizedDomain, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let url = parse_with_default_scheme(trimmed)?;
    let raw_host = url.host_str().ok_or(ValidationError::MissingHost)?;

    let host = strip_decorations(&raw_host.to_lowercase());
    if host.is_empty() {
        return Err(ValidationError::EmptyHostname);
    }

    check_not_local(&host)?;

    if matches!(url.host(), Some(Host::Ipv4(_)) | Some(Host::Ipv6(_))) || is_ip_literal(&host) {
        return Err(ValidationError::IpAddress(host));
    }

    let ascii = to_ascii(&host)?;
    validate_public_hostname(&ascii)?;

    debug!("Normalized '{}' to '{}'", trimmed, ascii);
    Ok(NormalizedDomain(ascii))
}

/// Parse input as a URL, assuming `https://` when no scheme is present
///
/// **Private** - internal helper for normalize_domain
fn parse_with_default_scheme(input: &str) -> Result<Url, ValidationError> {
    let candidate = if has_scheme(input) {
        input.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, input)
    };

    let url = Url::parse(&candidate).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ValidationError::UnsupportedScheme(other.to_string())),
    }
}

/// `scheme://` prefix, ignoring `://` inside a path or query
fn has_scheme(input: &str) -> bool {
    input.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Strip every leading `www.` and one trailing dot
///
/// **Private** - internal helper for normalize_domain
///
/// Repeated prefixes are all removed so the result never starts with
/// `www.` and normalizing it again is a no-op.
fn strip_decorations(host: &str) -> String {
    let mut host = host;
    while let Some(rest) = host.strip_prefix("www.") {
        host = rest;
    }
    let host = host.strip_suffix('.').unwrap_or(host);
    host.to_string()
}

fn check_not_local(host: &str) -> Result<(), ValidationError> {
    if BLOCKED_HOSTNAMES.contains(&host) {
        return Err(ValidationError::BlockedHostname(host.to_string()));
    }
    if host.ends_with(".localhost") {
        return Err(ValidationError::LocalhostSubdomain(host.to_string()));
    }
    Ok(())
}

fn is_ip_literal(host: &str) -> bool {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok()
}

/// Encode internationalized labels to punycode
///
/// **Private** - internal helper for normalize_domain
fn to_ascii(host: &str) -> Result<String, ValidationError> {
    match Host::parse(host) {
        Ok(Host::Domain(ascii)) => Ok(ascii.to_lowercase()),
        Ok(Host::Ipv4(_)) | Ok(Host::Ipv6(_)) => Err(ValidationError::IpAddress(host.to_string())),
        Err(_) => Err(ValidationError::Encoding(host.to_string())),
    }
}

fn label_pattern() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| {
        Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").expect("label pattern is a valid regex")
    })
}

/// Check the public-hostname grammar, then require a label separator
///
/// **Private** - internal helper for normalize_domain
fn validate_public_hostname(ascii: &str) -> Result<(), ValidationError> {
    let grammar_ok = ascii.len() <= MAX_HOSTNAME_LEN
        && ascii.split('.').all(|label| label_pattern().is_match(label));

    if !grammar_ok {
        return Err(ValidationError::InvalidHostname(ascii.to_string()));
    }
    if !ascii.contains('.') {
        return Err(ValidationError::MissingDot(ascii.to_string()));
    }
    Ok(())
}
