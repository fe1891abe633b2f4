//! Configuration and constants for the insights pipeline.

use std::fmt;
use std::time::Duration;

/// Default bound for a single provider request
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);

/// Default provider REST base path (`{base}/{domain}/{endpoint}`)
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.similarweb.com/v1/website";

/// Header carrying the credential when header auth is enabled
pub const API_KEY_HEADER: &str = "api-key";

/// Query parameter carrying the credential otherwise
pub const API_KEY_PARAM: &str = "api_key";

// Admission defaults: 10 aggregation requests per caller per minute
pub const DEFAULT_RATE_LIMIT: u32 = 10;
pub const DEFAULT_RATE_WINDOW_MS: u64 = 60_000;

/// Shared bucket for callers without forwarded-IP headers
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Request headers consulted for caller identity, in priority order
pub const CLIENT_IP_HEADERS: &[&str] = &["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];

/// Hostnames that never point at a public site
pub const BLOCKED_HOSTNAMES: &[&str] = &["localhost", "local", "internal"];

pub const MAX_HOSTNAME_LEN: usize = 253;

// Endpoint paths under `{base}/{domain}/`
pub const VISITS_PATH: &str = "total-traffic-and-engagement/visits";
pub const BOUNCE_RATE_PATH: &str = "total-traffic-and-engagement/bounce-rate";
pub const PAGES_PER_VISIT_PATH: &str = "total-traffic-and-engagement/pages-per-visit";
pub const AVERAGE_DURATION_PATH: &str = "total-traffic-and-engagement/average-visit-duration";
pub const CHANNEL_OVERVIEW_PATH: &str = "traffic-sources/overview-share";

// Field names for payload parsing (provider responses drift between shapes)
pub const VISITS_FIELD_NAMES: &[&str] = &["visits", "data"];
pub const BOUNCE_RATE_FIELD_NAMES: &[&str] = &["bounce_rate", "data"];
pub const PAGES_PER_VISIT_FIELD_NAMES: &[&str] = &["pages_per_visit", "data"];
pub const AVERAGE_DURATION_FIELD_NAMES: &[&str] = &["average_visit_duration", "data"];
pub const CHANNEL_FIELD_NAMES: &[&str] = &["channels", "overview", "data"];

pub const DATE_FIELD: &str = "date";
pub const VALUE_FIELD: &str = "value";
pub const CHANNEL_LABEL_FIELDS: &[&str] = &["channel", "source", "name"];
pub const CHANNEL_VALUE_FIELDS: &[&str] = &["share", "value"];

/// Number of full calendar months covered by monthly mode
pub const MONTHLY_WINDOW_MONTHS: u32 = 3;

/// Outbound provider settings
///
/// **Public** - built by the CLI from flags/env and handed to `ProviderClient`
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider credential; `None` means unconfigured
    pub api_key: Option<String>,

    /// REST base path
    pub base_url: String,

    /// Send the credential as a header instead of a query parameter
    pub key_in_header: bool,

    /// Per-request bound
    pub timeout: Duration,
}

// Never print the credential
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("key_in_header", &self.key_in_header)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            key_in_header: false,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    /// Create a config with the given credential and defaults elsewhere
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_key_in_header(mut self, key_in_header: bool) -> Self {
        self.key_in_header = key_in_header;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a usable credential is present
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_unconfigured() {
        assert!(!ProviderConfig::new(Some("   ".to_string())).is_configured());
        assert!(!ProviderConfig::new(None).is_configured());
        assert!(ProviderConfig::new(Some("k".to_string())).is_configured());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ProviderConfig::new(Some("s3cr3t".to_string()));
        assert!(!format!("{:?}", config).contains("s3cr3t"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ProviderConfig::new(None).with_base_url("https://example.test/v1/");
        assert_eq!(config.base_url, "https://example.test/v1");
    }
}
