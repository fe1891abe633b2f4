//! Query command implementation.
//!
//! The query pipeline:
//! 1. Normalizes the requested domain
//! 2. Admits the caller through the rate governor
//! 3. Fetches and merges provider data
//! 4. Writes the response (file or stdout) and an optional summary

use crate::aggregator::InsightsAggregator;
use crate::domain::{normalize_domain, NormalizedDomain};
use crate::output::{format_summary, response_to_string, write_response};
use crate::parser::schema::{InsightMode, InsightsResult};
use crate::provider::{InsightsSource, ProviderClient};
use crate::ratelimit::{client_identity, RateGovernor};
use crate::utils::config::ProviderConfig;
use crate::utils::error::InsightsError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Inbound query as sent by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub url: String,

    #[serde(default)]
    pub mode: InsightMode,
}

impl QueryRequest {
    pub fn new(url: impl Into<String>, mode: InsightMode) -> Self {
        Self {
            url: url.into(),
            mode,
        }
    }
}

/// Insights plus the resolved domain, mode and response time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub domain: NormalizedDomain,
    pub mode: InsightMode,
    pub fetched_at: DateTime<Utc>,
    pub insights: InsightsResult,
}

/// The full pipeline behind the single query operation
pub struct InsightsService<S: InsightsSource> {
    governor: RateGovernor,
    aggregator: InsightsAggregator<S>,
}

impl<S: InsightsSource> InsightsService<S> {
    pub fn new(governor: RateGovernor, aggregator: InsightsAggregator<S>) -> Self {
        Self {
            governor,
            aggregator,
        }
    }

    /// Run one query
    ///
    /// **Public** - the only entry point the presentation layer needs
    ///
    /// # Arguments
    /// * `request` - Target URL/domain and mode
    /// * `headers` - Inbound request headers, used for caller identity
    ///
    /// # Errors
    /// * `InsightsError::Validation` - bad domain input
    /// * `InsightsError::RateLimited` - caller throttled
    /// * `InsightsError::Configuration` - provider credential missing
    pub async fn query(
        &self,
        request: &QueryRequest,
        headers: &HeaderMap,
    ) -> Result<QueryResponse, InsightsError> {
        let domain = normalize_domain(&request.url)?;

        let caller = client_identity(headers);
        self.governor.admit(&caller)?;

        let insights = self.aggregator.fetch_insights(&domain, request.mode).await?;

        Ok(QueryResponse {
            domain,
            mode: request.mode,
            fetched_at: Utc::now(),
            insights,
        })
    }
}

/// Arguments for the query command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct QueryArgs {
    /// Domain or URL to look up
    pub url: String,

    /// Reporting mode
    pub mode: InsightMode,

    /// Provider settings
    pub provider: ProviderConfig,

    /// Caller IP to attribute the request to (forwarded-for)
    pub client_ip: Option<String>,

    /// Output path for JSON; stdout when absent
    pub output_json: Option<PathBuf>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for QueryArgs {
    fn default() -> Self {
        Self {
            url: String::new(),
            mode: InsightMode::Monthly,
            provider: ProviderConfig::default(),
            client_ip: None,
            output_json: None,
            print_summary: false,
        }
    }
}

/// Execute the query command
///
/// **Public** - main entry point called from main.rs
///
/// Throttling only spans the lifetime of `governor`. The CLI builds a fresh
/// in-memory governor per process, so a single run is never denied; a
/// long-lived caller should pass one shared governor into every call.
///
/// # Errors
/// * Any hard pipeline error (validation, rate limit, configuration, upstream)
/// * File write errors
pub async fn execute_query(args: QueryArgs, governor: RateGovernor) -> Result<QueryResponse> {
    info!("Starting insights query for: {}", args.url);

    let client = ProviderClient::new(args.provider.clone()).map_err(|e| InsightsError::Upstream {
        detail: e.to_string(),
    })?;
    let aggregator = InsightsAggregator::new(client).with_timeout(args.provider.timeout);
    let service = InsightsService::new(governor, aggregator);

    let headers = forwarded_headers(args.client_ip.as_deref());
    let request = QueryRequest::new(args.url.clone(), args.mode);

    let response = service
        .query(&request, &headers)
        .await
        .with_context(|| format!("Insights query for '{}' failed", args.url))?;

    match &args.output_json {
        Some(path) => {
            write_response(&response, path).context("Failed to write insights JSON")?;
            info!("✓ Insights written to: {}", path.display());
        }
        None => println!("{}", response_to_string(&response)?),
    }

    if args.print_summary {
        println!("\n{}", format_summary(&response));
    }

    Ok(response)
}

/// Build inbound headers carrying the caller IP
///
/// **Private** - internal helper for execute_query
fn forwarded_headers(client_ip: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(ip) = client_ip {
        match HeaderValue::from_str(ip) {
            Ok(value) => {
                headers.insert("x-forwarded-for", value);
            }
            Err(e) => debug!("Ignoring client IP '{}': {}", ip, e),
        }
    }
    headers
}

/// Validate query arguments
///
/// **Public** - can be called before execute_query for early validation
pub fn validate_args(args: &QueryArgs) -> Result<()> {
    if args.url.trim().is_empty() {
        anyhow::bail!("URL cannot be empty");
    }

    let base = &args.provider.base_url;
    if !base.starts_with("http://") && !base.starts_with("https://") {
        anyhow::bail!("Provider base URL must start with http:// or https://");
    }

    if args.provider.timeout.is_zero() {
        anyhow::bail!("Provider timeout must be greater than 0");
    }

    Ok(())
}
