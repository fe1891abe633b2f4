//! HTTP client for the third-party analytics provider.

use super::types::{Endpoint, ProviderQuery, RawPayload};
use crate::domain::NormalizedDomain;
use crate::utils::config::{ProviderConfig, API_KEY_HEADER, API_KEY_PARAM};
use crate::utils::error::ProviderError;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Request};
use std::sync::Arc;

/// Anything that can answer one endpoint request for a domain
///
/// The aggregator only talks to this trait, so tests can swap in
/// canned payloads.
#[async_trait]
pub trait InsightsSource: Send + Sync {
    async fn fetch(
        &self,
        domain: &NormalizedDomain,
        endpoint: Endpoint,
        query: &ProviderQuery,
    ) -> Result<RawPayload, ProviderError>;

    /// Whether a credential is available; checked before any request
    fn is_configured(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: InsightsSource + ?Sized> InsightsSource for Arc<T> {
    async fn fetch(
        &self,
        domain: &NormalizedDomain,
        endpoint: Endpoint,
        query: &ProviderQuery,
    ) -> Result<RawPayload, ProviderError> {
        (**self).fetch(domain, endpoint, query).await
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }
}

/// reqwest-backed provider client
pub struct ProviderClient {
    client: Client,
    config: ProviderConfig,
}

impl ProviderClient {
    /// Create a new provider client
    ///
    /// An unconfigured credential is allowed here; the aggregator reports it
    /// before issuing any request.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProviderError::RequestFailed)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// `{base}/{domain}/{endpoint-path}`
    pub fn endpoint_url(&self, domain: &NormalizedDomain, endpoint: Endpoint) -> String {
        format!("{}/{}/{}", self.config.base_url, domain, endpoint.path())
    }

    /// Build the GET request, placing the credential per configuration
    ///
    /// **Public** - exposed so request shape can be inspected without I/O
    pub fn build_request(
        &self,
        domain: &NormalizedDomain,
        endpoint: Endpoint,
        query: &ProviderQuery,
    ) -> Result<Request, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential)?;

        let mut params = query.params();
        let mut builder = self.client.get(self.endpoint_url(domain, endpoint));

        if self.config.key_in_header {
            builder = builder.header(API_KEY_HEADER, api_key);
        } else {
            params.push((API_KEY_PARAM, api_key.to_string()));
        }

        builder
            .query(&params)
            .build()
            .map_err(ProviderError::RequestFailed)
    }
}

#[async_trait]
impl InsightsSource for ProviderClient {
    async fn fetch(
        &self,
        domain: &NormalizedDomain,
        endpoint: Endpoint,
        query: &ProviderQuery,
    ) -> Result<RawPayload, ProviderError> {
        let request = self.build_request(domain, endpoint, query)?;

        // Never log the full URL: it may carry the credential
        debug!(
            "GET {} granularity={} range={:?}..{:?}",
            self.endpoint_url(domain, endpoint),
            query.granularity,
            query.start_date,
            query.end_date
        );

        let response = self
            .client
            .execute(request)
            .await
            .map_err(ProviderError::RequestFailed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                endpoint: endpoint.path().to_string(),
            });
        }

        let payload: RawPayload = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("{} body is not JSON: {}", endpoint.path(), e))
        })?;

        Ok(payload)
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}
