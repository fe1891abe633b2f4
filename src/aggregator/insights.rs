//! Concurrent fan-out to the provider and fan-in into one result.

use super::merge::merge_outcomes;
use crate::domain::NormalizedDomain;
use crate::parser::schema::{InsightMode, InsightsResult};
use crate::provider::client::InsightsSource;
use crate::provider::types::{Endpoint, ProviderQuery, RawPayload};
use crate::utils::config::DEFAULT_PROVIDER_TIMEOUT;
use crate::utils::error::{InsightsError, ProviderError};
use chrono::{NaiveDate, Utc};
use log::{debug, error, info};
use std::time::{Duration, Instant};

/// Orchestrates the five provider calls behind one insights query
///
/// Holds no mutable state; one instance can serve any number of queries.
pub struct InsightsAggregator<S: InsightsSource> {
    source: S,
    timeout: Duration,
}

impl<S: InsightsSource> InsightsAggregator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Bound applied to each provider call individually
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and merge insights for a domain
    ///
    /// **Public** - main entry point for aggregation
    ///
    /// # Errors
    /// * `InsightsError::Configuration` - no credential; raised before any request
    ///
    /// Per-field failures never error; they become coverage notes.
    pub async fn fetch_insights(
        &self,
        domain: &NormalizedDomain,
        mode: InsightMode,
    ) -> Result<InsightsResult, InsightsError> {
        self.fetch_insights_on(domain, mode, Utc::now().date_naive())
            .await
    }

    /// Same as `fetch_insights` with an explicit "today" for the monthly window
    pub async fn fetch_insights_on(
        &self,
        domain: &NormalizedDomain,
        mode: InsightMode,
        today: NaiveDate,
    ) -> Result<InsightsResult, InsightsError> {
        if !self.source.is_configured() {
            error!("Insights provider credential is not configured");
            return Err(InsightsError::Configuration);
        }

        let start_time = Instant::now();
        let query = ProviderQuery::for_mode(mode, today);
        info!("Fetching {} insights for {}", mode, domain);

        // All five settle before fan-in; a timeout drops only its own call
        let (visits, bounce_rate, pages_per_visit, avg_duration, channels) = tokio::join!(
            self.fetch_bounded(domain, Endpoint::Visits, &query),
            self.fetch_bounded(domain, Endpoint::BounceRate, &query),
            self.fetch_bounded(domain, Endpoint::PagesPerVisit, &query),
            self.fetch_bounded(domain, Endpoint::AverageDuration, &query),
            self.fetch_bounded(domain, Endpoint::ChannelOverview, &query),
        );

        // Same order as Endpoint::ALL
        let result = merge_outcomes([
            (Endpoint::Visits, visits),
            (Endpoint::BounceRate, bounce_rate),
            (Endpoint::PagesPerVisit, pages_per_visit),
            (Endpoint::AverageDuration, avg_duration),
            (Endpoint::ChannelOverview, channels),
        ]);

        info!(
            "Insights for {} ready in {:.2}s (partial: {}, notes: {})",
            domain,
            start_time.elapsed().as_secs_f64(),
            result.coverage.partial,
            result.coverage.notes.len()
        );

        Ok(result)
    }

    /// One provider call under the per-call timeout
    ///
    /// **Private** - internal helper for fetch_insights_on
    async fn fetch_bounded(
        &self,
        domain: &NormalizedDomain,
        endpoint: Endpoint,
        query: &ProviderQuery,
    ) -> Result<RawPayload, ProviderError> {
        match tokio::time::timeout(self.timeout, self.source.fetch(domain, endpoint, query)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                debug!("{} cancelled after {:?}", endpoint.label(), self.timeout);
                Err(ProviderError::Timeout(self.timeout))
            }
        }
    }
}
