//! In-memory provider used by the aggregation and query tests.

#![allow(dead_code)]

use async_trait::async_trait;
use domain_insights::domain::NormalizedDomain;
use domain_insights::provider::{Endpoint, InsightsSource, ProviderQuery, RawPayload};
use domain_insights::utils::ProviderError;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What the source does for one endpoint
#[derive(Debug, Clone)]
pub enum Script {
    Payload(Value),
    Status(u16),
    Hang,
}

#[derive(Debug, Default)]
pub struct ScriptedSource {
    scripts: HashMap<Endpoint, Script>,
    configured: bool,
    calls: AtomicUsize,
    queries: Mutex<Vec<ProviderQuery>>,
}

impl ScriptedSource {
    /// Every endpoint answers with a healthy payload
    pub fn healthy() -> Self {
        let mut scripts = HashMap::new();
        scripts.insert(
            Endpoint::Visits,
            Script::Payload(json!({"visits": [
                {"date": "2024-02", "value": 12000},
                {"date": "2024-01", "value": 10000},
                {"date": "2024-03", "value": 15000}
            ]})),
        );
        scripts.insert(
            Endpoint::BounceRate,
            Script::Payload(json!({"data": {"bounce_rate": [{"date": "2024-01", "value": 42}]}})),
        );
        scripts.insert(
            Endpoint::PagesPerVisit,
            Script::Payload(json!({"pages_per_visit": {"data": [{"date": "2024-01", "value": 3.5}]}})),
        );
        scripts.insert(
            Endpoint::AverageDuration,
            Script::Payload(json!([{"date": "2024-01", "value": 181.0}])),
        );
        scripts.insert(
            Endpoint::ChannelOverview,
            Script::Payload(json!({"channels": [
                {"channel": "Referral", "share": 0.2},
                {"channel": "Search", "share": 55},
                {"source": "Direct", "value": 25}
            ]})),
        );

        Self {
            scripts,
            configured: true,
            ..Default::default()
        }
    }

    pub fn with(mut self, endpoint: Endpoint, script: Script) -> Self {
        self.scripts.insert(endpoint, script);
        self
    }

    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<ProviderQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl InsightsSource for ScriptedSource {
    async fn fetch(
        &self,
        _domain: &NormalizedDomain,
        endpoint: Endpoint,
        query: &ProviderQuery,
    ) -> Result<RawPayload, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        match self.scripts.get(&endpoint).cloned() {
            Some(Script::Payload(value)) => Ok(value),
            Some(Script::Status(status)) => Err(ProviderError::Status {
                status,
                endpoint: endpoint.path().to_string(),
            }),
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Value::Null)
            }
            None => Err(ProviderError::Status {
                status: 404,
                endpoint: endpoint.path().to_string(),
            }),
        }
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}
