mod common;

use chrono::{TimeZone, Utc};
use common::{Script, ScriptedSource};
use domain_insights::aggregator::InsightsAggregator;
use domain_insights::commands::{InsightsService, QueryRequest};
use domain_insights::parser::InsightMode;
use domain_insights::provider::Endpoint;
use domain_insights::ratelimit::{InMemoryRateStore, ManualClock, RateGovernor};
use domain_insights::utils::{InsightsError, ValidationError};
use reqwest::header::{HeaderMap, HeaderValue};
use std::sync::Arc;

fn service_with(source: Arc<ScriptedSource>, limit: u32) -> InsightsService<Arc<ScriptedSource>> {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap());
    let governor = RateGovernor::new(Arc::new(InMemoryRateStore::with_clock(clock)), limit, 60_000);
    InsightsService::new(governor, InsightsAggregator::new(source))
}

fn from_ip(ip: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_static(ip));
    headers
}

#[tokio::test]
async fn test_query_echoes_domain_and_mode() {
    let service = service_with(Arc::new(ScriptedSource::healthy()), 10);
    let request = QueryRequest::new("https://www.Example.com/pricing", InsightMode::Last28);

    let response = service.query(&request, &from_ip("203.0.113.1")).await.unwrap();

    assert_eq!(response.domain.as_str(), "example.com");
    assert_eq!(response.mode, InsightMode::Last28);
    assert!(!response.insights.coverage.partial);
}

#[tokio::test]
async fn test_invalid_domain_rejected_before_provider() {
    let source = Arc::new(ScriptedSource::healthy());
    let service = service_with(source.clone(), 10);

    let err = service
        .query(&QueryRequest::new("localhost", InsightMode::Monthly), &HeaderMap::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InsightsError::Validation(ValidationError::BlockedHostname(_))
    ));
    assert_eq!(err.status_code(), 400);
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_rate_limit_is_per_caller() {
    let source = Arc::new(ScriptedSource::healthy());
    let service = service_with(source.clone(), 1);
    let request = QueryRequest::new("example.com", InsightMode::Monthly);

    service.query(&request, &from_ip("198.51.100.1")).await.unwrap();

    let err = service
        .query(&request, &from_ip("198.51.100.1"))
        .await
        .unwrap_err();
    assert!(matches!(err, InsightsError::RateLimited { retry_after_secs: 60 }));
    assert_eq!(err.status_code(), 429);

    service.query(&request, &from_ip("198.51.100.2")).await.unwrap();
    assert_eq!(source.calls(), 10);
}

#[tokio::test]
async fn test_headerless_callers_share_a_bucket() {
    let service = service_with(Arc::new(ScriptedSource::healthy()), 1);
    let request = QueryRequest::new("example.com", InsightMode::Monthly);

    service.query(&request, &HeaderMap::new()).await.unwrap();
    assert!(service.query(&request, &HeaderMap::new()).await.is_err());
}

#[tokio::test]
async fn test_zero_coverage_is_a_soft_result() {
    let mut source = ScriptedSource::healthy();
    for endpoint in Endpoint::ALL {
        source = source.with(endpoint, Script::Status(404));
    }
    let service = service_with(Arc::new(source), 10);

    let response = service
        .query(&QueryRequest::new("tiny-site.example", InsightMode::Monthly), &HeaderMap::new())
        .await
        .unwrap();

    assert!(response.insights.coverage.partial);
    assert_eq!(response.insights.coverage.notes.len(), 5);
}

#[tokio::test]
async fn test_unconfigured_provider_is_hard_error() {
    let service = service_with(Arc::new(ScriptedSource::healthy().unconfigured()), 10);

    let err = service
        .query(&QueryRequest::new("example.com", InsightMode::Monthly), &HeaderMap::new())
        .await
        .unwrap_err();

    assert!(matches!(err, InsightsError::Configuration));
    assert_eq!(err.to_string(), "Insights provider is not configured");
}
