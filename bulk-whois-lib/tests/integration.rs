//! Integration tests for the lookup cascade and bulk orchestration.
//!
//! HTTP sources are mocked with httpmock; the legacy WHOIS stage is pointed
//! at harmless system commands so no test touches a real registry.

use bulk_whois_lib::{
    extract_rdap_record, parse_whois_response, FetchConfig, RecordSource, WhoisFetcher,
};
use httpmock::prelude::*;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Base config wired to a mock server, with fast retries and no real whois.
fn test_config(server: &MockServer) -> FetchConfig {
    FetchConfig::default()
        .with_rdap_base_url(server.url("/rdap"))
        .with_api_url(server.url("/whois"))
        .with_retries(1)
        .with_backoff(Duration::from_millis(10), Duration::from_millis(40))
        // `false` exits immediately with a non-zero status, so the legacy
        // stage fails fast without network traffic
        .with_whois_command("false")
}

fn rdap_body() -> serde_json::Value {
    serde_json::json!({
        "events": [
            { "eventAction": "registration", "eventDate": "1995-08-14T04:00:00Z" },
            { "eventAction": "expiration", "eventDate": "2025-08-13T04:00:00Z" },
            { "eventAction": "last changed", "eventDate": "2024-07-01T09:00:00Z" }
        ],
        "entities": [
            {
                "roles": ["registrar"],
                "vcardArray": ["vcard", [["fn", {}, "text", "Example Registrar LLC"]]]
            }
        ]
    })
}

#[tokio::test]
async fn test_paid_api_success_short_circuits_cascade() {
    let server = MockServer::start();

    let paid_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/whois")
            .query_param("domain", "example.com")
            .query_param("apiKey", "test-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "registrarName": "Paid Registrar Inc",
                "createdDate": "2010-06-01T00:00:00Z"
            }));
    });
    let rdap_mock = server.mock(|when, then| {
        when.method(GET).path_contains("/rdap/");
        then.status(200).json_body(rdap_body());
    });

    let config = test_config(&server).with_api_key("test-key");
    let fetcher = WhoisFetcher::with_config(config).unwrap();

    let record = fetcher.resolve_domain("example.com").await;

    assert_eq!(record.source, RecordSource::PaidApi);
    assert_eq!(record.registrar.as_deref(), Some("Paid Registrar Inc"));
    assert_eq!(record.creation_date.as_deref(), Some("2010-06-01"));
    assert!(record.error.is_none());

    // First-stage success must not touch the later stages
    assert_eq!(paid_mock.hits(), 1);
    assert_eq!(rdap_mock.hits(), 0);
}

#[tokio::test]
async fn test_paid_api_exhaustion_falls_through_to_rdap() {
    let server = MockServer::start();

    let paid_mock = server.mock(|when, then| {
        when.method(GET).path("/whois");
        then.status(500);
    });
    let rdap_mock = server.mock(|when, then| {
        when.method(GET).path("/rdap/example.com");
        then.status(200).json_body(rdap_body());
    });

    let config = test_config(&server).with_api_key("test-key").with_retries(2);
    let fetcher = WhoisFetcher::with_config(config).unwrap();

    let record = fetcher.resolve_domain("example.com").await;

    assert_eq!(record.source, RecordSource::Rdap);
    assert_eq!(record.registrar.as_deref(), Some("Example Registrar LLC"));
    assert_eq!(record.creation_date.as_deref(), Some("1995-08-14"));
    assert_eq!(record.expiration_date.as_deref(), Some("2025-08-13"));
    assert_eq!(record.updated_date.as_deref(), Some("2024-07-01"));

    // The failing stage used every retry before falling through
    assert_eq!(paid_mock.hits(), 2);
    assert_eq!(rdap_mock.hits(), 1);
}

#[tokio::test]
async fn test_total_exhaustion_yields_failed_record() {
    let server = MockServer::start();

    let rdap_mock = server.mock(|when, then| {
        when.method(GET).path_contains("/rdap/");
        then.status(503);
    });

    // No API key: paid stage is skipped entirely
    let config = test_config(&server).with_retries(2);
    let fetcher = WhoisFetcher::with_config(config).unwrap();

    let record = fetcher.resolve_domain("example.com").await;

    assert_eq!(record.source, RecordSource::Failed);
    assert_eq!(record.error.as_deref(), Some("All methods failed"));
    assert!(record.registrar.is_none());
    assert!(record.creation_date.is_none());
    assert!(record.expiration_date.is_none());
    assert!(record.updated_date.is_none());
    assert_eq!(rdap_mock.hits(), 2);
}

#[tokio::test]
async fn test_input_normalization_reaches_the_wire() {
    let server = MockServer::start();

    let rdap_mock = server.mock(|when, then| {
        when.method(GET).path("/rdap/example.com");
        then.status(200).json_body(rdap_body());
    });

    let fetcher = WhoisFetcher::with_config(test_config(&server)).unwrap();
    let record = fetcher.resolve_domain("  HTTPS://WWW.Example.COM/path  ").await;

    assert_eq!(record.domain, "example.com");
    assert_eq!(record.source, RecordSource::Rdap);
    assert_eq!(rdap_mock.hits(), 1);
}

#[tokio::test]
async fn test_bulk_returns_one_record_per_domain_with_monotonic_progress() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path_contains("/rdap/");
        then.status(200).json_body(rdap_body());
    });

    let domains: Vec<String> = (0..5).map(|i| format!("domain-{}.com", i)).collect();
    let fetcher = WhoisFetcher::with_config(test_config(&server)).unwrap();

    let progress_log: Mutex<Vec<(usize, usize, String)>> = Mutex::new(Vec::new());
    let progress = |completed: usize, total: usize, domain: &str| {
        progress_log
            .lock()
            .unwrap()
            .push((completed, total, domain.to_string()));
    };

    let results = fetcher.fetch_domains(&domains, Some(&progress)).await;

    assert_eq!(results.len(), domains.len());

    // Exactly one record per input domain, regardless of completion order
    let mut resolved: Vec<&str> = results.iter().map(|r| r.domain.as_str()).collect();
    resolved.sort_unstable();
    let mut expected: Vec<&str> = domains.iter().map(String::as_str).collect();
    expected.sort_unstable();
    assert_eq!(resolved, expected);

    // Progress fired once per domain with strictly increasing counts
    let log = progress_log.lock().unwrap();
    assert_eq!(log.len(), domains.len());
    for (i, (completed, total, domain)) in log.iter().enumerate() {
        assert_eq!(*completed, i + 1);
        assert_eq!(*total, domains.len());
        assert!(domains.contains(domain));
    }
}

#[tokio::test]
async fn test_bulk_failures_are_domain_local() {
    let server = MockServer::start();

    // Only good.com resolves; bad.com exhausts every stage
    server.mock(|when, then| {
        when.method(GET).path("/rdap/good.com");
        then.status(200).json_body(rdap_body());
    });
    server.mock(|when, then| {
        when.method(GET).path("/rdap/bad.com");
        then.status(500);
    });

    let domains = vec!["good.com".to_string(), "bad.com".to_string()];
    let fetcher = WhoisFetcher::with_config(test_config(&server)).unwrap();
    let results = fetcher.fetch_domains(&domains, None).await;

    assert_eq!(results.len(), 2);
    let good = results.iter().find(|r| r.domain == "good.com").unwrap();
    let bad = results.iter().find(|r| r.domain == "bad.com").unwrap();
    assert_eq!(good.source, RecordSource::Rdap);
    assert_eq!(bad.source, RecordSource::Failed);
    assert_eq!(bad.error.as_deref(), Some("All methods failed"));
}

#[tokio::test]
async fn test_concurrency_limit_one_serializes_lookups() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path_contains("/rdap/");
        then.status(200)
            .delay(Duration::from_millis(300))
            .json_body(rdap_body());
    });

    let domains: Vec<String> = (0..3).map(|i| format!("serial-{}.com", i)).collect();
    let fetcher =
        WhoisFetcher::with_config(test_config(&server).with_concurrency(1)).unwrap();

    let start = Instant::now();
    let results = fetcher.fetch_domains(&domains, None).await;
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 3);
    // One worker: total time is at least the sum of the per-domain delays
    assert!(
        elapsed >= Duration::from_millis(900),
        "serialized run finished too fast: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_concurrency_limit_equal_to_batch_runs_in_parallel() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path_contains("/rdap/");
        then.status(200)
            .delay(Duration::from_millis(300))
            .json_body(rdap_body());
    });

    let domains: Vec<String> = (0..3).map(|i| format!("parallel-{}.com", i)).collect();
    let fetcher =
        WhoisFetcher::with_config(test_config(&server).with_concurrency(3)).unwrap();

    let start = Instant::now();
    let results = fetcher.fetch_domains(&domains, None).await;
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 3);
    // No domain waits for a worker slot, so wall clock stays well under
    // the serialized sum of 900ms
    assert!(
        elapsed < Duration::from_millis(800),
        "parallel run took too long: {:?}",
        elapsed
    );
}

#[test]
fn test_extraction_helpers_work_standalone() {
    // The pure extraction functions are part of the public API and usable
    // without building any client
    let rdap = extract_rdap_record("example.com", &rdap_body());
    assert_eq!(rdap.source, RecordSource::Rdap);
    assert_eq!(rdap.registrar.as_deref(), Some("Example Registrar LLC"));
    assert_eq!(rdap.creation_date.as_deref(), Some("1995-08-14"));

    let text = "Registrar: Plain Registrar\nCreation Date: 2001-01-01T00:00:00Z\n";
    let whois = parse_whois_response("example.com", text).unwrap();
    assert_eq!(whois.source, RecordSource::LegacyWhois);
    assert_eq!(whois.registrar.as_deref(), Some("Plain Registrar"));
    assert_eq!(whois.creation_date.as_deref(), Some("2001-01-01"));
}

#[tokio::test]
async fn test_records_serialize_with_wire_source_tags() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/rdap/example.com");
        then.status(200).json_body(rdap_body());
    });

    let fetcher = WhoisFetcher::with_config(test_config(&server)).unwrap();
    let record = fetcher.resolve_domain("example.com").await;

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["source"], "RDAP");
    assert_eq!(json["domain"], "example.com");
    assert_eq!(json["registrar"], "Example Registrar LLC");
    // error is omitted entirely on success
    assert!(json.get("error").is_none());
}
