//! Paid WHOIS API adapter.
//!
//! Commercial WHOIS APIs are the most reliable source when a key is
//! configured, so they sit first in the cascade. Providers disagree on field
//! names, so extraction maps a set of known synonyms onto the canonical
//! record schema — first present wins.

use crate::dates::DateField;
use crate::error::FetchError;
use crate::types::{RecordSource, ResolutionRecord};
use std::time::Duration;

/// HTTP User-Agent sent on metadata lookups.
pub(crate) const USER_AGENT: &str =
    concat!("bulk-whois/", env!("CARGO_PKG_VERSION"), " (+https://github.com/bulk-whois)");

/// Client for a configurable paid WHOIS API endpoint.
#[derive(Debug, Clone)]
pub struct PaidApiClient {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    /// API endpoint URL; domain and key are sent as query parameters
    endpoint: String,
    /// API key sent with every request
    api_key: String,
}

impl PaidApiClient {
    /// Create a new paid-API client.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                FetchError::network_with_source("Failed to create paid-API HTTP client", e.to_string())
            })?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Look up registration metadata for a normalized domain.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on network failures, non-2xx responses, and
    /// unparseable JSON. All of these are retryable from the resolver's
    /// point of view.
    pub async fn resolve(&self, domain: &str) -> Result<ResolutionRecord, FetchError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("domain", domain), ("apiKey", &self.api_key)])
            .send()
            .await
            .map_err(|e| FetchError::paid_api(domain, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::paid_api_with_status(
                domain,
                format!("API returned error: {}", status),
                status.as_u16(),
            ));
        }

        let json = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| FetchError::paid_api(domain, format!("Failed to parse JSON: {}", e)))?;

        Ok(extract_api_record(domain, &json))
    }
}

/// Map a provider JSON response onto the canonical record schema.
///
/// Each canonical field has a synonym list; the first present, non-null
/// field wins. Date fields accept both single values and sequences.
pub fn extract_api_record(domain: &str, json: &serde_json::Value) -> ResolutionRecord {
    ResolutionRecord {
        domain: domain.to_string(),
        registrar: first_string(json, &["registrarName", "registrar"]),
        creation_date: first_date(json, &["createdDate", "created_at", "creationDate"]),
        expiration_date: first_date(json, &["expiresDate", "expires_at", "expirationDate"]),
        updated_date: first_date(json, &["updatedDate", "updated_at"]),
        source: RecordSource::PaidApi,
        error: None,
    }
}

/// Take the first synonym present as a non-empty string.
fn first_string(json: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| json.get(key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(String::from)
}

/// Take the first synonym present and resolve it through the date parser.
fn first_date(json: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| json.get(key))
        .filter_map(|value| serde_json::from_value::<DateField>(value.clone()).ok())
        .find_map(|field| field.normalized())
}
