//! RDAP (Registration Data Access Protocol) adapter.
//!
//! RDAP is the structured JSON successor to WHOIS. We query a public
//! aggregator (rdap.org by default) that redirects to the authoritative
//! registry, so no per-TLD endpoint table is needed. Event and entity
//! parsing tolerates the synonym soup real registries emit.

use crate::dates::normalize_date;
use crate::error::FetchError;
use crate::sources::paid_api::USER_AGENT;
use crate::types::{RecordSource, ResolutionRecord};
use std::time::Duration;

/// RDAP client querying a public aggregation endpoint.
#[derive(Debug, Clone)]
pub struct RdapClient {
    /// HTTP client for RDAP requests
    http_client: reqwest::Client,
    /// Aggregator base URL; the domain is appended as a path segment
    base_url: String,
}

impl RdapClient {
    /// Create a new RDAP client for the given aggregator base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                FetchError::network_with_source("Failed to create RDAP HTTP client", e.to_string())
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Look up registration metadata for a normalized domain via RDAP.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on network failures, any non-2xx status
    /// (including 404: an unregistered domain carries no metadata to
    /// resolve), and unparseable JSON.
    pub async fn resolve(&self, domain: &str) -> Result<ResolutionRecord, FetchError> {
        let url = format!("{}/{}", self.base_url, domain);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::rdap(domain, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::rdap_with_status(
                domain,
                format!("RDAP server returned error: {}", status),
                status.as_u16(),
            ));
        }

        let json = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| FetchError::rdap(domain, format!("Failed to parse JSON: {}", e)))?;

        Ok(extract_rdap_record(domain, &json))
    }
}

/// Extract a resolution record from an RDAP JSON response.
///
/// Event actions are matched case-insensitively against synonym sets; the
/// first matching event per category wins and later matches are ignored.
/// The registrar comes from the first entity whose roles contain the
/// substring "registrar" and whose vcard yields a display name.
pub fn extract_rdap_record(domain: &str, json: &serde_json::Value) -> ResolutionRecord {
    let mut creation: Option<String> = None;
    let mut expiration: Option<String> = None;
    let mut updated: Option<String> = None;

    if let Some(events) = json.get("events").and_then(|e| e.as_array()) {
        for event in events {
            let action = event
                .get("eventAction")
                .and_then(|a| a.as_str())
                .unwrap_or_default()
                .to_lowercase();

            // Some registries use `timestamp` instead of `eventDate`
            let date = event
                .get("eventDate")
                .or_else(|| event.get("timestamp"))
                .and_then(|d| d.as_str());

            let Some(date) = date.and_then(normalize_date) else {
                continue;
            };

            match action.as_str() {
                "registration" | "create" | "registered" => {
                    creation.get_or_insert(date);
                }
                "expiration" | "expiry" | "expire" => {
                    expiration.get_or_insert(date);
                }
                "last changed" | "update" | "modified" => {
                    updated.get_or_insert(date);
                }
                _ => {}
            }
        }
    }

    let mut registrar: Option<String> = None;
    if let Some(entities) = json.get("entities").and_then(|e| e.as_array()) {
        for entity in entities {
            let is_registrar = entity
                .get("roles")
                .and_then(|r| r.as_array())
                .is_some_and(|roles| {
                    roles
                        .iter()
                        .filter_map(|role| role.as_str())
                        .any(|role| role.to_lowercase().contains("registrar"))
                });

            if is_registrar {
                if let Some(name) = extract_vcard_name(entity) {
                    registrar = Some(name);
                    break;
                }
            }
        }
    }

    ResolutionRecord {
        domain: domain.to_string(),
        registrar,
        creation_date: creation,
        expiration_date: expiration,
        updated_date: updated,
        source: RecordSource::Rdap,
        error: None,
    }
}

/// Extract the display name from an RDAP entity's vcard array.
///
/// The vcard format nests entries as `["vcard", [["fn", {}, "text", NAME], ...]]`;
/// we locate the `fn` entry and read its value field.
fn extract_vcard_name(entity: &serde_json::Value) -> Option<String> {
    entity
        .get("vcardArray")
        .and_then(|v| v.as_array())
        .and_then(|a| a.get(1))
        .and_then(|a| a.as_array())
        .and_then(|items| {
            for item in items {
                if let Some(entry) = item.as_array() {
                    if entry.len() >= 4 && entry.first().and_then(|f| f.as_str()) == Some("fn") {
                        return entry
                            .get(3)
                            .and_then(|n| n.as_str())
                            .filter(|n| !n.is_empty())
                            .map(String::from);
                    }
                }
            }
            None
        })
}
