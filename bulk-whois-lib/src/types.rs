//! Core data types for bulk registration-metadata lookups.
//!
//! This module defines all the main data structures used throughout the library,
//! including resolution records, source tags, and configuration options.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which data source ultimately produced a record, or how the lookup failed.
///
/// The three data-bearing variants are mutually exclusive: a record is tagged
/// with exactly the adapter that produced it, never a blend of sources.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecordSource {
    /// Resolved via the configured paid WHOIS API
    #[serde(rename = "PAID_API")]
    PaidApi,

    /// Resolved via the RDAP aggregator
    #[serde(rename = "RDAP")]
    Rdap,

    /// Resolved via the legacy WHOIS port-43 protocol
    #[serde(rename = "LEGACY_WHOIS")]
    LegacyWhois,

    /// Every stage exhausted its retries without producing data
    #[serde(rename = "FAILED")]
    Failed,

    /// A resolution task faulted unexpectedly and was caught at the
    /// orchestrator boundary
    #[serde(rename = "EXCEPTION")]
    Exception,
}

impl RecordSource {
    /// Whether this source tag represents a terminal failure rather than data.
    pub fn is_failure(&self) -> bool {
        matches!(self, RecordSource::Failed | RecordSource::Exception)
    }
}

/// Registration metadata for a single domain.
///
/// One record is produced per input domain per bulk run, built once and never
/// mutated afterwards. Partial data is acceptable: a lookup counts as
/// successful even when only some fields could be extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionRecord {
    /// The normalized domain name (no scheme, no `www.`, lowercase)
    pub domain: String,

    /// The registrar that manages this domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,

    /// When the domain was first registered (`YYYY-MM-DD` or raw fallback)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,

    /// When the domain registration expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// Last update date of the domain record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,

    /// Which adapter produced the data, or a terminal failure tag
    pub source: RecordSource,

    /// Failure detail; populated exactly when `source` is FAILED or EXCEPTION
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolutionRecord {
    /// Build a terminal failure record for a domain whose cascade was exhausted.
    pub fn failed(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            registrar: None,
            creation_date: None,
            expiration_date: None,
            updated_date: None,
            source: RecordSource::Failed,
            error: Some("All methods failed".to_string()),
        }
    }

    /// Build a record for a resolution task that faulted instead of returning.
    pub fn exception(domain: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            registrar: None,
            creation_date: None,
            expiration_date: None,
            updated_date: None,
            source: RecordSource::Exception,
            error: Some(error.into()),
        }
    }
}

/// Configuration options for bulk metadata lookups.
///
/// This struct replaces the global constants of ad-hoc scripts with explicit,
/// documented defaults that can be tuned per fetcher instance.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum number of concurrent domain resolutions.
    /// Default: 5, Range: 1-100. Additionally clamped to the batch size at run time.
    pub concurrency: usize,

    /// Attempts per cascade stage before falling through to the next source.
    /// Default: 3
    pub retries: u32,

    /// Timeout for each individual HTTP request (RDAP and paid API).
    /// Default: 10 seconds
    pub rdap_timeout: Duration,

    /// Timeout for each WHOIS port-43 query.
    /// Default: 10 seconds
    pub whois_timeout: Duration,

    /// First retry delay of the exponential backoff.
    /// Default: 1 second
    pub initial_backoff: Duration,

    /// Upper bound on the exponential backoff (before jitter).
    /// Default: 8 seconds
    pub max_backoff: Duration,

    /// Paid WHOIS API key. Empty or absent disables the paid-API stage.
    pub api_key: Option<String>,

    /// Paid WHOIS API endpoint URL.
    pub api_url: String,

    /// Base URL of the RDAP aggregator (the domain is appended as a path segment).
    pub rdap_base_url: String,

    /// Name of the system whois executable. Overridable for tests.
    pub whois_command: String,
}

impl Default for FetchConfig {
    /// Create a sensible default configuration.
    ///
    /// These defaults are conservative: registry servers rate-limit
    /// aggressively, so concurrency stays modest by default.
    fn default() -> Self {
        Self {
            concurrency: 5,
            retries: 3,
            rdap_timeout: Duration::from_secs(10),
            whois_timeout: Duration::from_secs(10),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(8),
            api_key: None,
            api_url: "https://example-whois-api.com/v1/whois".to_string(),
            rdap_base_url: "https://rdap.org/domain".to_string(),
            whois_command: "whois".to_string(),
        }
    }
}

impl FetchConfig {
    /// Set the concurrency level, capped at 100 to prevent resource exhaustion.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Set the per-stage retry count. At least one attempt is always made.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn with_rdap_timeout(mut self, timeout: Duration) -> Self {
        self.rdap_timeout = timeout;
        self
    }

    /// Set the per-query WHOIS timeout.
    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }

    /// Set the backoff window. `initial` is the first retry delay,
    /// `max` bounds the exponential growth.
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Enable the paid-API stage with the given key.
    /// An empty key leaves the stage disabled.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    /// Set the paid WHOIS API endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the RDAP aggregator base URL.
    pub fn with_rdap_base_url(mut self, url: impl Into<String>) -> Self {
        self.rdap_base_url = url.into();
        self
    }

    /// Override the whois executable name.
    pub fn with_whois_command(mut self, command: impl Into<String>) -> Self {
        self.whois_command = command.into();
        self
    }

    /// Whether the paid-API stage participates in the cascade.
    pub fn paid_api_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl std::fmt::Display for RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordSource::PaidApi => write!(f, "PAID_API"),
            RecordSource::Rdap => write!(f, "RDAP"),
            RecordSource::LegacyWhois => write!(f, "LEGACY_WHOIS"),
            RecordSource::Failed => write!(f, "FAILED"),
            RecordSource::Exception => write!(f, "EXCEPTION"),
        }
    }
}
