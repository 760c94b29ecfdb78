//! Legacy WHOIS port-43 adapter.
//!
//! Last resort of the cascade: port-43 servers are rate-limited, frequently
//! blocked, and answer in free-form text. Queries go through the system
//! `whois` client, and the response is scraped line by line for the handful
//! of fields we care about. A small randomized delay follows every
//! successful query to avoid hammering registry servers.

use crate::dates::normalize_date;
use crate::error::FetchError;
use crate::types::{RecordSource, ResolutionRecord};
use rand::Rng;
use std::time::Duration;
use tokio::process::Command;

/// WHOIS client that shells out to the system `whois` command.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    /// Timeout for a single WHOIS query
    timeout: Duration,
    /// Executable name; overridable for tests
    command: String,
}

impl WhoisClient {
    /// Create a new WHOIS client with the given query timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            command: "whois".to_string(),
        }
    }

    /// Create a client that runs a custom executable instead of `whois`.
    pub fn with_command(timeout: Duration, command: impl Into<String>) -> Self {
        Self {
            timeout,
            command: command.into(),
        }
    }

    /// Look up registration metadata for a normalized domain over port 43.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the whois executable is missing or exits
    /// non-zero, the query times out, or the response contains no
    /// recognizable registration fields.
    pub async fn resolve(&self, domain: &str) -> Result<ResolutionRecord, FetchError> {
        let result = tokio::time::timeout(self.timeout, self.execute_whois(domain)).await;

        let record = match result {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(FetchError::timeout("WHOIS query", self.timeout)),
        };

        // Polite randomized pause so a batch of lookups doesn't hammer
        // port-43 servers back to back
        let pause = 0.2 + rand::thread_rng().gen_range(0.0..0.3);
        tokio::time::sleep(Duration::from_secs_f64(pause)).await;

        Ok(record)
    }

    /// Run the whois command and parse its output.
    async fn execute_whois(&self, domain: &str) -> Result<ResolutionRecord, FetchError> {
        let output = Command::new(&self.command)
            .arg(domain)
            .output()
            .await
            .map_err(|e| {
                FetchError::whois(
                    domain,
                    format!(
                        "Failed to execute {} command: {}. Make sure it is installed.",
                        self.command, e
                    ),
                )
            })?;

        if !output.status.success() {
            return Err(FetchError::whois(
                domain,
                format!("whois command exited with {}", output.status),
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        parse_whois_response(domain, &text)
    }
}

/// Parse a free-form WHOIS text response into a resolution record.
///
/// Responses are `key: value` lines with registry-specific key spellings.
/// Keys are matched by synonym substrings; when a field appears multiple
/// times (registries love repeating dates), the first occurrence wins.
///
/// # Errors
///
/// Returns `FetchError::WhoisError` when no registration field can be
/// extracted at all — which covers "no match" responses for unregistered
/// domains as well as rate-limit refusals.
pub fn parse_whois_response(domain: &str, text: &str) -> Result<ResolutionRecord, FetchError> {
    let mut registrar: Option<String> = None;
    let mut creation: Option<String> = None;
    let mut expiration: Option<String> = None;
    let mut updated: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') || line.starts_with(">>>") {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        // Most specific first: "Registrar Registration Expiration Date"
        // must land in expiration, not registrar.
        if key.contains("expir") {
            if expiration.is_none() {
                expiration = normalize_date(value);
            }
        } else if key.contains("creation") || key.contains("created") || key == "registered" {
            if creation.is_none() {
                creation = normalize_date(value);
            }
        } else if key.contains("updated") || key.contains("modified") || key.contains("last changed")
        {
            if updated.is_none() {
                updated = normalize_date(value);
            }
        } else if key.contains("registrar")
            && !key.contains("whois")
            && !key.contains("url")
            && !key.contains("abuse")
            && !key.contains("iana")
            && !key.contains("phone")
            && !key.contains("email")
            && !key.contains("registration")
        {
            if registrar.is_none() {
                registrar = Some(value.to_string());
            }
        }
    }

    if registrar.is_none() && creation.is_none() && expiration.is_none() && updated.is_none() {
        return Err(FetchError::whois(domain, "no registration data in response"));
    }

    Ok(ResolutionRecord {
        domain: domain.to_string(),
        registrar,
        creation_date: creation,
        expiration_date: expiration,
        updated_date: updated,
        source: RecordSource::LegacyWhois,
        error: None,
    })
}
