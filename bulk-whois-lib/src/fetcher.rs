//! Main fetcher implementation.
//!
//! This module provides the primary `WhoisFetcher` struct that drives the
//! source cascade for single domains and fans it out across a bounded
//! worker pool for bulk lookups.

use crate::backoff::BackoffPolicy;
use crate::error::FetchError;
use crate::sources::{PaidApiClient, RdapClient, WhoisClient};
use crate::types::{FetchConfig, ResolutionRecord};
use crate::utils::normalize_domain;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Progress callback invoked once per completed domain with
/// `(completed_count, total_count, domain_just_completed)`.
///
/// The lifetime lets callbacks borrow from the caller's stack; they only
/// run inside `fetch_domains`, never from the spawned tasks.
pub type ProgressFn<'a> = dyn Fn(usize, usize, &str) + Send + Sync + 'a;

/// Resolves registration metadata through a strict priority cascade:
/// paid API (when a key is configured), then RDAP, then legacy WHOIS.
///
/// Each stage retries with exponential backoff before falling through to
/// the next; the first success anywhere short-circuits the cascade. A
/// domain that exhausts every stage yields a FAILED record — resolution
/// never raises.
///
/// # Example
///
/// ```rust,no_run
/// use bulk_whois_lib::{FetchConfig, WhoisFetcher};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fetcher = WhoisFetcher::with_config(FetchConfig::default())?;
///     let record = fetcher.resolve_domain("https://www.Example.com").await;
///     println!("{}: {:?} via {}", record.domain, record.registrar, record.source);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WhoisFetcher {
    /// Configuration settings for this fetcher instance
    config: FetchConfig,
    /// Paid-API client; present only when a key is configured
    paid_api: Option<PaidApiClient>,
    /// RDAP client for the structured registry protocol
    rdap_client: RdapClient,
    /// WHOIS client for last-resort port-43 lookups
    whois_client: WhoisClient,
    /// Shared retry backoff policy
    backoff: BackoffPolicy,
}

impl WhoisFetcher {
    /// Create a fetcher with default configuration.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(FetchConfig::default())
    }

    /// Create a fetcher with custom configuration.
    ///
    /// The paid-API stage is wired in only when the config carries a
    /// non-empty API key.
    pub fn with_config(config: FetchConfig) -> Result<Self, FetchError> {
        let paid_api = match &config.api_key {
            Some(key) if config.paid_api_enabled() => Some(PaidApiClient::new(
                &config.api_url,
                key,
                config.rdap_timeout,
            )?),
            _ => None,
        };
        let rdap_client = RdapClient::new(&config.rdap_base_url, config.rdap_timeout)?;
        let whois_client =
            WhoisClient::with_command(config.whois_timeout, &config.whois_command);
        let backoff = BackoffPolicy::new(config.initial_backoff, config.max_backoff);

        Ok(Self {
            config,
            paid_api,
            rdap_client,
            whois_client,
            backoff,
        })
    }

    /// Get the current configuration for this fetcher.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Resolve registration metadata for a single raw domain string.
    ///
    /// The input is normalized first (scheme and `www.` stripped,
    /// lowercased). The cascade stops at the first stage that produces a
    /// record; stages never run concurrently for the same domain. This
    /// method is infallible: total exhaustion yields a FAILED record.
    pub async fn resolve_domain(&self, raw: &str) -> ResolutionRecord {
        let domain = normalize_domain(raw);

        if let Some(api) = &self.paid_api {
            if let Some(record) = self
                .run_stage("paid_api", &domain, || api.resolve(&domain))
                .await
            {
                return record;
            }
        }

        if let Some(record) = self
            .run_stage("rdap", &domain, || self.rdap_client.resolve(&domain))
            .await
        {
            return record;
        }

        if let Some(record) = self
            .run_stage("whois", &domain, || self.whois_client.resolve(&domain))
            .await
        {
            return record;
        }

        warn!(domain = %domain, "all lookup methods failed");
        ResolutionRecord::failed(domain)
    }

    /// Run one cascade stage: up to `retries` attempts with backoff sleeps
    /// between attempts (never after the last). Returns `None` when the
    /// stage is exhausted and the cascade should fall through.
    async fn run_stage<F, Fut>(
        &self,
        stage: &str,
        domain: &str,
        mut attempt_fn: F,
    ) -> Option<ResolutionRecord>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<ResolutionRecord, FetchError>>,
    {
        for attempt in 0..self.config.retries {
            match attempt_fn().await {
                Ok(record) => {
                    debug!(domain = %domain, stage = stage, attempt = attempt, "lookup succeeded");
                    return Some(record);
                }
                Err(e) => {
                    debug!(
                        domain = %domain,
                        stage = stage,
                        attempt = attempt,
                        error = %e,
                        "lookup attempt failed"
                    );
                    if attempt + 1 < self.config.retries {
                        self.backoff.sleep(attempt).await;
                    }
                }
            }
        }

        warn!(domain = %domain, stage = stage, "stage exhausted, falling through");
        None
    }

    /// Resolve many domains across a bounded worker pool.
    ///
    /// The pool size is `min(configured concurrency, domain count)`.
    /// Results are collected in completion order, not submission order,
    /// and the progress callback fires synchronously once per completion
    /// with a monotonically increasing completed count.
    ///
    /// Every input domain yields exactly one record. A resolution task
    /// that faults instead of returning (the resolver contract promises it
    /// never does) is converted into an EXCEPTION record rather than
    /// aborting the batch. There is no cross-batch timeout or
    /// cancellation; only the per-attempt timeouts bound individual calls.
    pub async fn fetch_domains(
        &self,
        domains: &[String],
        progress: Option<&ProgressFn<'_>>,
    ) -> Vec<ResolutionRecord> {
        if domains.is_empty() {
            return Vec::new();
        }

        let total = domains.len();
        let workers = self.config.concurrency.clamp(1, total);
        let semaphore = Arc::new(Semaphore::new(workers));

        let mut tasks = JoinSet::new();
        let mut task_domains: HashMap<tokio::task::Id, String> = HashMap::with_capacity(total);

        for domain in domains {
            let fetcher = self.clone();
            let task_domain = domain.clone();
            let semaphore = Arc::clone(&semaphore);
            let handle = tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore is never closed");
                fetcher.resolve_domain(&task_domain).await
            });
            task_domains.insert(handle.id(), domain.clone());
        }

        // Single collector loop: completions are serialized here, so the
        // result list and the completed counter need no extra locking.
        let mut results = Vec::with_capacity(total);
        let mut completed = 0usize;

        while let Some(joined) = tasks.join_next_with_id().await {
            let record = match joined {
                Ok((_, record)) => record,
                Err(join_error) => {
                    let domain = task_domains
                        .get(&join_error.id())
                        .cloned()
                        .unwrap_or_else(|| "unknown".to_string());
                    error!(domain = %domain, error = %join_error, "resolution task faulted");
                    ResolutionRecord::exception(domain, join_error.to_string())
                }
            };

            completed += 1;
            if let Some(progress) = progress {
                progress(completed, total, &record.domain);
            }
            results.push(record);
        }

        results
    }
}
