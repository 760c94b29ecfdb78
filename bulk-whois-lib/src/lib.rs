//! # Bulk WHOIS Library
//!
//! A library for resolving domain registration metadata (registrar and
//! creation/expiration/update dates) for bulk lists of domains.
//!
//! Lookups cascade through sources of decreasing reliability: an optional
//! paid WHOIS API, then RDAP, then the legacy WHOIS port-43 protocol.
//! Each stage retries with exponential backoff and jitter; every failure
//! surfaces as data in the output record rather than as an error.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bulk_whois_lib::WhoisFetcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = WhoisFetcher::new()?;
//!     let record = fetcher.resolve_domain("example.com").await;
//!
//!     println!("{}: {:?} via {}", record.domain, record.registrar, record.source);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Source cascade**: paid API → RDAP → legacy WHOIS, first success wins
//! - **Retry with backoff**: exponential delays with jitter per stage
//! - **Bulk orchestration**: bounded worker pool with live progress reporting
//! - **Failures as data**: one record per input domain, always
//! - **Configurable**: explicit config struct plus environment overrides

// Re-export main public API types and functions
// This makes them available as bulk_whois_lib::TypeName
pub use backoff::BackoffPolicy;
pub use config::{load_env_config, EnvConfig};
pub use dates::{normalize_date, DateField};
pub use error::FetchError;
pub use fetcher::{ProgressFn, WhoisFetcher};
pub use sources::{
    extract_api_record, extract_rdap_record, parse_whois_response, PaidApiClient, RdapClient,
    WhoisClient,
};
pub use types::{FetchConfig, RecordSource, ResolutionRecord};
pub use utils::normalize_domain;

// Internal modules - re-exported items above form the public API
mod backoff;
mod config;
mod dates;
mod error;
mod fetcher;
mod sources;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, FetchError>;

// Library version metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
