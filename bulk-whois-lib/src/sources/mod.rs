//! Data-source adapters for registration-metadata lookups.
//!
//! Three concrete clients share one resolution contract
//! (`resolve(domain) -> Result<ResolutionRecord, FetchError>`) and are
//! sequenced by explicit priority in the fetcher: paid API when a key is
//! configured, then RDAP, then legacy WHOIS as the unreliable last resort.

/// Paid WHOIS API adapter (optional, key-gated)
pub mod paid_api;

/// RDAP (Registration Data Access Protocol) adapter
pub mod rdap;

/// Legacy WHOIS port-43 adapter
pub mod whois;

// Re-export commonly used clients and extraction helpers
pub use paid_api::{extract_api_record, PaidApiClient};
pub use rdap::{extract_rdap_record, RdapClient};
pub use whois::{parse_whois_response, WhoisClient};
