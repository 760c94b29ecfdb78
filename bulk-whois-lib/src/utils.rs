//! Utility functions for domain input cleanup.
//!
//! Callers hand us raw strings from spreadsheets and pasted lists, so input
//! arrives as anything from `example.com` to `HTTPS://WWW.Example.com/path`.

/// Normalize a raw domain string to a bare, lowercase host name.
///
/// Steps: trim whitespace, lowercase, strip an `http://`/`https://` scheme
/// by taking the authority token, then strip a leading `www.`.
///
/// This function never fails; an empty input yields an empty string.
/// The authority is assumed to be the third `/`-delimited token, which holds
/// for well-formed URLs (`https://a.b.com/x` -> `a.b.com`) but is not a full
/// URL parser.
///
/// # Example
///
/// ```rust
/// use bulk_whois_lib::normalize_domain;
///
/// assert_eq!(normalize_domain("  HTTP://WWW.Example.COM/page  "), "example.com");
/// ```
pub fn normalize_domain(raw: &str) -> String {
    let mut domain = raw.trim().to_lowercase();

    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain = domain.split('/').nth(2).unwrap_or_default().to_string();
    }

    if let Some(stripped) = domain.strip_prefix("www.") {
        domain = stripped.to_string();
    }

    domain
}
