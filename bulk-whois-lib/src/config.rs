//! Environment-based configuration overrides.
//!
//! The library is configured through an explicit `FetchConfig` struct, but
//! deployments commonly tune the knobs through environment variables. This
//! module reads the recognized variables, validates them, and layers them
//! over a base configuration. Invalid values are logged and skipped rather
//! than aborting.
//!
//! Recognized variables: `MAX_THREADS`, `RDAP_TIMEOUT`, `RETRIES`,
//! `INITIAL_BACKOFF`, `MAX_BACKOFF`, `WHOIS_API_KEY`, `WHOIS_API_URL`.
//! Timeout and backoff values are in seconds and accept fractions.

use crate::types::FetchConfig;
use std::env;
use std::time::Duration;
use tracing::warn;

/// Configuration values read from environment variables.
///
/// Every field is optional; `None` means the variable was unset or invalid
/// and the base configuration value stays in effect.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// MAX_THREADS - concurrent domain resolutions
    pub max_threads: Option<usize>,

    /// RDAP_TIMEOUT - per-HTTP-request timeout in seconds
    pub rdap_timeout: Option<Duration>,

    /// RETRIES - attempts per cascade stage
    pub retries: Option<u32>,

    /// INITIAL_BACKOFF - first retry delay in seconds
    pub initial_backoff: Option<Duration>,

    /// MAX_BACKOFF - backoff cap in seconds
    pub max_backoff: Option<Duration>,

    /// WHOIS_API_KEY - paid-API key (empty disables the paid stage)
    pub api_key: Option<String>,

    /// WHOIS_API_URL - paid-API endpoint
    pub api_url: Option<String>,
}

impl EnvConfig {
    /// Layer these overrides onto a base configuration.
    pub fn apply(self, mut config: FetchConfig) -> FetchConfig {
        if let Some(max_threads) = self.max_threads {
            config = config.with_concurrency(max_threads);
        }
        if let Some(timeout) = self.rdap_timeout {
            config = config.with_rdap_timeout(timeout).with_whois_timeout(timeout);
        }
        if let Some(retries) = self.retries {
            config = config.with_retries(retries);
        }
        if let (Some(initial), Some(max)) = (self.initial_backoff, self.max_backoff) {
            config = config.with_backoff(initial, max);
        } else if let Some(initial) = self.initial_backoff {
            let max = config.max_backoff;
            config = config.with_backoff(initial, max);
        } else if let Some(max) = self.max_backoff {
            let initial = config.initial_backoff;
            config = config.with_backoff(initial, max);
        }
        if let Some(key) = self.api_key {
            config = config.with_api_key(key);
        }
        if let Some(url) = self.api_url {
            config = config.with_api_url(url);
        }
        config
    }
}

/// Read configuration overrides from the environment.
///
/// Unset variables are skipped silently; set-but-invalid variables emit a
/// warning and are skipped.
pub fn load_env_config() -> EnvConfig {
    let mut env_config = EnvConfig::default();

    if let Ok(val) = env::var("MAX_THREADS") {
        match val.parse::<usize>() {
            Ok(threads) if threads > 0 && threads <= 100 => {
                env_config.max_threads = Some(threads);
            }
            _ => warn!("Invalid MAX_THREADS='{}', must be 1-100", val),
        }
    }

    env_config.rdap_timeout = parse_seconds_var("RDAP_TIMEOUT");

    if let Ok(val) = env::var("RETRIES") {
        match val.parse::<u32>() {
            Ok(retries) if retries > 0 => env_config.retries = Some(retries),
            _ => warn!("Invalid RETRIES='{}', must be a positive integer", val),
        }
    }

    env_config.initial_backoff = parse_seconds_var("INITIAL_BACKOFF");
    env_config.max_backoff = parse_seconds_var("MAX_BACKOFF");

    if let Ok(key) = env::var("WHOIS_API_KEY") {
        if !key.trim().is_empty() {
            env_config.api_key = Some(key);
        }
    }

    if let Ok(url) = env::var("WHOIS_API_URL") {
        if !url.trim().is_empty() {
            env_config.api_url = Some(url);
        }
    }

    env_config
}

/// Parse an environment variable holding a duration in (fractional) seconds.
fn parse_seconds_var(name: &str) -> Option<Duration> {
    let val = env::var(name).ok()?;
    match val.parse::<f64>() {
        Ok(seconds) if seconds > 0.0 && seconds.is_finite() => {
            Some(Duration::from_secs_f64(seconds))
        }
        _ => {
            warn!("Invalid {}='{}', must be a positive number of seconds", name, val);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_base_config() {
        let overrides = EnvConfig {
            max_threads: Some(12),
            rdap_timeout: Some(Duration::from_secs(3)),
            retries: Some(5),
            initial_backoff: Some(Duration::from_millis(500)),
            max_backoff: Some(Duration::from_secs(4)),
            api_key: Some("k".to_string()),
            api_url: Some("https://api.example/v1/whois".to_string()),
        };

        let config = overrides.apply(FetchConfig::default());
        assert_eq!(config.concurrency, 12);
        assert_eq!(config.rdap_timeout, Duration::from_secs(3));
        assert_eq!(config.retries, 5);
        assert_eq!(config.initial_backoff, Duration::from_millis(500));
        assert_eq!(config.max_backoff, Duration::from_secs(4));
        assert!(config.paid_api_enabled());
        assert_eq!(config.api_url, "https://api.example/v1/whois");
    }

    #[test]
    fn test_apply_partial_backoff_overrides() {
        let defaults = FetchConfig::default();

        let only_initial = EnvConfig {
            initial_backoff: Some(Duration::from_millis(250)),
            ..Default::default()
        };
        let config = only_initial.apply(FetchConfig::default());
        assert_eq!(config.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.max_backoff, defaults.max_backoff);

        let only_max = EnvConfig {
            max_backoff: Some(Duration::from_secs(20)),
            ..Default::default()
        };
        let config = only_max.apply(FetchConfig::default());
        assert_eq!(config.initial_backoff, defaults.initial_backoff);
        assert_eq!(config.max_backoff, Duration::from_secs(20));
    }

    #[test]
    fn test_apply_empty_overrides_keeps_defaults() {
        let config = EnvConfig::default().apply(FetchConfig::default());
        let defaults = FetchConfig::default();
        assert_eq!(config.concurrency, defaults.concurrency);
        assert_eq!(config.retries, defaults.retries);
        assert!(!config.paid_api_enabled());
    }

    #[test]
    fn test_load_env_config_reads_variables() {
        // Single test touching process-global env to avoid races
        env::set_var("MAX_THREADS", "7");
        env::set_var("RDAP_TIMEOUT", "2.5");
        env::set_var("RETRIES", "not-a-number");

        let env_config = load_env_config();
        assert_eq!(env_config.max_threads, Some(7));
        assert_eq!(env_config.rdap_timeout, Some(Duration::from_secs_f64(2.5)));
        assert_eq!(env_config.retries, None);

        env::remove_var("MAX_THREADS");
        env::remove_var("RDAP_TIMEOUT");
        env::remove_var("RETRIES");
    }
}
