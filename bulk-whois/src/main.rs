//! Bulk WHOIS CLI Application
//!
//! A command-line interface for resolving domain registration metadata in
//! bulk. Domains come from arguments or a newline-delimited file; results
//! are printed as a plain table or JSON.

use bulk_whois_lib::{load_env_config, FetchConfig, RecordSource, ResolutionRecord, WhoisFetcher};
use clap::Parser;
use console::style;
use std::io::BufRead;
use std::process;
use std::time::Duration;

/// CLI arguments for bulk-whois
#[derive(Parser, Debug)]
#[command(name = "bulk-whois")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve registrar and registration dates for bulk domain lists")]
#[command(
    long_about = "Resolve domain registration metadata (registrar, creation/expiration/update dates)\nthrough a cascade of sources: an optional paid WHOIS API, RDAP, and legacy WHOIS.\n\nEnvironment overrides: MAX_THREADS, RDAP_TIMEOUT, RETRIES, INITIAL_BACKOFF,\nMAX_BACKOFF, WHOIS_API_KEY, WHOIS_API_URL."
)]
pub struct Args {
    /// Domain names to look up
    #[arg(value_name = "DOMAINS")]
    pub domains: Vec<String>,

    /// Input file with domains (one per line, # comments allowed)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<String>,

    /// Maximum concurrent lookups
    #[arg(short = 'c', long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Attempts per source before falling through
    #[arg(long = "retries", value_name = "N")]
    pub retries: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Paid WHOIS API key (enables the paid-API stage)
    #[arg(long = "api-key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// Paid WHOIS API endpoint URL
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Output results as a JSON array
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Suppress the live progress line
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let domains = match collect_domains(&args) {
        Ok(domains) => domains,
        Err(message) => {
            eprintln!("{} {}", style("error:").red().bold(), message);
            process::exit(1);
        }
    };

    if domains.is_empty() {
        eprintln!(
            "{} no domains given; pass them as arguments or via --file",
            style("error:").red().bold()
        );
        process::exit(1);
    }

    let config = build_config(&args);
    let fetcher = match WhoisFetcher::with_config(config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            process::exit(1);
        }
    };

    let quiet = args.quiet;
    let progress = move |completed: usize, total: usize, domain: &str| {
        if !quiet {
            eprintln!(
                "{} [{}/{}] {}",
                style("✓").green(),
                completed,
                total,
                domain
            );
        }
    };

    let results = fetcher.fetch_domains(&domains, Some(&progress)).await;

    if args.json {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{} failed to serialize results: {}", style("error:").red().bold(), e);
                process::exit(1);
            }
        }
    } else {
        print_table(&results);
    }

    let failures = results.iter().filter(|r| r.source.is_failure()).count();
    if failures > 0 {
        eprintln!(
            "{} {} of {} domains could not be resolved",
            style("warning:").yellow().bold(),
            failures,
            results.len()
        );
    }
}

/// Gather domains from positional arguments and the optional input file.
fn collect_domains(args: &Args) -> Result<Vec<String>, String> {
    let mut domains = args.domains.clone();

    if let Some(path) = &args.file {
        let file = std::fs::File::open(path)
            .map_err(|e| format!("cannot open '{}': {}", path, e))?;
        domains.extend(read_domain_lines(std::io::BufReader::new(file)));
    }

    Ok(domains)
}

/// Read one domain per line, skipping blanks and `#` comments.
fn read_domain_lines<R: BufRead>(reader: R) -> Vec<String> {
    reader
        .lines()
        .map_while(|line| line.ok())
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

/// Apply environment overrides, then CLI flags, onto the defaults.
fn build_config(args: &Args) -> FetchConfig {
    let mut config = load_env_config().apply(FetchConfig::default());

    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(retries) = args.retries {
        config = config.with_retries(retries);
    }
    if let Some(seconds) = args.timeout {
        if seconds > 0.0 {
            let timeout = Duration::from_secs_f64(seconds);
            config = config.with_rdap_timeout(timeout).with_whois_timeout(timeout);
        }
    }
    if let Some(key) = &args.api_key {
        config = config.with_api_key(key.clone());
    }
    if let Some(url) = &args.api_url {
        config = config.with_api_url(url.clone());
    }

    config
}

/// Print records as aligned plain-text rows.
fn print_table(records: &[ResolutionRecord]) {
    let width = records
        .iter()
        .map(|r| r.domain.len())
        .max()
        .unwrap_or(0)
        .max("DOMAIN".len());

    println!(
        "{:<width$}  {:<12}  {:<10}  {:<10}  {:<10}  REGISTRAR",
        "DOMAIN",
        "SOURCE",
        "CREATED",
        "EXPIRES",
        "UPDATED",
        width = width
    );

    for record in records {
        let source = match record.source {
            RecordSource::Failed | RecordSource::Exception => {
                style(record.source.to_string()).red().to_string()
            }
            _ => record.source.to_string(),
        };
        println!(
            "{:<width$}  {:<12}  {:<10}  {:<10}  {:<10}  {}",
            record.domain,
            source,
            record.creation_date.as_deref().unwrap_or("-"),
            record.expiration_date.as_deref().unwrap_or("-"),
            record.updated_date.as_deref().unwrap_or("-"),
            record.registrar.as_deref().unwrap_or("-"),
            width = width
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_domain_lines_skips_blanks_and_comments() {
        let input = "example.com\n\n# comment line\n  spaced.org  \n";
        let domains = read_domain_lines(input.as_bytes());
        assert_eq!(domains, vec!["example.com", "spaced.org"]);
    }

    #[test]
    fn test_read_domain_lines_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "one.com\ntwo.net").unwrap();

        let args = Args::parse_from([
            "bulk-whois",
            "--file",
            file.path().to_str().unwrap(),
            "extra.org",
        ]);
        let domains = collect_domains(&args).unwrap();
        assert_eq!(domains, vec!["extra.org", "one.com", "two.net"]);
    }

    #[test]
    fn test_cli_flags_override_defaults() {
        let args = Args::parse_from([
            "bulk-whois",
            "example.com",
            "--concurrency",
            "9",
            "--retries",
            "2",
            "--api-key",
            "k",
        ]);
        let config = build_config(&args);
        assert_eq!(config.concurrency, 9);
        assert_eq!(config.retries, 2);
        assert!(config.paid_api_enabled());
    }
}
