//! Domain Verify CLI Application
//!
//! A command-line interface that streams progressive domain verification
//! results from domain-verify-lib: a fast heuristic answer first, then DNS
//! and HTTP evidence, then an authoritative WHOIS answer.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_verify_lib::{
    load_env_config, parse_domain_list, validate_domain, ConfigManager, DomainCatalog,
    DomainVerifier, FileConfig, Layer, VerificationEvent, VerificationResult, VerifyConfig,
};
use futures::StreamExt;
use std::collections::HashMap;
use std::process;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-verify
#[derive(Parser, Debug)]
#[command(name = "domain-verify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "Verify domain availability progressively: heuristics, DNS, HTTP, then WHOIS")]
#[command(
    long_about = "Verify domain availability in three layers of rising cost and certainty.\n\nLayer 1 answers instantly from heuristics and one DNS lookup, Layer 2 adds NS/MX/SOA and HTTP evidence, Layer 3 asks a WHOIS API (requires --whois-key or DV_WHOIS_API_KEY)."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain names to verify (fully qualified, e.g. example.com)
    #[arg(value_name = "DOMAINS", help_heading = "Domain Selection")]
    pub domains: Vec<String>,

    /// Input file with domains (one per line, # comments allowed)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        help_heading = "Domain Selection"
    )]
    pub file: Option<String>,

    /// Output progressive events as newline-delimited JSON
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Stop after this layer (1 = instant, 2 = fast, 3 = authoritative)
    #[arg(
        long = "max-layer",
        value_name = "N",
        default_value_t = 3,
        value_parser = clap::value_parser!(u8).range(1..=3),
        help_heading = "Verification"
    )]
    pub max_layer: u8,

    /// WHOIS API key enabling authoritative Layer 3 answers
    #[arg(long = "whois-key", value_name = "KEY", help_heading = "Verification")]
    pub whois_key: Option<String>,

    /// Max concurrent domain sessions (default: 10, max: 100)
    #[arg(short = 'c', long = "concurrency", help_heading = "Performance")]
    pub concurrency: Option<usize>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show evidence for every layer and debug logging on stderr
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_tracing(args.verbose);

    match run(args).await {
        Ok(true) => {}
        // Some domains were rejected; they have already been reported
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.domains.is_empty() && args.file.is_none() {
        return Err("You must specify domain names or a file with --file".to_string());
    }

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 100 {
            return Err("Concurrency must be between 1 and 100".to_string());
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for NDJSON. `RUST_LOG` wins over
/// `--verbose`.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "domain_verify=debug,domain_verify_lib=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Verify every requested domain, printing events as they arrive.
///
/// Returns `Ok(false)` if any domain was rejected as invalid.
async fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let (config, catalog) = build_config(&args)?;
    let domains = get_domains_to_verify(&args)?;
    let max_layer = Layer::try_from(args.max_layer)?;
    let concurrency = config.effective_concurrency();

    if args.verbose && !args.json {
        ui::print_header(domains.len(), &config, max_layer);
    }

    let verifier = DomainVerifier::with_catalog(config, catalog)?;
    let started = Instant::now();

    let mut events = Box::pin(
        futures::stream::iter(domains)
            .map(|domain| verifier.event_stream_through(&domain, max_layer))
            .flatten_unordered(concurrency),
    );

    let mut latest: HashMap<String, VerificationResult> = HashMap::new();
    let mut tally = ui::Tally::default();

    while let Some(event) = events.next().await {
        if args.json {
            println!("{}", event.to_json_line()?);
        }

        match event {
            VerificationEvent::Start { domain } => {
                debug!(domain = %domain, "session started");
            }
            VerificationEvent::Result(result) => {
                if !args.json {
                    ui::print_result(&result, args.verbose, result.layer == max_layer);
                }
                latest.insert(result.domain.clone(), result);
            }
            VerificationEvent::Done { domain } => {
                if let Some(result) = latest.remove(&domain) {
                    tally.record(&result);
                }
            }
            VerificationEvent::Error { domain, message } => {
                tally.invalid += 1;
                if !args.json {
                    ui::print_invalid(&domain, &message);
                }
            }
        }
    }

    if !args.json && tally.total() > 1 {
        ui::print_summary(&tally, started.elapsed());
    }

    Ok(tally.invalid == 0)
}

/// Resolve the effective configuration.
///
/// Precedence, lowest first: built-in defaults, config file, `DV_*`
/// environment variables, CLI flags.
fn build_config(args: &Args) -> Result<(VerifyConfig, DomainCatalog), Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let config_manager = ConfigManager::new(args.verbose);

    // Step 1: explicit --config, then DV_CONFIG, then discovery
    let file_config = if let Some(path) = &args.config {
        debug!(path = %path, "using explicit config file (--config)");
        config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
    } else if let Some(path) = &env_config.config {
        debug!(path = %path, "using explicit config file (DV_CONFIG)");
        config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
    } else {
        match config_manager.discover_and_load() {
            Ok(file_config) => file_config,
            Err(e) => {
                debug!(error = %e, "config discovery failed, using defaults");
                FileConfig::default()
            }
        }
    };

    let mut config = file_config.apply_to(VerifyConfig::default())?;

    // Step 2: environment variables (DV_*)
    config = env_config.apply_to(config);

    // Step 3: CLI arguments (highest precedence)
    if let Some(key) = &args.whois_key {
        config = config.with_whois_api_key(key.clone());
    }
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }

    Ok((config, file_config.build_catalog()))
}

/// Collect domains from positional arguments and `--file`, keeping the
/// first occurrence of each. Domains are compared in normalized form, so
/// `Example.com.` and `example.com` are one session.
fn get_domains_to_verify(args: &Args) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut domains: Vec<String> = args.domains.clone();

    if let Some(file_path) = &args.file {
        let content = std::fs::read_to_string(file_path)
            .map_err(|e| format!("Failed to read domains file '{}': {}", file_path, e))?;
        let from_file = parse_domain_list(&content);
        if from_file.is_empty() {
            return Err(format!("No domains found in file '{}'", file_path).into());
        }
        domains.extend(from_file);
    }

    let mut seen = std::collections::HashSet::new();
    domains.retain(|d| seen.insert(validate_domain(d).unwrap_or_else(|_| d.trim().to_string())));

    Ok(domains)
}
