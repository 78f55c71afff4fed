//! Human-readable display logic for the domain-verify CLI.
//!
//! One line per layer per domain, coloured by status, with evidence and
//! registration details underneath in verbose mode. Uses only the
//! `console` crate.

use console::{pad_str, style, Alignment, StyledObject};
use domain_verify_lib::{Layer, VerificationResult, VerificationStatus, VerifyConfig};
use std::time::Duration;

const DOMAIN_WIDTH: usize = 30;

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a run.
pub fn print_header(domain_count: usize, config: &VerifyConfig, max_layer: Layer) {
    println!(
        "{} {} {}",
        style("domain-verify").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- Verifying {} domain{}",
            domain_count,
            if domain_count == 1 { "" } else { "s" }
        ))
        .dim(),
    );

    let whois = if config.has_whois_credential() {
        "WHOIS: on"
    } else {
        "WHOIS: off"
    };
    println!(
        "{}",
        style(format!(
            "Layers: 1-{} | {} | Concurrency: {}",
            max_layer, whois, config.concurrency
        ))
        .dim()
    );
    println!();
}

// ── Result lines ─────────────────────────────────────────────────────────────

/// Print one layer result. With `verbose`, evidence and registration
/// details follow on indented lines, and pricing after the `last` layer.
pub fn print_result(result: &VerificationResult, verbose: bool, last: bool) {
    let padded_domain = pad_str(&result.domain, DOMAIN_WIDTH, Alignment::Left, Some(".."));

    println!(
        "  {}  {}  {}  {}",
        style(&padded_domain).white(),
        style(format!("[L{}]", result.layer)).dim(),
        status_label(result.status),
        style(format!("{:>3}%", result.confidence)).dim(),
    );

    if !verbose {
        return;
    }

    for evidence in &result.evidence {
        println!("    {} {}", style("•").dim(), style(evidence).dim());
    }
    if let Some(details) = format_registration(result) {
        println!("    {} {}", style("└─").dim(), style(details).dim());
    }
    if last {
        println!(
            "    {} {}",
            style("└─").dim(),
            style(format!(
                "{:.2} {} to register, {:.2} {}/yr to renew",
                result.pricing.registration,
                result.pricing.currency,
                result.pricing.renewal,
                result.pricing.currency
            ))
            .dim(),
        );
    }
}

/// Print a domain that was rejected before verification.
pub fn print_invalid(domain: &str, message: &str) {
    let padded_domain = pad_str(domain, DOMAIN_WIDTH, Alignment::Left, Some(".."));
    println!(
        "  {}  {}  {}",
        style(&padded_domain).white(),
        style("INVALID").yellow().bold(),
        style(message).dim(),
    );
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Per-status tallies of the last result seen for each domain.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    pub available: usize,
    pub taken: usize,
    pub checking: usize,
    pub invalid: usize,
}

impl Tally {
    pub fn record(&mut self, result: &VerificationResult) {
        match result.status {
            VerificationStatus::Available | VerificationStatus::LikelyAvailable => {
                self.available += 1
            }
            VerificationStatus::Taken | VerificationStatus::LikelyTaken => self.taken += 1,
            VerificationStatus::Checking => self.checking += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.available + self.taken + self.checking + self.invalid
    }
}

/// Print the final summary bar with colored counts.
pub fn print_summary(tally: &Tally, duration: Duration) {
    let total = tally.total();
    println!();
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} domain{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(total).bold(),
        if total == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", tally.available)).green(),
        style("|").dim(),
        style(format!("{} taken", tally.taken)).red(),
        style("|").dim(),
        style(format!("{} invalid", tally.invalid)).yellow(),
    );
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Upper-case status label, coloured green for available and red for taken.
/// "Likely" verdicts are not bold.
fn status_label(status: VerificationStatus) -> StyledObject<String> {
    let text = status.as_str().replace('_', " ").to_uppercase();
    match status {
        VerificationStatus::Available => style(text).green().bold(),
        VerificationStatus::LikelyAvailable => style(text).green(),
        VerificationStatus::Taken => style(text).red().bold(),
        VerificationStatus::LikelyTaken => style(text).red(),
        VerificationStatus::Checking => style(text).yellow(),
    }
}

/// Format registrar and dates into a concise string, if any are known.
pub fn format_registration(result: &VerificationResult) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(registrar) = &result.registrar {
        parts.push(format!("Registrar: {}", registrar));
    }
    if let Some(created) = &result.registration_date {
        parts.push(format!("Created: {}", created));
    }
    if let Some(expires) = &result.expiration_date {
        parts.push(format!("Expires: {}", expires));
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}

// ── Tests ────────────────────────────────────────────────────────────────────
