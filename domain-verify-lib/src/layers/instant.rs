//! Layer 1: instant check.
//!
//! Known-domain lookup, name-shape heuristics and at most one DNS A-record
//! lookup. Meant to answer in well under a second.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::{lookup, Findings, Probe};
use crate::protocols::RecordType;
use crate::types::{Availability, Layer, VerificationResult};
use crate::utils::root_label;
use crate::verifier::DomainVerifier;

lazy_static! {
    /// Serial-numbered test names (`test12345`) are essentially never registered.
    static ref TEST_SERIAL: Regex = Regex::new(r"test\d{5,}").expect("valid regex");

    /// Placeholder-style names such as `demo-shop` or `sample42`.
    static ref PLACEHOLDER_NAME: Regex =
        Regex::new(r"^(test|demo|example|sample|fake)[\d-]").expect("valid regex");
}

/// Root labels longer than this skip DNS entirely.
const UNLIKELY_ROOT_LEN: usize = 20;

/// Root labels longer than this look generated rather than chosen.
const LONG_ROOT_LEN: usize = 25;

const MAX_DIGITS: usize = 5;
const MAX_HYPHENS: usize = 3;

/// Whether the root label has the shape of a name nobody would register.
pub(crate) fn looks_unregistered(root: &str) -> bool {
    root.len() > LONG_ROOT_LEN
        || root.chars().filter(|c| c.is_ascii_digit()).count() > MAX_DIGITS
        || root.chars().filter(|&c| c == '-').count() > MAX_HYPHENS
        || PLACEHOLDER_NAME.is_match(root)
        || TEST_SERIAL.is_match(root)
}

/// Whether the name is so unlikely to be registered that DNS is skipped.
pub(crate) fn skips_dns(root: &str) -> bool {
    root.len() > UNLIKELY_ROOT_LEN || TEST_SERIAL.is_match(root)
}

impl DomainVerifier {
    /// Layer 1: known-domain shortcut, pattern heuristics and one A-record
    /// lookup bounded by `instant_dns_timeout`.
    ///
    /// Never fails: a DNS error degrades to a lower-confidence answer.
    pub async fn verify_layer1(&self, domain: &str) -> VerificationResult {
        let domain = domain.trim().to_lowercase();
        let pricing = self.catalog.pricing_for(&domain);

        if let Some(known) = self.catalog.known_registration(&domain) {
            debug!(domain = %domain, "matched known registered domain");
            let mut findings = Findings::empty();
            findings.available = Availability::Taken;
            findings.confidence = 99;
            findings.registrar = known.registrar.clone();
            findings.note("Matches known registered domain");
            return findings.into_result(&domain, Layer::Instant, pricing);
        }

        let root = root_label(&domain);

        if skips_dns(root) {
            debug!(domain = %domain, "very unlikely pattern, skipping DNS");
            let mut findings = Findings::empty();
            findings.available = Availability::Available;
            findings.confidence = 80;
            findings.note("Very unlikely domain pattern - skipped DNS check");
            return findings.into_result(&domain, Layer::Instant, pricing);
        }

        let mut findings = Findings::empty();
        if looks_unregistered(root) {
            findings.available = Availability::Available;
            findings.confidence = 75;
            findings.note("Domain name pattern suggests availability");
        }

        let probe = lookup(
            self.resolver.as_ref(),
            &domain,
            RecordType::A,
            self.config.instant_dns_timeout,
        )
        .await;

        match probe {
            Probe::Present => {
                findings.available = Availability::Taken;
                findings.confidence = findings.confidence.max(85);
                findings.note("DNS A-record found");
            }
            Probe::Absent => {
                if findings.available.is_unknown() {
                    findings.available = Availability::Available;
                    findings.confidence = 65;
                }
                findings.note("No DNS A-record found");
            }
            Probe::Inconclusive | Probe::Skipped => {
                if findings.available.is_unknown() {
                    findings.available = Availability::Available;
                    findings.confidence = 55;
                }
                findings.note("DNS check inconclusive - using pattern analysis");
            }
        }

        findings.into_result(&domain, Layer::Instant, pricing)
    }
}
