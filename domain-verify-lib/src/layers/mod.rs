//! The three verification layers and the plumbing they share.
//!
//! Every layer builds a brand-new `VerificationResult` from a `Findings`
//! accumulator; the prior layer's result is only read.

mod authoritative;
mod fast;
mod instant;

use chrono::Utc;
use std::time::Duration;
use tracing::debug;

use crate::classify::classify;
use crate::protocols::{DnsResolver, RecordType};
use crate::types::{Availability, Layer, Pricing, VerificationResult};

/// Ceiling for confidence reached by non-authoritative layers.
pub(crate) const MAX_PROBE_CONFIDENCE: u8 = 95;

/// Outcome of one bounded DNS lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probe {
    Present,
    Absent,
    /// Failed or timed out: no evidence either way
    Inconclusive,
    /// Not issued
    Skipped,
}

impl Probe {
    pub fn is_present(self) -> bool {
        matches!(self, Probe::Present)
    }
}

/// Run one DNS lookup under `timeout`, folding failures into
/// `Probe::Inconclusive`.
pub(crate) async fn lookup(
    resolver: &dyn DnsResolver,
    domain: &str,
    record: RecordType,
    timeout: Duration,
) -> Probe {
    match tokio::time::timeout(timeout, resolver.has_records(domain, record)).await {
        Ok(Ok(true)) => Probe::Present,
        Ok(Ok(false)) => Probe::Absent,
        Ok(Err(e)) => {
            debug!(domain, record = record.as_str(), error = %e, "DNS lookup failed");
            Probe::Inconclusive
        }
        Err(_) => {
            debug!(domain, record = record.as_str(), ?timeout, "DNS lookup timed out");
            Probe::Inconclusive
        }
    }
}

/// Raise `confidence` by `delta`, capped at `MAX_PROBE_CONFIDENCE`, but
/// never below where it started.
pub(crate) fn boost(confidence: u8, delta: u8) -> u8 {
    let raised = (confidence as u16 + delta as u16).min(MAX_PROBE_CONFIDENCE as u16) as u8;
    raised.max(confidence)
}

/// Mutable working state of a layer before it is frozen into a result.
#[derive(Debug, Clone)]
pub(crate) struct Findings {
    pub available: Availability,
    pub confidence: u8,
    pub evidence: Vec<String>,
    pub registrar: Option<String>,
    pub registration_date: Option<String>,
    pub expiration_date: Option<String>,
}

impl Findings {
    pub fn empty() -> Self {
        Self {
            available: Availability::Unknown,
            confidence: 0,
            evidence: Vec::new(),
            registrar: None,
            registration_date: None,
            expiration_date: None,
        }
    }

    /// Start from the prior layer's conclusions.
    pub fn inherit(prior: &VerificationResult) -> Self {
        Self {
            available: prior.available,
            confidence: prior.confidence,
            evidence: prior.evidence.clone(),
            registrar: prior.registrar.clone(),
            registration_date: prior.registration_date.clone(),
            expiration_date: prior.expiration_date.clone(),
        }
    }

    pub fn note<S: Into<String>>(&mut self, evidence: S) {
        self.evidence.push(evidence.into());
    }

    /// Freeze into a result for `layer`, deriving the status.
    pub fn into_result(self, domain: &str, layer: Layer, pricing: Pricing) -> VerificationResult {
        VerificationResult {
            domain: domain.to_string(),
            layer,
            available: self.available,
            confidence: self.confidence,
            status: classify(self.available, self.confidence, layer),
            evidence: self.evidence,
            completed_at: Utc::now(),
            registrar: self.registrar,
            registration_date: self.registration_date,
            expiration_date: self.expiration_date,
            pricing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boost_caps_and_never_lowers() {
        assert_eq!(boost(55, 15), 70);
        assert_eq!(boost(65, 30), 95);
        assert_eq!(boost(90, 15), 95);
        // already above the probe ceiling: hold, don't drop
        assert_eq!(boost(99, 30), 99);
        assert_eq!(boost(255, 255), 255);
    }
}
