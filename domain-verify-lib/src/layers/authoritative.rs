//! Layer 3: authoritative WHOIS resolution.
//!
//! One WHOIS attempt, no retries. Without a credential, or when the lookup
//! fails, Layer 2's result is carried forward as the final answer.

use tracing::{debug, warn};

use super::Findings;
use crate::types::{Availability, Layer, VerificationResult};
use crate::verifier::DomainVerifier;

/// Confidence of a registry-backed answer.
const AUTHORITATIVE_CONFIDENCE: u8 = 100;

impl DomainVerifier {
    /// Layer 3: a single WHOIS lookup bounded by `whois_timeout`.
    ///
    /// Always produces a result. Without a WHOIS collaborator, or on any
    /// lookup failure, `prior` is reshaped to layer 3 with an explanatory
    /// evidence entry.
    pub async fn verify_layer3(
        &self,
        domain: &str,
        prior: &VerificationResult,
    ) -> VerificationResult {
        let domain = domain.trim().to_lowercase();

        let Some(whois) = self.whois.as_ref() else {
            debug!(domain = %domain, "no WHOIS credential configured");
            return prior.reshaped(Layer::Authoritative, "WHOIS verification unavailable");
        };

        let timeout = self.config.whois_timeout;
        let record = match tokio::time::timeout(timeout, whois.lookup(&domain)).await {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                warn!(domain = %domain, error = %e, "WHOIS lookup failed");
                return prior.reshaped(
                    Layer::Authoritative,
                    "WHOIS verification failed - using comprehensive DNS result",
                );
            }
            Err(_) => {
                warn!(domain = %domain, ?timeout, "WHOIS lookup timed out");
                return prior.reshaped(
                    Layer::Authoritative,
                    "WHOIS verification failed - using comprehensive DNS result",
                );
            }
        };

        let mut findings = Findings::inherit(prior);
        findings.confidence = AUTHORITATIVE_CONFIDENCE;

        if record.is_registered() {
            findings.available = Availability::Taken;
            findings.registrar = record.registrar.or(findings.registrar);
            findings.registration_date = record.created_date.or(findings.registration_date);
            findings.expiration_date = record.expires_date.or(findings.expiration_date);
            findings.note(match findings.registrar.as_deref() {
                Some(registrar) => {
                    format!("WHOIS confirms registration (registrar: {})", registrar)
                }
                None => "WHOIS confirms registration".to_string(),
            });
        } else {
            findings.available = Availability::Available;
            findings.registrar = None;
            findings.registration_date = None;
            findings.expiration_date = None;
            findings.note("WHOIS shows no registration record");
        }

        findings.into_result(&domain, Layer::Authoritative, prior.pricing.clone())
    }
}
