//! Layer 2: fast probe.
//!
//! NS and MX lookups always run, concurrently. SOA and the HTTP/HTTPS probe
//! only run when the domain currently looks taken or Layer 1 was unsure,
//! and then concurrently with each other. Every signal can only strengthen
//! a "taken" determination.

use tracing::debug;

use super::{boost, lookup, Findings, Probe};
use crate::protocols::{responds_to_http, RecordType};
use crate::types::{Availability, Layer, VerificationResult};
use crate::verifier::DomainVerifier;

/// Inherited confidence at which an "available" verdict skips the
/// expensive probes.
const SKIP_PROBE_CONFIDENCE: u8 = 65;

/// Floor for an "available" verdict after Layer 2.
const AVAILABLE_FLOOR: u8 = 70;

/// Age assumed for any domain that publishes an SOA record.
///
/// This is a flat estimate, not a measurement.
const SOA_ESTIMATED_AGE_DAYS: u32 = 365;

/// Domains older than this are treated as established registrations.
const ESTABLISHED_AGE_DAYS: u32 = 90;

fn estimated_age_days(soa: Probe) -> Option<u32> {
    soa.is_present().then_some(SOA_ESTIMATED_AGE_DAYS)
}

impl DomainVerifier {
    /// Layer 2: concurrent NS/MX lookups, then (conditionally) concurrent
    /// SOA lookup and HTTP/HTTPS probe, scored on top of Layer 1's result.
    ///
    /// Confidence never drops below `prior.confidence`.
    pub async fn verify_layer2(
        &self,
        domain: &str,
        prior: &VerificationResult,
    ) -> VerificationResult {
        let domain = domain.trim().to_lowercase();
        let mut findings = Findings::inherit(prior);

        let skip_http =
            findings.available.is_available() && findings.confidence >= SKIP_PROBE_CONFIDENCE;

        let resolver = self.resolver.as_ref();
        let record_timeout = self.config.record_timeout;

        let (ns, mx) = tokio::join!(
            lookup(resolver, &domain, RecordType::Ns, record_timeout),
            lookup(resolver, &domain, RecordType::Mx, record_timeout),
        );

        let records_found = [ns, mx].iter().filter(|p| p.is_present()).count() as u8;

        // NS/MX hits make the domain look taken, which warrants the deeper probes
        let run_deep_probes = !skip_http || records_found > 0;

        let (soa, http_responded) = if run_deep_probes {
            tokio::join!(
                lookup(resolver, &domain, RecordType::Soa, record_timeout),
                responds_to_http(self.prober.as_ref(), &domain, self.config.http_timeout),
            )
        } else {
            (Probe::Skipped, false)
        };

        debug!(
            domain = %domain,
            ?ns,
            ?mx,
            ?soa,
            http_responded,
            skipped_deep_probes = !run_deep_probes,
            "layer 2 probes complete"
        );

        if records_found > 0 {
            findings.available = Availability::Taken;
            findings.confidence = boost(findings.confidence, 15 * records_found);
            findings.note(format!(
                "Found {} critical DNS records (NS/MX)",
                records_found
            ));
        }

        if http_responded {
            findings.available = Availability::Taken;
            findings.confidence = boost(findings.confidence, 15);
            findings.note("Domain responds to HTTP requests");
        }

        if let Some(age) = estimated_age_days(soa) {
            if age > ESTABLISHED_AGE_DAYS {
                findings.available = Availability::Taken;
                findings.confidence = boost(findings.confidence, 10);
                findings.note(format!(
                    "SOA record present - estimated domain age {} days",
                    age
                ));
            }
        }

        // Nothing found at all: an undetermined prior resolves to available
        if findings.available.is_unknown() {
            findings.available = Availability::Available;
        }

        if findings.available.is_available() && findings.confidence < AVAILABLE_FLOOR {
            findings.confidence = AVAILABLE_FLOOR;
            findings.note("No significant DNS infrastructure found");
        }

        let pricing = self.catalog.pricing_for(&domain);
        findings.into_result(&domain, Layer::Fast, pricing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DomainCatalog;
    use crate::fakes::{FakeDns, FakeHttp, FakeProber, FakeResolver};
    use crate::types::{VerificationStatus, VerifyConfig};
    use std::sync::Arc;

    fn verifier(resolver: Arc<FakeResolver>, prober: Arc<FakeProber>) -> DomainVerifier {
        DomainVerifier::with_collaborators(
            VerifyConfig::default(),
            DomainCatalog::builtin(),
            resolver,
            prober,
            None,
        )
    }

    fn prior(available: Availability, confidence: u8) -> VerificationResult {
        let mut findings = Findings::empty();
        findings.available = available;
        findings.confidence = confidence;
        findings.note("layer one evidence");
        findings.into_result(
            "acme.com",
            Layer::Instant,
            DomainCatalog::builtin().pricing_for("acme.com"),
        )
    }

    #[tokio::test]
    async fn test_ns_and_mx_raise_confidence_by_thirty() {
        let resolver = Arc::new(
            FakeResolver::new()
                .with(RecordType::Ns, FakeDns::Present)
                .with(RecordType::Mx, FakeDns::Present),
        );
        let prober = Arc::new(FakeProber::new());
        let prior = prior(Availability::Available, 65);

        let result = verifier(resolver, prober).verify_layer2("acme.com", &prior).await;

        assert_eq!(result.layer, Layer::Fast);
        assert_eq!(result.available, Availability::Taken);
        assert_eq!(result.confidence, 95);
        assert_eq!(result.status, VerificationStatus::Taken);
        assert_eq!(result.evidence[0], "layer one evidence");
        assert_eq!(result.evidence[1], "Found 2 critical DNS records (NS/MX)");
    }

    #[tokio::test]
    async fn test_confident_available_skips_soa_and_http() {
        let resolver = Arc::new(FakeResolver::new());
        let prober = Arc::new(FakeProber::new().with("https", FakeHttp::Status(200)));
        let prior = prior(Availability::Available, 80);

        let result = verifier(resolver.clone(), prober.clone())
            .verify_layer2("acme.com", &prior)
            .await;

        assert_eq!(prober.calls(), 0);
        assert_eq!(resolver.calls(), 2);
        assert!(!resolver.queried().contains(&RecordType::Soa));
        assert_eq!(result.available, Availability::Available);
        assert_eq!(result.confidence, 80);
        assert_eq!(result.evidence, vec!["layer one evidence"]);
    }

    #[tokio::test]
    async fn test_unsure_prior_runs_all_probes() {
        let resolver = Arc::new(FakeResolver::new().with(RecordType::Soa, FakeDns::Present));
        let prober = Arc::new(FakeProber::new().with("http", FakeHttp::Status(302)));
        let prior = prior(Availability::Available, 55);

        let result = verifier(resolver.clone(), prober.clone())
            .verify_layer2("acme.com", &prior)
            .await;

        assert_eq!(resolver.calls(), 3);
        assert!(prober.calls() >= 1);
        assert_eq!(result.available, Availability::Taken);
        // 55 + 15 (HTTP) + 10 (SOA age)
        assert_eq!(result.confidence, 80);
        assert_eq!(result.status, VerificationStatus::LikelyTaken);
        assert!(result
            .evidence
            .contains(&"Domain responds to HTTP requests".to_string()));
        assert!(result.evidence.iter().any(|e| e.contains("365 days")));
    }

    #[tokio::test]
    async fn test_nothing_found_floors_available_confidence() {
        let resolver = Arc::new(FakeResolver::new());
        let prober = Arc::new(FakeProber::new());
        let prior = prior(Availability::Available, 55);

        let result = verifier(resolver, prober).verify_layer2("acme.com", &prior).await;

        assert_eq!(result.available, Availability::Available);
        assert_eq!(result.confidence, 70);
        assert_eq!(result.status, VerificationStatus::LikelyAvailable);
        assert_eq!(
            result.evidence.last().map(String::as_str),
            Some("No significant DNS infrastructure found")
        );
    }

    #[tokio::test]
    async fn test_never_flips_taken_back_to_available() {
        let resolver = Arc::new(FakeResolver::new());
        let prober = Arc::new(FakeProber::new());
        let prior = prior(Availability::Taken, 85);

        let result = verifier(resolver, prober).verify_layer2("acme.com", &prior).await;

        assert_eq!(result.available, Availability::Taken);
        assert_eq!(result.confidence, 85);
    }

    #[tokio::test]
    async fn test_high_prior_confidence_is_not_capped_down() {
        let resolver = Arc::new(FakeResolver::all_present());
        let prober = Arc::new(FakeProber::new().with("https", FakeHttp::Status(200)));
        let prior = prior(Availability::Taken, 99);

        let result = verifier(resolver, prober).verify_layer2("acme.com", &prior).await;

        assert_eq!(result.confidence, 99);
        assert_eq!(result.status, VerificationStatus::Taken);
    }

    #[tokio::test]
    async fn test_records_found_trigger_deep_probes_even_when_confident() {
        let resolver = Arc::new(FakeResolver::new().with(RecordType::Ns, FakeDns::Present));
        let prober = Arc::new(FakeProber::new());
        let prior = prior(Availability::Available, 80);

        let result = verifier(resolver.clone(), prober.clone())
            .verify_layer2("acme.com", &prior)
            .await;

        assert!(resolver.queried().contains(&RecordType::Soa));
        assert_eq!(prober.calls(), 2);
        assert_eq!(result.available, Availability::Taken);
        assert_eq!(result.confidence, 95);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_timeouts_are_no_evidence() {
        let resolver = Arc::new(
            FakeResolver::new()
                .with(RecordType::Ns, FakeDns::Hang)
                .with(RecordType::Mx, FakeDns::Fail)
                .with(RecordType::Soa, FakeDns::Hang),
        );
        let prober = Arc::new(
            FakeProber::new()
                .with("https", FakeHttp::Hang)
                .with("http", FakeHttp::Hang),
        );
        let prior = prior(Availability::Available, 55);

        let result = verifier(resolver, prober).verify_layer2("acme.com", &prior).await;

        assert_eq!(result.available, Availability::Available);
        assert_eq!(result.confidence, 70);
    }
}
