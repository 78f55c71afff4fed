//! Integration tests for domain-verify-lib: full progressive sessions
//! against the public in-memory fakes.

use std::sync::Arc;

use domain_verify_lib::fakes::{
    FakeDns, FakeHttp, FakeProber, FakeResolver, FakeWhois, FakeWhoisAnswer,
};
use domain_verify_lib::{
    Availability, DomainCatalog, DomainVerifier, Layer, RecordType, VerificationEvent,
    VerificationResult, VerificationStatus, VerifyConfig, WhoisLookup,
};
use futures::StreamExt;

struct Harness {
    resolver: Arc<FakeResolver>,
    prober: Arc<FakeProber>,
    whois: Option<Arc<FakeWhois>>,
}

impl Harness {
    fn new(resolver: FakeResolver, prober: FakeProber, whois: Option<FakeWhois>) -> Self {
        Self {
            resolver: Arc::new(resolver),
            prober: Arc::new(prober),
            whois: whois.map(Arc::new),
        }
    }

    fn verifier(&self) -> DomainVerifier {
        let whois = self
            .whois
            .clone()
            .map(|w| w as Arc<dyn WhoisLookup>);
        DomainVerifier::with_collaborators(
            VerifyConfig::default(),
            DomainCatalog::builtin(),
            self.resolver.clone(),
            self.prober.clone(),
            whois,
        )
    }

    fn network_calls(&self) -> usize {
        self.resolver.calls()
            + self.prober.calls()
            + self.whois.as_ref().map(|w| w.calls()).unwrap_or(0)
    }
}

fn assert_progression(results: &[VerificationResult]) {
    assert_eq!(results.len(), 3);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.layer.number() as usize, i + 1);
        assert!(result.confidence <= 100);
        assert!(result.pricing.registration > 0.0);
    }
    for pair in results.windows(2) {
        assert!(pair[1].evidence.len() > pair[0].evidence.len());
        assert!(pair[1].evidence.starts_with(&pair[0].evidence));
        assert!(pair[1].completed_at >= pair[0].completed_at);
    }
}

#[tokio::test]
async fn test_known_domain_needs_no_network_for_layer_one() {
    let harness = Harness::new(FakeResolver::all_present(), FakeProber::new(), None);
    let verifier = harness.verifier();

    let mut layers = verifier.verify_progressive("google.com");
    let first = layers.next().await.unwrap();

    assert_eq!(first.layer, Layer::Instant);
    assert_eq!(first.available, Availability::Taken);
    assert_eq!(first.confidence, 99);
    assert_eq!(first.status, VerificationStatus::Taken);
    assert_eq!(harness.network_calls(), 0);
}

#[tokio::test]
async fn test_unregistered_domain_full_session() {
    let harness = Harness::new(
        FakeResolver::new(),
        FakeProber::new(),
        Some(FakeWhois::unregistered()),
    );

    let results: Vec<_> = harness
        .verifier()
        .verify_progressive("acme-widgets.com")
        .collect()
        .await;

    assert_progression(&results);
    assert_eq!(results[0].confidence, 65);
    assert_eq!(results[0].status, VerificationStatus::LikelyAvailable);
    assert_eq!(results[1].confidence, 70);
    assert_eq!(results[2].confidence, 100);
    assert_eq!(results[2].status, VerificationStatus::Available);
    assert_eq!(results[2].pricing.tld, "com");
}

#[tokio::test]
async fn test_registered_domain_full_session() {
    let harness = Harness::new(
        FakeResolver::all_present(),
        FakeProber::new().with("https", FakeHttp::Status(200)),
        Some(FakeWhois::registered("Example Registrar, LLC")),
    );

    let results: Vec<_> = harness
        .verifier()
        .verify_progressive("acme.dev")
        .collect()
        .await;

    assert_progression(&results);
    assert_eq!(results[0].available, Availability::Taken);
    assert_eq!(results[0].confidence, 85);
    assert_eq!(results[1].available, Availability::Taken);
    assert_eq!(results[1].confidence, 95);
    assert_eq!(results[2].confidence, 100);
    assert_eq!(results[2].registrar.as_deref(), Some("Example Registrar, LLC"));
    assert!(results[2].registration_date.is_some());
}

#[tokio::test]
async fn test_without_whois_layer_three_mirrors_layer_two() {
    let harness = Harness::new(
        FakeResolver::new().with(RecordType::Mx, FakeDns::Present),
        FakeProber::new(),
        None,
    );

    let results: Vec<_> = harness
        .verifier()
        .verify_progressive("acme.org")
        .collect()
        .await;

    assert_progression(&results);
    let (layer2, layer3) = (&results[1], &results[2]);
    assert_eq!(layer3.available, layer2.available);
    assert_eq!(layer3.confidence, layer2.confidence);
    assert_eq!(layer3.registrar, layer2.registrar);
    assert_eq!(layer3.pricing, layer2.pricing);
    assert_eq!(layer3.evidence.len(), layer2.evidence.len() + 1);
    assert_eq!(
        layer3.evidence.last().map(String::as_str),
        Some("WHOIS verification unavailable")
    );
}

#[tokio::test]
async fn test_whois_failure_falls_back() {
    let harness = Harness::new(
        FakeResolver::new(),
        FakeProber::new(),
        Some(FakeWhois::new(FakeWhoisAnswer::Fail)),
    );

    let results: Vec<_> = harness
        .verifier()
        .verify_progressive("acme.net")
        .collect()
        .await;

    assert_progression(&results);
    assert_eq!(results[2].confidence, results[1].confidence);
    assert_eq!(results[2].status, VerificationStatus::Available);
    assert_eq!(harness.whois.as_ref().unwrap().calls(), 1);
}

#[tokio::test]
async fn test_stopping_early_skips_later_layers() {
    let harness = Harness::new(
        FakeResolver::new(),
        FakeProber::new(),
        Some(FakeWhois::registered("Registrar")),
    );
    let verifier = harness.verifier();

    let taken: Vec<_> = verifier
        .verify_progressive("acme.com")
        .take(2)
        .collect()
        .await;

    assert_eq!(taken.len(), 2);
    assert_eq!(harness.whois.as_ref().unwrap().calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unresponsive_network_still_completes() {
    let harness = Harness::new(
        FakeResolver::new()
            .with(RecordType::A, FakeDns::Hang)
            .with(RecordType::Ns, FakeDns::Hang)
            .with(RecordType::Mx, FakeDns::Hang)
            .with(RecordType::Soa, FakeDns::Hang),
        FakeProber::new()
            .with("http", FakeHttp::Hang)
            .with("https", FakeHttp::Hang),
        Some(FakeWhois::new(FakeWhoisAnswer::Hang)),
    );

    let results: Vec<_> = harness
        .verifier()
        .verify_progressive("acme.com")
        .collect()
        .await;

    assert_progression(&results);
    assert_eq!(results[0].confidence, 55);
    assert_eq!(results[2].available, Availability::Available);
    assert_eq!(results[2].confidence, 70);
}

#[tokio::test]
async fn test_event_stream_and_verify_many() {
    let harness = Harness::new(FakeResolver::new(), FakeProber::new(), None);
    let verifier = harness.verifier();

    let events: Vec<_> = verifier.event_stream("acme.com").collect().await;
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| match e {
            VerificationEvent::Start { .. } => "start",
            VerificationEvent::Result(_) => "result",
            VerificationEvent::Done { .. } => "done",
            VerificationEvent::Error { .. } => "error",
        })
        .collect();
    assert_eq!(kinds, vec!["start", "result", "result", "result", "done"]);

    let domains: Vec<String> = (0..20).map(|i| format!("acme{}.com", i)).collect();
    let finals: Vec<_> = verifier.verify_many(domains).collect().await;
    assert_eq!(finals.len(), 20);
    assert!(finals
        .iter()
        .all(|(_, r)| r.as_ref().map(|r| r.layer == Layer::Authoritative).unwrap_or(false)));
}
