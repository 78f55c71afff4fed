//! Main domain verifier implementation.
//!
//! `DomainVerifier` owns the configuration, the static catalog and the three
//! collaborators, and sequences the layers for a domain. The layer
//! algorithms themselves live in `crate::layers`.

use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::DomainCatalog;
use crate::error::DomainVerifyError;
use crate::protocols::{
    DnsResolver, DohResolver, HttpProber, ReqwestProber, WhoisApiClient, WhoisLookup,
};
use crate::types::{VerificationResult, VerifyConfig};
use crate::utils::validate_domain;

/// A boxed, sendable stream as returned by the verifier.
pub type ResultStream = Pin<Box<dyn Stream<Item = VerificationResult> + Send>>;

/// Progressive domain verifier.
///
/// Cheap to clone: every component is shared read-only behind an `Arc`, so
/// any number of sessions can run concurrently without coordination.
///
/// # Example
///
/// ```rust,no_run
/// use domain_verify_lib::DomainVerifier;
/// use futures::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let verifier = DomainVerifier::new()?;
///     let mut layers = verifier.verify_progressive("example.com");
///     while let Some(result) = layers.next().await {
///         println!("layer {}: {} ({}%)", result.layer, result.status, result.confidence);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct DomainVerifier {
    pub(crate) config: Arc<VerifyConfig>,
    pub(crate) catalog: Arc<DomainCatalog>,
    pub(crate) resolver: Arc<dyn DnsResolver>,
    pub(crate) prober: Arc<dyn HttpProber>,
    /// Absent when no WHOIS credential is configured
    pub(crate) whois: Option<Arc<dyn WhoisLookup>>,
}

/// Where a progressive session is. Holds nothing but the last result.
enum Stage {
    Instant,
    Fast(VerificationResult),
    Authoritative(VerificationResult),
    Finished,
}

impl DomainVerifier {
    /// Create a verifier with default configuration and the built-in catalog.
    ///
    /// Without a WHOIS API key Layer 3 degrades to Layer 2's answer.
    pub fn new() -> Result<Self, DomainVerifyError> {
        Self::with_config(VerifyConfig::default())
    }

    /// Create a verifier with custom configuration and the built-in catalog.
    pub fn with_config(config: VerifyConfig) -> Result<Self, DomainVerifyError> {
        Self::with_catalog(config, DomainCatalog::builtin())
    }

    /// Create a verifier with custom configuration and catalog, using the
    /// network-backed collaborators.
    pub fn with_catalog(
        config: VerifyConfig,
        catalog: DomainCatalog,
    ) -> Result<Self, DomainVerifyError> {
        let resolver = Arc::new(DohResolver::new(
            config.doh_endpoint.clone(),
            &config.user_agent,
        )?);
        let prober = Arc::new(ReqwestProber::new(&config.user_agent)?);
        let whois: Option<Arc<dyn WhoisLookup>> = match &config.whois_api_key {
            Some(key) => Some(Arc::new(WhoisApiClient::new(
                config.whois_endpoint.clone(),
                key.clone(),
                &config.user_agent,
            )?)),
            None => None,
        };

        Ok(Self::with_collaborators(
            config, catalog, resolver, prober, whois,
        ))
    }

    /// Assemble a verifier from explicit collaborators.
    pub fn with_collaborators(
        config: VerifyConfig,
        catalog: DomainCatalog,
        resolver: Arc<dyn DnsResolver>,
        prober: Arc<dyn HttpProber>,
        whois: Option<Arc<dyn WhoisLookup>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            resolver,
            prober,
            whois,
        }
    }

    /// Get the configuration for this verifier.
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Get the catalog for this verifier.
    pub fn catalog(&self) -> &DomainCatalog {
        &self.catalog
    }

    /// Stream the three layer results for `domain`, in order.
    ///
    /// The stream is lazy: a layer only runs when the consumer polls for
    /// it, so dropping the stream after Layer 1 means Layers 2 and 3 are
    /// never invoked. `domain` must already be valid (see
    /// [`validate_domain`]).
    pub fn verify_progressive(&self, domain: &str) -> ResultStream {
        let verifier = self.clone();
        let domain = domain.trim().to_lowercase();

        let layers = stream::unfold(Stage::Instant, move |stage| {
            let verifier = verifier.clone();
            let domain = domain.clone();
            async move {
                match stage {
                    Stage::Instant => {
                        let result = verifier.verify_layer1(&domain).await;
                        Some((result.clone(), Stage::Fast(result)))
                    }
                    Stage::Fast(prior) => {
                        let result = verifier.verify_layer2(&domain, &prior).await;
                        Some((result.clone(), Stage::Authoritative(result)))
                    }
                    Stage::Authoritative(prior) => {
                        let result = verifier.verify_layer3(&domain, &prior).await;
                        debug!(
                            domain = %domain,
                            status = %result.status,
                            confidence = result.confidence,
                            "verification complete"
                        );
                        Some((result, Stage::Finished))
                    }
                    Stage::Finished => None,
                }
            }
        });

        Box::pin(layers)
    }

    /// Validate `domain`, run all three layers and return the final result.
    ///
    /// # Errors
    ///
    /// Returns `DomainVerifyError::InvalidDomain` if the domain is
    /// malformed. Network problems never surface as errors.
    pub async fn verify(&self, domain: &str) -> Result<VerificationResult, DomainVerifyError> {
        let domain = validate_domain(domain)?;

        let mut layers = self.verify_progressive(&domain);
        let mut last = None;
        while let Some(result) = layers.next().await {
            last = Some(result);
        }

        last.ok_or_else(|| DomainVerifyError::internal("verification produced no result"))
    }

    /// Verify many domains as independent concurrent sessions, bounded by
    /// the configured concurrency. Results arrive in completion order.
    pub fn verify_many(
        &self,
        domains: Vec<String>,
    ) -> Pin<Box<dyn Stream<Item = (String, Result<VerificationResult, DomainVerifyError>)> + Send>>
    {
        let verifier = self.clone();
        let concurrency = self.config.effective_concurrency();

        let sessions = stream::iter(domains)
            .map(move |domain| {
                let verifier = verifier.clone();
                async move {
                    let result = verifier.verify(&domain).await;
                    (domain, result)
                }
            })
            .buffer_unordered(concurrency);

        Box::pin(sessions)
    }
}
