//! # Domain Verify Library
//!
//! Progressive domain availability verification in three layers of
//! increasing cost and certainty.
//!
//! 1. **Instant**: known-domain lookup, name-shape heuristics and at most
//!    one DNS A-record query.
//! 2. **Fast**: concurrent NS/MX lookups, then (when warranted) an SOA
//!    lookup and an HTTP/HTTPS probe.
//! 3. **Authoritative**: one WHOIS API lookup, degrading to Layer 2's
//!    answer when no credential is configured or the lookup fails.
//!
//! Each layer yields a complete [`VerificationResult`]; consumers can stop
//! pulling at any point and later layers never run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_verify_lib::{DomainVerifier, VerifyConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = VerifyConfig::default().with_whois_api_key("my-key");
//!     let verifier = DomainVerifier::with_config(config)?;
//!
//!     let mut layers = verifier.verify_progressive("example.com");
//!     while let Some(result) = layers.next().await {
//!         println!("Layer {}: {} ({}%)", result.layer, result.status, result.confidence);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Testing
//!
//! The network collaborators sit behind the [`DnsResolver`], [`HttpProber`]
//! and [`WhoisLookup`] traits. The [`fakes`] module provides counting
//! in-memory implementations for use with
//! [`DomainVerifier::with_collaborators`].

// Re-export main public API types and functions
pub use catalog::{DomainCatalog, KnownDomain};
pub use classify::classify;
pub use config::{
    load_env_config, parse_duration_string, CatalogConfig, ConfigManager, EnvConfig, FileConfig,
    VerificationConfig,
};
pub use error::DomainVerifyError;
pub use events::{EventStream, VerificationEvent};
pub use protocols::{
    DnsResolver, DohResolver, HttpProber, RecordType, ReqwestProber, WhoisApiClient, WhoisLookup,
    WhoisRecord,
};
pub use types::{
    Availability, Layer, Pricing, VerificationResult, VerificationStatus, VerifyConfig,
    DEFAULT_DOH_ENDPOINT, DEFAULT_WHOIS_ENDPOINT,
};
pub use utils::{extract_tld, parse_domain_list, root_label, validate_domain};
pub use verifier::{DomainVerifier, ResultStream};

// Public modules
pub mod fakes;

// Internal modules - these are not part of the public API
mod catalog;
mod classify;
mod config;
mod error;
mod events;
mod layers;
mod protocols;
mod types;
mod utils;
mod verifier;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainVerifyError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
