//! Core data types for progressive domain verification.
//!
//! This module defines the verification result produced by every layer,
//! the tri-state availability and status enums, static pricing rows, and
//! the engine configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::DomainVerifyError;

/// Tri-state availability determination.
///
/// On the wire this is `true` / `false` / `null`, matching the progressive
/// output protocol consumers expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Availability {
    /// Domain appears unregistered
    Available,
    /// Domain appears registered
    Taken,
    /// No determination made yet (only transient inside a layer)
    Unknown,
}

impl Availability {
    pub fn is_available(self) -> bool {
        matches!(self, Availability::Available)
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Availability::Unknown)
    }
}

impl From<Option<bool>> for Availability {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Availability::Available,
            Some(false) => Availability::Taken,
            None => Availability::Unknown,
        }
    }
}

impl From<Availability> for Option<bool> {
    fn from(value: Availability) -> Self {
        match value {
            Availability::Available => Some(true),
            Availability::Taken => Some(false),
            Availability::Unknown => None,
        }
    }
}

/// User-facing status derived by the status classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Checking,
    LikelyAvailable,
    LikelyTaken,
    Available,
    Taken,
}

impl VerificationStatus {
    /// The wire name of the status (e.g. `likely_available`).
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Checking => "checking",
            VerificationStatus::LikelyAvailable => "likely_available",
            VerificationStatus::LikelyTaken => "likely_taken",
            VerificationStatus::Available => "available",
            VerificationStatus::Taken => "taken",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verification layer, in increasing order of cost and authority.
///
/// Serialized as the bare integer `1`, `2` or `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Layer {
    /// Pattern heuristics plus one DNS A-record lookup
    Instant = 1,
    /// NS/MX/SOA lookups plus HTTP/HTTPS probe
    Fast = 2,
    /// WHOIS registry lookup
    Authoritative = 3,
}

impl Layer {
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl From<Layer> for u8 {
    fn from(layer: Layer) -> Self {
        layer.number()
    }
}

impl TryFrom<u8> for Layer {
    type Error = DomainVerifyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Layer::Instant),
            2 => Ok(Layer::Fast),
            3 => Ok(Layer::Authoritative),
            other => Err(DomainVerifyError::config(format!(
                "Layer must be 1, 2 or 3 (got {})",
                other
            ))),
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Price row from the static TLD pricing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    /// TLD the price applies to (without leading dot)
    pub tld: String,
    /// First-year registration price
    pub registration: f64,
    /// Yearly renewal price
    pub renewal: f64,
    /// ISO 4217 currency code
    pub currency: String,
}

/// Result of one verification layer for one domain.
///
/// A fresh value is built for every layer; the previous layer's result is
/// only ever read. `evidence` is append-only across layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// The domain name that was verified (e.g., "example.com")
    pub domain: String,

    /// Which layer produced this result
    pub layer: Layer,

    /// Availability determination
    pub available: Availability,

    /// Certainty in the availability determination, 0-100
    pub confidence: u8,

    /// Status derived from (available, confidence, layer)
    pub status: VerificationStatus,

    /// Signals that justified the conclusion, oldest first
    pub evidence: Vec<String>,

    /// When this layer completed
    pub completed_at: DateTime<Utc>,

    /// Registrar managing the domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,

    /// When the domain was first registered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<String>,

    /// When the domain registration expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// Static price for the domain's TLD
    pub pricing: Pricing,
}

impl VerificationResult {
    /// Build a copy of this result for another layer with one evidence entry
    /// appended. Availability, confidence, registration details and pricing
    /// are carried over untouched; the status is re-derived for the new
    /// layer.
    pub fn reshaped<E: Into<String>>(&self, layer: Layer, note: E) -> Self {
        let mut evidence = self.evidence.clone();
        evidence.push(note.into());

        Self {
            layer,
            status: crate::classify::classify(self.available, self.confidence, layer),
            evidence,
            completed_at: Utc::now(),
            ..self.clone()
        }
    }
}

/// Configuration for the verification engine.
///
/// Timeouts are per network call; a call that exceeds its timeout counts as
/// "no evidence" and never fails the session.
///
/// Files and environment variables feed it through [`crate::FileConfig`]
/// and [`crate::EnvConfig`]; it is not deserialized directly.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Timeout for the single Layer 1 A-record lookup
    /// Default: 300ms
    pub instant_dns_timeout: Duration,

    /// Timeout for each Layer 2 DNS record lookup (NS, MX, SOA)
    /// Default: 600ms
    pub record_timeout: Duration,

    /// Timeout for each HTTP/HTTPS HEAD probe
    /// Default: 700ms
    pub http_timeout: Duration,

    /// Timeout for the WHOIS API call
    /// Default: 15 seconds
    pub whois_timeout: Duration,

    /// DNS-over-HTTPS JSON endpoint
    pub doh_endpoint: String,

    /// WHOIS API endpoint
    pub whois_endpoint: String,

    /// WHOIS API credential; Layer 3 degrades gracefully without one
    pub whois_api_key: Option<String>,

    /// Maximum number of concurrent sessions in `verify_many`
    /// Default: 10, Range: 1-100
    pub concurrency: usize,

    /// Client identifier sent with every outgoing request
    pub user_agent: String,
}

/// Default DNS-over-HTTPS endpoint (JSON API)
pub const DEFAULT_DOH_ENDPOINT: &str = "https://cloudflare-dns.com/dns-query";

/// Default WHOIS API endpoint
pub const DEFAULT_WHOIS_ENDPOINT: &str = "https://www.whoisxmlapi.com/whoisserver/WhoisService";

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            instant_dns_timeout: Duration::from_millis(300),
            record_timeout: Duration::from_millis(600),
            http_timeout: Duration::from_millis(700),
            whois_timeout: Duration::from_secs(15),
            doh_endpoint: DEFAULT_DOH_ENDPOINT.to_string(),
            whois_endpoint: DEFAULT_WHOIS_ENDPOINT.to_string(),
            whois_api_key: None,
            concurrency: 10,
            user_agent: format!("domain-verify/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl VerifyConfig {
    /// Set session concurrency; capped at 100 to prevent resource exhaustion.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Set the WHOIS API credential. Empty keys are treated as absent.
    pub fn with_whois_api_key<K: Into<String>>(mut self, key: K) -> Self {
        let key = key.into();
        self.whois_api_key = if key.trim().is_empty() {
            None
        } else {
            Some(key.trim().to_string())
        };
        self
    }

    pub fn with_doh_endpoint<U: Into<String>>(mut self, url: U) -> Self {
        self.doh_endpoint = url.into();
        self
    }

    pub fn with_whois_endpoint<U: Into<String>>(mut self, url: U) -> Self {
        self.whois_endpoint = url.into();
        self
    }

    pub fn with_instant_dns_timeout(mut self, timeout: Duration) -> Self {
        self.instant_dns_timeout = timeout;
        self
    }

    pub fn with_record_timeout(mut self, timeout: Duration) -> Self {
        self.record_timeout = timeout;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }

    /// Concurrency used for fan-out, clamped to 1-100 even when the field
    /// was assigned directly.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, 100)
    }

    /// Whether Layer 3 can issue a WHOIS lookup at all.
    pub fn has_whois_credential(&self) -> bool {
        self.whois_api_key.is_some()
    }
}
