//! Collaborator clients used by the verification layers.
//!
//! Each collaborator sits behind an async trait so the layers can run
//! against in-memory fakes. The layers, not the clients, apply the per-call
//! timeouts.

/// DNS-over-HTTPS record lookups
pub mod dns;

/// HTTP/HTTPS HEAD probes
pub mod http;

/// WHOIS API lookups
pub mod whois;

pub use dns::{DnsResolver, DohResolver, RecordType};
pub use http::{responds_to_http, HttpProber, ReqwestProber};
pub use whois::{WhoisApiClient, WhoisLookup, WhoisRecord};
