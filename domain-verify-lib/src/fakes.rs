//! In-memory fakes for the collaborator traits (testing only).
//!
//! Provides `FakeResolver`, `FakeProber` and `FakeWhois`, which answer from
//! fixed tables and count every call so tests can assert that a layer
//! issued no network traffic at all.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::DomainVerifyError;
use crate::protocols::{DnsResolver, HttpProber, RecordType, WhoisLookup, WhoisRecord};

// ---------------------------------------------------------------------------
// FakeResolver
// ---------------------------------------------------------------------------

/// Scripted outcome of a DNS lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeDns {
    Present,
    Absent,
    Fail,
    /// Never completes; only the caller's timeout ends it
    Hang,
}

/// DNS resolver answering from a per-record-type table. Unscripted record
/// types are absent.
#[derive(Debug, Default)]
pub struct FakeResolver {
    answers: HashMap<RecordType, FakeDns>,
    calls: AtomicUsize,
    queried: Mutex<Vec<RecordType>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, record: RecordType, outcome: FakeDns) -> Self {
        self.answers.insert(record, outcome);
        self
    }

    /// Every record type present.
    pub fn all_present() -> Self {
        [RecordType::A, RecordType::Ns, RecordType::Mx, RecordType::Soa]
            .into_iter()
            .fold(Self::new(), |r, t| r.with(t, FakeDns::Present))
    }

    /// Total lookups issued.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Record types queried, in call order.
    pub fn queried(&self) -> Vec<RecordType> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsResolver for FakeResolver {
    async fn has_records(
        &self,
        domain: &str,
        record: RecordType,
    ) -> Result<bool, DomainVerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queried.lock().unwrap().push(record);

        match self.answers.get(&record).copied().unwrap_or(FakeDns::Absent) {
            FakeDns::Present => Ok(true),
            FakeDns::Absent => Ok(false),
            FakeDns::Fail => Err(DomainVerifyError::dns(domain, record.as_str(), "SERVFAIL")),
            FakeDns::Hang => std::future::pending().await,
        }
    }
}

// ---------------------------------------------------------------------------
// FakeProber
// ---------------------------------------------------------------------------

/// Scripted outcome of an HTTP HEAD probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeHttp {
    Status(u16),
    Fail,
    Hang,
}

/// HTTP prober answering per scheme (`"http"` / `"https"`). Unscripted
/// schemes fail to connect.
#[derive(Debug, Default)]
pub struct FakeProber {
    answers: HashMap<&'static str, FakeHttp>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, scheme: &'static str, outcome: FakeHttp) -> Self {
        self.answers.insert(scheme, outcome);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// URLs probed, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpProber for FakeProber {
    async fn head_status(&self, url: &str) -> Result<u16, DomainVerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(url.to_string());

        let scheme = url.split("://").next().unwrap_or_default();
        match self.answers.get(scheme).copied().unwrap_or(FakeHttp::Fail) {
            FakeHttp::Status(code) => Ok(code),
            FakeHttp::Fail => Err(DomainVerifyError::http(url, "connection refused")),
            FakeHttp::Hang => std::future::pending().await,
        }
    }
}

// ---------------------------------------------------------------------------
// FakeWhois
// ---------------------------------------------------------------------------

/// Scripted outcome of a WHOIS lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeWhoisAnswer {
    Record(WhoisRecord),
    Fail,
    Hang,
}

/// WHOIS lookup returning one scripted answer for every domain.
#[derive(Debug)]
pub struct FakeWhois {
    answer: FakeWhoisAnswer,
    calls: AtomicUsize,
}

impl FakeWhois {
    pub fn new(answer: FakeWhoisAnswer) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    /// Registry answer for a registered domain.
    pub fn registered(registrar: &str) -> Self {
        Self::new(FakeWhoisAnswer::Record(WhoisRecord {
            registrar: Some(registrar.to_string()),
            created_date: Some("2004-03-12T00:00:00Z".to_string()),
            expires_date: Some("2030-03-12T00:00:00Z".to_string()),
            name_servers: vec!["ns1.example-dns.net".to_string()],
            ..Default::default()
        }))
    }

    /// Registry answer for an unregistered domain.
    pub fn unregistered() -> Self {
        Self::new(FakeWhoisAnswer::Record(WhoisRecord::default()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WhoisLookup for FakeWhois {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, DomainVerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.answer {
            FakeWhoisAnswer::Record(record) => Ok(record.clone()),
            FakeWhoisAnswer::Fail => Err(DomainVerifyError::whois_with_status(
                domain,
                "WHOIS API returned error: 503 Service Unavailable",
                503,
            )),
            FakeWhoisAnswer::Hang => std::future::pending().await,
        }
    }
}
