//! DNS-over-HTTPS lookups.
//!
//! Uses the JSON flavour of DoH (`application/dns-json`): a GET with `name`
//! and `type` query parameters, answered with an object whose `Answer`
//! array lists the matching records. A record type is "present" iff that
//! array is non-empty.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

use crate::error::DomainVerifyError;

/// DNS record types the layers query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Ns,
    Mx,
    Soa,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Ns => "NS",
            RecordType::Mx => "MX",
            RecordType::Soa => "SOA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers "does this domain have records of this type?".
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn has_records(
        &self,
        domain: &str,
        record: RecordType,
    ) -> Result<bool, DomainVerifyError>;
}

/// DoH JSON response. Only the answer section matters here.
#[derive(Debug, Deserialize)]
pub(crate) struct DohResponse {
    #[serde(rename = "Status", default)]
    pub status: u32,

    #[serde(rename = "Answer", default)]
    pub answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct DohAnswer {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub record_type: u16,

    #[serde(default)]
    pub data: String,
}

impl DohResponse {
    pub fn has_answers(&self) -> bool {
        !self.answer.is_empty()
    }
}

/// DNS-over-HTTPS resolver backed by reqwest.
#[derive(Clone)]
pub struct DohResolver {
    /// HTTP client for DoH requests
    http_client: reqwest::Client,
    /// DoH JSON endpoint, e.g. `https://cloudflare-dns.com/dns-query`
    endpoint: String,
}

impl DohResolver {
    /// Create a resolver for the given endpoint.
    pub fn new<E: Into<String>>(
        endpoint: E,
        user_agent: &str,
    ) -> Result<Self, DomainVerifyError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                DomainVerifyError::network_with_source(
                    "Failed to create DoH HTTP client",
                    e.to_string(),
                )
            })?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DnsResolver for DohResolver {
    async fn has_records(
        &self,
        domain: &str,
        record: RecordType,
    ) -> Result<bool, DomainVerifyError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .query(&[("name", domain), ("type", record.as_str())])
            .send()
            .await
            .map_err(|e| DomainVerifyError::dns(domain, record.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainVerifyError::dns(
                domain,
                record.as_str(),
                format!("DoH endpoint returned {}", status),
            ));
        }

        let body: DohResponse = response.json().await.map_err(|e| {
            DomainVerifyError::dns(domain, record.as_str(), format!("Bad DoH payload: {}", e))
        })?;

        debug!(
            domain,
            record = record.as_str(),
            rcode = body.status,
            answers = body.answer.len(),
            "DoH lookup complete"
        );

        Ok(body.has_answers())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer_present() {
        let json = r#"{
            "Status": 0,
            "TC": false,
            "Question": [{"name": "google.com", "type": 2}],
            "Answer": [
                {"name": "google.com", "type": 2, "TTL": 21600, "data": "ns1.google.com."},
                {"name": "google.com", "type": 2, "TTL": 21600, "data": "ns2.google.com."}
            ]
        }"#;

        let response: DohResponse = serde_json::from_str(json).unwrap();
        assert!(response.has_answers());
        assert_eq!(response.answer[0].data, "ns1.google.com.");
    }

    #[test]
    fn test_parse_nxdomain_has_no_answer() {
        let json = r#"{
            "Status": 3,
            "Question": [{"name": "xk29fh38dksla92.com", "type": 1}],
            "Authority": [{"name": "com", "type": 6, "TTL": 900, "data": "a.gtld-servers.net."}]
        }"#;

        let response: DohResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, 3);
        assert!(!response.has_answers());
    }

    #[test]
    fn test_empty_answer_array_is_absent() {
        let response: DohResponse = serde_json::from_str(r#"{"Status":0,"Answer":[]}"#).unwrap();
        assert!(!response.has_answers());
    }

    #[test]
    fn test_record_type_names() {
        assert_eq!(RecordType::A.to_string(), "A");
        assert_eq!(RecordType::Soa.as_str(), "SOA");
    }
}
