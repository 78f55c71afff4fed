//! WHOIS API client.
//!
//! Layer 3 treats the registry as ground truth. The lookup goes through a
//! JSON WHOIS API (`?apiKey=..&domainName=..&outputFormat=JSON`) and is
//! attempted exactly once.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::DomainVerifyError;

/// Registration facts extracted from a WHOIS payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisRecord {
    /// Sponsoring registrar name
    pub registrar: Option<String>,

    /// When the domain was first registered
    pub created_date: Option<String>,

    /// When the registration expires
    pub expires_date: Option<String>,

    /// Delegated nameserver hostnames
    pub name_servers: Vec<String>,

    /// Whether a registrant contact block is present
    pub has_registrant: bool,

    /// Whether an administrative contact block is present
    pub has_admin_contact: bool,

    /// Whether a technical contact block is present
    pub has_tech_contact: bool,
}

impl WhoisRecord {
    /// A domain is registered if the registry names a registrar, a creation
    /// date, any nameserver, or any contact block.
    pub fn is_registered(&self) -> bool {
        self.registrar.is_some()
            || self.created_date.is_some()
            || !self.name_servers.is_empty()
            || self.has_registrant
            || self.has_admin_contact
            || self.has_tech_contact
    }

    /// Extract a record from a WHOIS API JSON payload.
    ///
    /// Fields are read from the top-level `WhoisRecord` object and, when
    /// missing there, from its nested `registryData` block (thin registries
    /// only populate the latter).
    pub fn from_payload(json: &Value) -> Self {
        let root = json.get("WhoisRecord").unwrap_or(json);
        let registry = root.get("registryData");

        let field = |name: &str| {
            non_empty_str(root.get(name))
                .or_else(|| non_empty_str(registry.and_then(|r| r.get(name))))
        };

        let mut name_servers = extract_host_names(root);
        if name_servers.is_empty() {
            if let Some(registry) = registry {
                name_servers = extract_host_names(registry);
            }
        }

        let contact = |name: &str| {
            has_contact(root.get(name)) || has_contact(registry.and_then(|r| r.get(name)))
        };

        Self {
            registrar: field("registrarName"),
            created_date: field("createdDate"),
            expires_date: field("expiresDate"),
            name_servers,
            has_registrant: contact("registrant"),
            has_admin_contact: contact("administrativeContact"),
            has_tech_contact: contact("technicalContact"),
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn extract_host_names(block: &Value) -> Vec<String> {
    block
        .get("nameServers")
        .and_then(|ns| ns.get("hostNames"))
        .and_then(|h| h.as_array())
        .map(|hosts| {
            hosts
                .iter()
                .filter_map(|h| h.as_str())
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(|h| h.to_lowercase())
                .collect()
        })
        .unwrap_or_default()
}

/// A contact block counts when it is a non-empty object.
fn has_contact(value: Option<&Value>) -> bool {
    value
        .and_then(|v| v.as_object())
        .map(|o| !o.is_empty())
        .unwrap_or(false)
}

/// Performs one authoritative WHOIS lookup.
#[async_trait]
pub trait WhoisLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, DomainVerifyError>;
}

/// WHOIS JSON API client.
#[derive(Clone)]
pub struct WhoisApiClient {
    /// HTTP client for WHOIS API requests
    http_client: reqwest::Client,
    /// API endpoint
    endpoint: String,
    /// API credential
    api_key: String,
    /// WHOIS-specific client identifier sent as the User-Agent
    user_agent: String,
}

impl WhoisApiClient {
    pub fn new<E: Into<String>, K: Into<String>>(
        endpoint: E,
        api_key: K,
        user_agent: &str,
    ) -> Result<Self, DomainVerifyError> {
        let http_client = reqwest::Client::builder().build().map_err(|e| {
            DomainVerifyError::network_with_source(
                "Failed to create WHOIS HTTP client",
                e.to_string(),
            )
        })?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            user_agent: format!("{} (whois-client)", user_agent),
        })
    }

    /// The User-Agent sent with WHOIS lookups.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl WhoisLookup for WhoisApiClient {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, DomainVerifyError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("domainName", domain),
                ("outputFormat", "JSON"),
            ])
            .send()
            .await
            .map_err(|e| DomainVerifyError::whois(domain, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainVerifyError::whois_with_status(
                domain,
                format!("WHOIS API returned error: {}", status),
                status.as_u16(),
            ));
        }

        let json = response.json::<Value>().await.map_err(|e| {
            DomainVerifyError::whois(domain, format!("Failed to parse JSON: {}", e))
        })?;

        // The API reports bad keys, exhausted credit etc. inside a 200 body
        if let Some(message) = non_empty_str(json.get("ErrorMessage").and_then(|e| e.get("msg")))
        {
            return Err(DomainVerifyError::whois(domain, message));
        }

        let record = WhoisRecord::from_payload(&json);
        debug!(
            domain,
            registered = record.is_registered(),
            registrar = record.registrar.as_deref().unwrap_or("-"),
            "WHOIS lookup complete"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registered_payload() {
        let payload = json!({
            "WhoisRecord": {
                "domainName": "google.com",
                "registrarName": "MarkMonitor Inc.",
                "createdDate": "1997-09-15T04:00:00Z",
                "expiresDate": "2028-09-14T04:00:00Z",
                "nameServers": {
                    "hostNames": ["NS1.GOOGLE.COM", "ns2.google.com"]
                },
                "registrant": {"organization": "Google LLC", "country": "UNITED STATES"}
            }
        });

        let record = WhoisRecord::from_payload(&payload);
        assert!(record.is_registered());
        assert_eq!(record.registrar.as_deref(), Some("MarkMonitor Inc."));
        assert_eq!(record.created_date.as_deref(), Some("1997-09-15T04:00:00Z"));
        assert_eq!(record.expires_date.as_deref(), Some("2028-09-14T04:00:00Z"));
        assert_eq!(record.name_servers, vec!["ns1.google.com", "ns2.google.com"]);
        assert!(record.has_registrant);
        assert!(!record.has_admin_contact);
    }

    #[test]
    fn test_registry_data_fallback() {
        let payload = json!({
            "WhoisRecord": {
                "domainName": "thin-registry.com",
                "registryData": {
                    "registrarName": "Example Registrar, LLC",
                    "createdDate": "2015-01-01T00:00:00Z",
                    "nameServers": {"hostNames": ["ns1.example.net"]}
                }
            }
        });

        let record = WhoisRecord::from_payload(&payload);
        assert!(record.is_registered());
        assert_eq!(record.registrar.as_deref(), Some("Example Registrar, LLC"));
        assert_eq!(record.name_servers, vec!["ns1.example.net"]);
    }

    #[test]
    fn test_unregistered_payload() {
        let payload = json!({
            "WhoisRecord": {
                "domainName": "xk29fh38dksla92.com",
                "dataError": "MISSING_WHOIS_DATA",
                "registrarName": "",
                "nameServers": {"hostNames": []},
                "registrant": {},
                "registryData": {"domainName": "xk29fh38dksla92.com"}
            }
        });

        let record = WhoisRecord::from_payload(&payload);
        assert!(!record.is_registered());
        assert_eq!(record, WhoisRecord::default());
    }

    #[test]
    fn test_any_single_signal_means_registered() {
        let only_tech = WhoisRecord {
            has_tech_contact: true,
            ..Default::default()
        };
        assert!(only_tech.is_registered());

        let only_created = WhoisRecord {
            created_date: Some("2001-01-01".to_string()),
            ..Default::default()
        };
        assert!(only_created.is_registered());
    }

    #[test]
    fn test_client_creation() {
        let client = WhoisApiClient::new(
            crate::types::DEFAULT_WHOIS_ENDPOINT,
            "at_key",
            "domain-verify/test",
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_whois_client_has_its_own_identifier() {
        let client = WhoisApiClient::new(
            crate::types::DEFAULT_WHOIS_ENDPOINT,
            "at_key",
            "domain-verify/test",
        )
        .unwrap();
        assert_eq!(client.user_agent(), "domain-verify/test (whois-client)");
        assert_ne!(client.user_agent(), "domain-verify/test");
    }
}
