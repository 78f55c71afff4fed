//! Static catalog of well-known registered domains and TLD pricing.
//!
//! The catalog is built once and shared read-only (behind an `Arc`) by every
//! verification session. Nothing mutates it after construction.

use std::collections::HashMap;

use crate::types::Pricing;
use crate::utils::extract_tld;

/// A domain known to be registered, optionally with its registrar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownDomain {
    pub domain: String,
    pub registrar: Option<String>,
}

/// Built-in known-taken domains with the registrar that manages them.
const BUILTIN_KNOWN_DOMAINS: &[(&str, Option<&str>)] = &[
    ("google.com", Some("MarkMonitor Inc.")),
    ("youtube.com", Some("MarkMonitor Inc.")),
    ("gmail.com", Some("MarkMonitor Inc.")),
    ("facebook.com", Some("RegistrarSafe, LLC")),
    ("instagram.com", Some("RegistrarSafe, LLC")),
    ("whatsapp.com", Some("RegistrarSafe, LLC")),
    ("amazon.com", Some("MarkMonitor Inc.")),
    ("apple.com", Some("CSC Corporate Domains, Inc.")),
    ("microsoft.com", Some("MarkMonitor Inc.")),
    ("github.com", Some("MarkMonitor Inc.")),
    ("twitter.com", Some("CSC Corporate Domains, Inc.")),
    ("x.com", Some("MarkMonitor Inc.")),
    ("linkedin.com", Some("MarkMonitor Inc.")),
    ("netflix.com", Some("MarkMonitor Inc.")),
    ("wikipedia.org", Some("MarkMonitor Inc.")),
    ("reddit.com", Some("MarkMonitor Inc.")),
    ("yahoo.com", Some("MarkMonitor Inc.")),
    ("bing.com", Some("MarkMonitor Inc.")),
    ("openai.com", Some("MarkMonitor Inc.")),
    ("stripe.com", Some("SafeNames Ltd.")),
    ("shopify.com", Some("MarkMonitor Inc.")),
    ("example.com", Some("RESERVED-Internet Assigned Numbers Authority")),
    ("example.org", Some("RESERVED-Internet Assigned Numbers Authority")),
    ("example.net", Some("RESERVED-Internet Assigned Numbers Authority")),
    ("test.com", None),
    ("domain.com", None),
];

/// Built-in TLD pricing: (tld, first-year registration, renewal), USD.
const BUILTIN_PRICING: &[(&str, f64, f64)] = &[
    ("com", 12.99, 14.99),
    ("net", 13.99, 15.99),
    ("org", 11.99, 14.99),
    ("io", 39.99, 49.99),
    ("ai", 69.99, 79.99),
    ("co", 24.99, 29.99),
    ("app", 14.99, 16.99),
    ("dev", 12.99, 14.99),
    ("xyz", 1.99, 12.99),
    ("tech", 4.99, 44.99),
    ("me", 5.99, 19.99),
    ("info", 3.99, 21.99),
    ("biz", 6.99, 19.99),
    ("us", 7.99, 12.99),
    ("uk", 6.99, 9.99),
    ("de", 7.99, 9.99),
    ("shop", 2.99, 34.99),
    ("online", 2.99, 34.99),
    ("site", 2.99, 29.99),
    ("store", 4.99, 49.99),
    ("cloud", 9.99, 22.99),
];

/// Price applied to any TLD missing from the table.
const DEFAULT_PRICE: (f64, f64) = (19.99, 24.99);

const CURRENCY: &str = "USD";

/// Immutable set of known-registered domains plus the TLD pricing table.
#[derive(Debug, Clone)]
pub struct DomainCatalog {
    known: HashMap<String, KnownDomain>,
    pricing: HashMap<String, (f64, f64)>,
}

impl DomainCatalog {
    /// Build a catalog from explicit entries.
    ///
    /// Domain and TLD keys are lower-cased so lookups are case-insensitive.
    pub fn new<K, P>(known: K, pricing: P) -> Self
    where
        K: IntoIterator<Item = KnownDomain>,
        P: IntoIterator<Item = (String, f64, f64)>,
    {
        let known = known
            .into_iter()
            .map(|entry| {
                let key = entry.domain.trim().to_lowercase();
                (
                    key.clone(),
                    KnownDomain {
                        domain: key,
                        registrar: entry.registrar,
                    },
                )
            })
            .collect();

        let pricing = pricing
            .into_iter()
            .map(|(tld, registration, renewal)| {
                (
                    tld.trim().trim_start_matches('.').to_lowercase(),
                    (registration, renewal),
                )
            })
            .collect();

        Self { known, pricing }
    }

    /// The catalog shipped with the library.
    pub fn builtin() -> Self {
        Self::builtin_with_extra_known(std::iter::empty::<String>())
    }

    /// The built-in catalog extended with extra known-taken domains
    /// (e.g. from a configuration file). Extra entries carry no registrar.
    pub fn builtin_with_extra_known<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let builtin = BUILTIN_KNOWN_DOMAINS
            .iter()
            .map(|(domain, registrar)| KnownDomain {
                domain: domain.to_string(),
                registrar: registrar.map(String::from),
            });

        let extra: Vec<KnownDomain> = extra
            .into_iter()
            .map(|d| d.as_ref().trim().to_string())
            .filter(|d| !d.is_empty())
            .map(|domain| KnownDomain {
                domain,
                registrar: None,
            })
            .collect();

        let pricing = BUILTIN_PRICING
            .iter()
            .map(|(tld, registration, renewal)| (tld.to_string(), *registration, *renewal));

        // Built-ins go last so their registrar wins over a bare extra entry.
        Self::new(extra.into_iter().chain(builtin), pricing)
    }

    /// Look a domain up in the known-taken set (case-insensitive).
    pub fn known_registration(&self, domain: &str) -> Option<&KnownDomain> {
        self.known.get(&domain.trim().to_lowercase())
    }

    /// Whether the domain is in the known-taken set.
    pub fn is_known_taken(&self, domain: &str) -> bool {
        self.known_registration(domain).is_some()
    }

    /// Price row for the domain's TLD. Unknown TLDs get the default row.
    pub fn pricing_for(&self, domain: &str) -> Pricing {
        let tld = extract_tld(domain);
        let (registration, renewal) = self.pricing.get(&tld).copied().unwrap_or(DEFAULT_PRICE);

        Pricing {
            tld,
            registration,
            renewal,
            currency: CURRENCY.to_string(),
        }
    }

    /// Number of known-taken domains in the catalog.
    pub fn known_count(&self) -> usize {
        self.known.len()
    }
}

impl Default for DomainCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_lookup_is_case_insensitive() {
        let catalog = DomainCatalog::builtin();
        assert!(catalog.is_known_taken("google.com"));
        assert!(catalog.is_known_taken("GOOGLE.com"));
        assert!(!catalog.is_known_taken("google.dev"));

        let known = catalog.known_registration("Google.COM").unwrap();
        assert_eq!(known.registrar.as_deref(), Some("MarkMonitor Inc."));
    }

    #[test]
    fn test_pricing_known_and_default() {
        let catalog = DomainCatalog::builtin();

        let com = catalog.pricing_for("startup.com");
        assert_eq!(com.tld, "com");
        assert_eq!(com.registration, 12.99);
        assert_eq!(com.currency, "USD");

        let unknown = catalog.pricing_for("startup.museum");
        assert_eq!(unknown.tld, "museum");
        assert_eq!(unknown.registration, DEFAULT_PRICE.0);
        assert_eq!(unknown.renewal, DEFAULT_PRICE.1);
    }

    #[test]
    fn test_extra_known_domains() {
        let catalog = DomainCatalog::builtin_with_extra_known(["MyBrand.io", "  ", "google.com"]);
        assert!(catalog.is_known_taken("mybrand.io"));
        assert_eq!(catalog.known_count(), BUILTIN_KNOWN_DOMAINS.len() + 1);
        // built-in registrar is not clobbered by a bare extra entry
        assert_eq!(
            catalog
                .known_registration("google.com")
                .and_then(|k| k.registrar.as_deref()),
            Some("MarkMonitor Inc.")
        );
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = DomainCatalog::new(
            vec![KnownDomain {
                domain: "Acme.test".to_string(),
                registrar: None,
            }],
            vec![(".TEST".to_string(), 1.0, 2.0)],
        );
        assert!(catalog.is_known_taken("acme.test"));
        assert_eq!(catalog.pricing_for("acme.test").registration, 1.0);
    }
}
