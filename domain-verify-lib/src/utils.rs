//! Utility functions for domain processing and validation.
//!
//! Validation is a caller-side precondition: the layers assume they are
//! handed a syntactically valid, lower-cased domain.

use crate::error::DomainVerifyError;

/// Maximum length of a full domain name.
const MAX_DOMAIN_LEN: usize = 253;

/// Maximum length of a single label.
const MAX_LABEL_LEN: usize = 63;

/// Validate a domain name and return its normalized (trimmed, lower-cased)
/// form.
///
/// # Errors
///
/// Returns `DomainVerifyError::InvalidDomain` if the name is empty, too
/// long, has no TLD, or contains a malformed label.
pub fn validate_domain(domain: &str) -> Result<String, DomainVerifyError> {
    let normalized = domain.trim().trim_end_matches('.').to_lowercase();

    if normalized.is_empty() {
        return Err(DomainVerifyError::invalid_domain(
            domain,
            "Domain name cannot be empty",
        ));
    }

    if normalized.len() > MAX_DOMAIN_LEN {
        return Err(DomainVerifyError::invalid_domain(
            domain,
            format!("Domain name exceeds {} characters", MAX_DOMAIN_LEN),
        ));
    }

    if !normalized.contains('.') {
        return Err(DomainVerifyError::invalid_domain(
            domain,
            "Domain name must include a TLD (e.g. example.com)",
        ));
    }

    for label in normalized.split('.') {
        if label.is_empty() {
            return Err(DomainVerifyError::invalid_domain(domain, "Empty label"));
        }

        if label.len() > MAX_LABEL_LEN {
            return Err(DomainVerifyError::invalid_domain(
                domain,
                format!("Label '{}' exceeds {} characters", label, MAX_LABEL_LEN),
            ));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(DomainVerifyError::invalid_domain(
                domain,
                format!("Label '{}' cannot start or end with a hyphen", label),
            ));
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(DomainVerifyError::invalid_domain(
                domain,
                format!("Label '{}' contains invalid characters", label),
            ));
        }
    }

    // TLDs are never all-numeric
    if extract_tld(&normalized).chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainVerifyError::invalid_domain(domain, "TLD cannot be numeric"));
    }

    Ok(normalized)
}

/// The root label of a domain: everything before the first dot.
///
/// `"my-brand.co.uk"` -> `"my-brand"`.
pub fn root_label(domain: &str) -> &str {
    domain.split('.').next().unwrap_or(domain)
}

/// The TLD of a domain (last label), lower-cased.
pub fn extract_tld(domain: &str) -> String {
    domain
        .trim()
        .trim_end_matches('.')
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Parse domains from a newline-separated list.
///
/// Empty lines and lines starting with `#` are skipped; trailing inline
/// comments are stripped.
pub fn parse_domain_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
