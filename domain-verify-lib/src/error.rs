//! Error handling for domain verification.
//!
//! Probe failures inside a layer are converted into evidence and lower
//! confidence, so most of these variants never reach a caller of the
//! engine. They exist so the collaborator clients can report precisely
//! what went wrong before the layer absorbs it.

use std::fmt;
use std::time::Duration;

/// Main error type for domain verification operations.
#[derive(Debug, Clone)]
pub enum DomainVerifyError {
    /// Invalid domain name format (the only hard failure a caller sees)
    InvalidDomain { domain: String, reason: String },

    /// Network-related errors (connection refused, TLS failure, etc.)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// DNS-over-HTTPS lookup errors
    DnsError {
        domain: String,
        record: String,
        message: String,
    },

    /// HTTP probe errors
    HttpError {
        url: String,
        message: String,
        status_code: Option<u16>,
    },

    /// WHOIS API errors
    WhoisError {
        domain: String,
        message: String,
        status_code: Option<u16>,
    },

    /// JSON parsing errors for collaborator payloads
    ParseError {
        message: String,
        content: Option<String>,
    },

    /// Configuration errors (invalid settings, etc.)
    ConfigError { message: String },

    /// File I/O errors when reading configuration or domain lists
    FileError { path: String, message: String },

    /// An operation exceeded its fixed timeout
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl DomainVerifyError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new DNS lookup error.
    pub fn dns<D: Into<String>, R: Into<String>, M: Into<String>>(
        domain: D,
        record: R,
        message: M,
    ) -> Self {
        Self::DnsError {
            domain: domain.into(),
            record: record.into(),
            message: message.into(),
        }
    }

    /// Create a new HTTP probe error.
    pub fn http<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::HttpError {
            url: url.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a new HTTP probe error carrying the response status.
    pub fn http_with_status<U: Into<String>, M: Into<String>>(
        url: U,
        message: M,
        status_code: u16,
    ) -> Self {
        Self::HttpError {
            url: url.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a new WHOIS error.
    pub fn whois<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::WhoisError {
            domain: domain.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a new WHOIS error with the HTTP status the API answered with.
    pub fn whois_with_status<D: Into<String>, M: Into<String>>(
        domain: D,
        message: M,
        status_code: u16,
    ) -> Self {
        Self::WhoisError {
            domain: domain.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from a network probe (and so must be
    /// absorbed into evidence rather than surfaced).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. }
                | Self::DnsError { .. }
                | Self::HttpError { .. }
                | Self::WhoisError { .. }
                | Self::ParseError { .. }
                | Self::Timeout { .. }
        )
    }
}

impl fmt::Display for DomainVerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::DnsError {
                domain,
                record,
                message,
            } => {
                write!(f, "DNS {} lookup for '{}' failed: {}", record, domain, message)
            }
            Self::HttpError {
                url,
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "HTTP probe of '{}' (HTTP {}): {}", url, code, message)
                } else {
                    write!(f, "HTTP probe of '{}': {}", url, message)
                }
            }
            Self::WhoisError {
                domain,
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "WHOIS error for '{}' (HTTP {}): {}", domain, code, message)
                } else {
                    write!(f, "WHOIS error for '{}': {}", domain, message)
                }
            }
            Self::ParseError { message, content: _ } => {
                write!(f, "Parse error: {}", message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for DomainVerifyError {}

impl From<reqwest::Error> for DomainVerifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout("HTTP request", Duration::ZERO)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for DomainVerifyError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON parsing failed: {}", err),
            content: None,
        }
    }
}

impl From<std::io::Error> for DomainVerifyError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DomainVerifyError::invalid_domain("bad..com", "empty label");
        assert_eq!(err.to_string(), "Invalid domain 'bad..com': empty label");

        let err = DomainVerifyError::whois_with_status("example.com", "server error", 503);
        assert_eq!(
            err.to_string(),
            "WHOIS error for 'example.com' (HTTP 503): server error"
        );

        let err = DomainVerifyError::dns("example.com", "NS", "no answer");
        assert_eq!(err.to_string(), "DNS NS lookup for 'example.com' failed: no answer");
    }

    #[test]
    fn test_transient_classification() {
        assert!(DomainVerifyError::timeout("DNS A", Duration::from_millis(300)).is_transient());
        assert!(DomainVerifyError::http("https://x.com", "refused").is_transient());
        assert!(!DomainVerifyError::invalid_domain("x", "too short").is_transient());
        assert!(!DomainVerifyError::config("bad timeout").is_transient());
    }
}
