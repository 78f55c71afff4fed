//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and environment
//! variables, and merging them with proper precedence rules:
//! built-in defaults < config files < environment < explicit CLI flags.

use crate::catalog::DomainCatalog;
use crate::error::DomainVerifyError;
use crate::types::VerifyConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [verification]
/// whois_api_key = "..."
/// concurrency = 20
/// whois_timeout = "10s"
///
/// [catalog]
/// known_taken = ["mycompany.com"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Engine settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationConfig>,

    /// Catalog extensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogConfig>,
}

/// `[verification]` table. Every key is optional and overrides the default.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerificationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doh_endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_api_key: Option<String>,

    /// Concurrent sessions, 1-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Timeouts as strings, e.g. "300ms", "15s", "2m"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instant_dns_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_timeout: Option<String>,
}

/// `[catalog]` table.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// Extra domains treated as known registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_taken: Option<Vec<String>>,
}

impl FileConfig {
    /// Overlay this file's settings onto `config`.
    ///
    /// Timeouts are re-validated here so a hand-built `FileConfig` cannot
    /// smuggle in an unparseable value.
    pub fn apply_to(&self, mut config: VerifyConfig) -> Result<VerifyConfig, DomainVerifyError> {
        let Some(v) = &self.verification else {
            return Ok(config);
        };

        if let Some(endpoint) = &v.doh_endpoint {
            config = config.with_doh_endpoint(endpoint.clone());
        }
        if let Some(endpoint) = &v.whois_endpoint {
            config = config.with_whois_endpoint(endpoint.clone());
        }
        if let Some(key) = &v.whois_api_key {
            config = config.with_whois_api_key(key.clone());
        }
        if let Some(concurrency) = v.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(t) = &v.instant_dns_timeout {
            config = config.with_instant_dns_timeout(require_duration("instant_dns_timeout", t)?);
        }
        if let Some(t) = &v.record_timeout {
            config = config.with_record_timeout(require_duration("record_timeout", t)?);
        }
        if let Some(t) = &v.http_timeout {
            config = config.with_http_timeout(require_duration("http_timeout", t)?);
        }
        if let Some(t) = &v.whois_timeout {
            config = config.with_whois_timeout(require_duration("whois_timeout", t)?);
        }

        Ok(config)
    }

    /// Extra known-taken domains from `[catalog]`.
    pub fn known_taken(&self) -> Vec<String> {
        self.catalog
            .as_ref()
            .and_then(|c| c.known_taken.clone())
            .unwrap_or_default()
    }

    /// Built-in catalog extended with this file's known-taken domains.
    pub fn build_catalog(&self) -> DomainCatalog {
        let extra = self.known_taken();
        if extra.is_empty() {
            DomainCatalog::builtin()
        } else {
            DomainCatalog::builtin_with_extra_known(extra)
        }
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to warn when several config files shadow each other
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// `FileError` if the file is missing or unreadable, `ConfigError` if it
    /// is not valid TOML or fails validation.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainVerifyError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainVerifyError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainVerifyError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            DomainVerifyError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;
        debug!(path = %path.display(), "loaded configuration file");

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is lowest, then `$HOME`, then the current directory.
    /// Files that fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainVerifyError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring config file"),
            }
        }

        if self.verbose && loaded_files.len() > 1 {
            let files: Vec<String> = loaded_files
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            warn!(
                files = ?files,
                "multiple config files found, later files take precedence"
            );
        }

        Ok(merged_config)
    }

    /// Looks for configuration files in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./domain-verify.toml", "./.domain-verify.toml"];

        candidates
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Looks for configuration files in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let path = Path::new(&home).join(".domain-verify.toml");
        path.exists().then_some(path)
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-verify").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`;
    /// known-taken lists are combined.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            verification: match (lower.verification, higher.verification) {
                (Some(lower_v), Some(higher_v)) => Some(VerificationConfig {
                    doh_endpoint: higher_v.doh_endpoint.or(lower_v.doh_endpoint),
                    whois_endpoint: higher_v.whois_endpoint.or(lower_v.whois_endpoint),
                    whois_api_key: higher_v.whois_api_key.or(lower_v.whois_api_key),
                    concurrency: higher_v.concurrency.or(lower_v.concurrency),
                    instant_dns_timeout: higher_v
                        .instant_dns_timeout
                        .or(lower_v.instant_dns_timeout),
                    record_timeout: higher_v.record_timeout.or(lower_v.record_timeout),
                    http_timeout: higher_v.http_timeout.or(lower_v.http_timeout),
                    whois_timeout: higher_v.whois_timeout.or(lower_v.whois_timeout),
                }),
                (lower_v, higher_v) => higher_v.or(lower_v),
            },
            catalog: match (lower.catalog, higher.catalog) {
                (Some(lower_c), Some(higher_c)) => {
                    let mut known = lower_c.known_taken.unwrap_or_default();
                    for domain in higher_c.known_taken.unwrap_or_default() {
                        if !known.contains(&domain) {
                            known.push(domain);
                        }
                    }
                    Some(CatalogConfig {
                        known_taken: Some(known),
                    })
                }
                (lower_c, higher_c) => higher_c.or(lower_c),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainVerifyError> {
        if let Some(v) = &config.verification {
            if let Some(concurrency) = v.concurrency {
                if concurrency == 0 || concurrency > 100 {
                    return Err(DomainVerifyError::config(
                        "Concurrency must be between 1 and 100",
                    ));
                }
            }

            let timeouts = [
                ("instant_dns_timeout", &v.instant_dns_timeout),
                ("record_timeout", &v.record_timeout),
                ("http_timeout", &v.http_timeout),
                ("whois_timeout", &v.whois_timeout),
            ];
            for (name, value) in timeouts {
                if let Some(value) = value {
                    require_duration(name, value)?;
                }
            }

            for (name, value) in [
                ("doh_endpoint", &v.doh_endpoint),
                ("whois_endpoint", &v.whois_endpoint),
            ] {
                if let Some(url) = value {
                    if !url.starts_with("https://") && !url.starts_with("http://") {
                        return Err(DomainVerifyError::config(format!(
                            "Invalid {} '{}': must be an http(s) URL",
                            name, url
                        )));
                    }
                }
            }
        }

        if let Some(known) = config.catalog.as_ref().and_then(|c| c.known_taken.as_ref()) {
            for domain in known {
                crate::utils::validate_domain(domain).map_err(|e| {
                    DomainVerifyError::config(format!("Invalid known_taken entry: {}", e))
                })?;
            }
        }

        Ok(())
    }
}

/// Environment variable configuration.
///
/// Values set via `DV_*` environment variables; they override config files
/// but not explicit CLI flags.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub whois_api_key: Option<String>,
    pub doh_endpoint: Option<String>,
    pub whois_endpoint: Option<String>,
    pub concurrency: Option<usize>,
    /// Explicit config file path
    pub config: Option<String>,
}

impl EnvConfig {
    /// Overlay the environment's settings onto `config`.
    pub fn apply_to(&self, mut config: VerifyConfig) -> VerifyConfig {
        if let Some(key) = &self.whois_api_key {
            config = config.with_whois_api_key(key.clone());
        }
        if let Some(endpoint) = &self.doh_endpoint {
            config = config.with_doh_endpoint(endpoint.clone());
        }
        if let Some(endpoint) = &self.whois_endpoint {
            config = config.with_whois_endpoint(endpoint.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        config
    }
}

/// Load configuration from environment variables.
///
/// Reads `DV_WHOIS_API_KEY`, `DV_DOH_ENDPOINT`, `DV_WHOIS_ENDPOINT`,
/// `DV_CONCURRENCY` and `DV_CONFIG`. Invalid values are logged and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

fn env_config_from<F>(get: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| {
        get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let mut env_config = EnvConfig::default();

    if let Some(key) = non_empty("DV_WHOIS_API_KEY") {
        debug!("using DV_WHOIS_API_KEY");
        env_config.whois_api_key = Some(key);
    }

    if let Some(endpoint) = non_empty("DV_DOH_ENDPOINT") {
        debug!(endpoint = %endpoint, "using DV_DOH_ENDPOINT");
        env_config.doh_endpoint = Some(endpoint);
    }

    if let Some(endpoint) = non_empty("DV_WHOIS_ENDPOINT") {
        debug!(endpoint = %endpoint, "using DV_WHOIS_ENDPOINT");
        env_config.whois_endpoint = Some(endpoint);
    }

    if let Some(val) = non_empty("DV_CONCURRENCY") {
        match val.parse::<usize>() {
            Ok(concurrency) if (1..=100).contains(&concurrency) => {
                debug!(concurrency, "using DV_CONCURRENCY");
                env_config.concurrency = Some(concurrency);
            }
            _ => warn!(value = %val, "invalid DV_CONCURRENCY, must be 1-100"),
        }
    }

    if let Some(path) = non_empty("DV_CONFIG") {
        debug!(path = %path, "using DV_CONFIG");
        env_config.config = Some(path);
    }

    env_config
}

/// Parse a duration string like "300ms", "15s" or "2m". A bare number is
/// taken as seconds. Zero is rejected.
pub fn parse_duration_string(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();

    let duration = if let Some(ms) = value.strip_suffix("ms") {
        Duration::from_millis(ms.trim().parse().ok()?)
    } else if let Some(s) = value.strip_suffix('s') {
        Duration::from_secs(s.trim().parse().ok()?)
    } else if let Some(m) = value.strip_suffix('m') {
        Duration::from_secs(m.trim().parse::<u64>().ok()?.checked_mul(60)?)
    } else {
        Duration::from_secs(value.parse().ok()?)
    };

    (!duration.is_zero()).then_some(duration)
}

fn require_duration(name: &str, value: &str) -> Result<Duration, DomainVerifyError> {
    parse_duration_string(value).ok_or_else(|| {
        DomainVerifyError::config(format!(
            "Invalid {} '{}'. Use a format like '300ms', '15s', '2m'",
            name, value
        ))
    })
}
