//! HTTP/HTTPS reachability probe.
//!
//! A domain "responds" when a HEAD request to either scheme comes back with
//! a status below 500. Redirects are not followed: a 301 is already proof
//! that something is serving the name.

use async_trait::async_trait;
use futures::future::select_ok;
use std::time::Duration;
use tracing::debug;

use crate::error::DomainVerifyError;

/// Issues a HEAD request and reports the response status.
#[async_trait]
pub trait HttpProber: Send + Sync {
    async fn head_status(&self, url: &str) -> Result<u16, DomainVerifyError>;
}

/// HEAD prober backed by reqwest with redirects disabled.
#[derive(Clone)]
pub struct ReqwestProber {
    http_client: reqwest::Client,
}

impl ReqwestProber {
    pub fn new(user_agent: &str) -> Result<Self, DomainVerifyError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                DomainVerifyError::network_with_source(
                    "Failed to create HTTP probe client",
                    e.to_string(),
                )
            })?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl HttpProber for ReqwestProber {
    async fn head_status(&self, url: &str) -> Result<u16, DomainVerifyError> {
        let response = self
            .http_client
            .head(url)
            .send()
            .await
            .map_err(|e| DomainVerifyError::http(url, e.to_string()))?;

        Ok(response.status().as_u16())
    }
}

/// Race HEAD probes against `https://` and `http://` and accept the first
/// success. Each probe is bounded by `timeout`; any failure or 5xx counts
/// as "no response".
pub async fn responds_to_http(
    prober: &dyn HttpProber,
    domain: &str,
    timeout: Duration,
) -> bool {
    let probe = |scheme: &'static str| {
        let url = format!("{}://{}", scheme, domain);
        Box::pin(async move {
            let outcome = tokio::time::timeout(timeout, prober.head_status(&url)).await;
            match outcome {
                Ok(Ok(status)) if status < 500 => Ok(status),
                Ok(Ok(status)) => Err(DomainVerifyError::http_with_status(
                    url,
                    "Server error",
                    status,
                )),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(DomainVerifyError::timeout(format!("HEAD {}", url), timeout)),
            }
        })
    };

    match select_ok([probe("https"), probe("http")]).await {
        Ok((status, _pending)) => {
            debug!(domain, status, "HTTP probe answered");
            true
        }
        Err(e) => {
            debug!(domain, error = %e, "HTTP probe got no usable response");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeHttp, FakeProber};

    const TIMEOUT: Duration = Duration::from_millis(700);

    #[tokio::test]
    async fn test_either_scheme_success_counts() {
        let prober = FakeProber::new().with("http", FakeHttp::Status(301));
        assert!(responds_to_http(&prober, "example.com", TIMEOUT).await);

        let prober = FakeProber::new().with("https", FakeHttp::Status(404));
        assert!(responds_to_http(&prober, "example.com", TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_server_errors_and_failures_do_not_count() {
        let prober = FakeProber::new()
            .with("https", FakeHttp::Status(503))
            .with("http", FakeHttp::Fail);
        assert!(!responds_to_http(&prober, "example.com", TIMEOUT).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_scheme_does_not_block_success() {
        let prober = FakeProber::new()
            .with("https", FakeHttp::Hang)
            .with("http", FakeHttp::Status(200));
        assert!(responds_to_http(&prober, "example.com", TIMEOUT).await);

        let prober = FakeProber::new()
            .with("https", FakeHttp::Hang)
            .with("http", FakeHttp::Hang);
        assert!(!responds_to_http(&prober, "example.com", TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_both_schemes_are_probed() {
        let prober = FakeProber::new();
        responds_to_http(&prober, "acme.io", TIMEOUT).await;
        let mut urls = prober.requested();
        urls.sort();
        assert_eq!(urls, vec!["http://acme.io", "https://acme.io"]);
    }
}
