// # HTTP Fetcher
//
// This crate provides the reqwest-backed `HttpFetcher` the resolver uses to
// query public IP echo services (ifconfig.co, ipinfo.io/ip, ifconfig.me).
//
// ## Behavior
//
// - One GET per call, no retries (the next scheduled cycle is the retry)
// - Every request carries a timeout so a stuck service cannot stall a cycle
// - Non-success statuses are errors, so an error page is never mistaken for
//   an address

use dnsupdate_core::traits::HttpFetcher;
use dnsupdate_core::{Error, Result};

use std::time::Duration;

/// Default timeout for echo requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-based [`HttpFetcher`]
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher with [`DEFAULT_TIMEOUT`]
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a fetcher with a custom per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dnsupdate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "{} answered with status {}",
                url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))
    }
}
