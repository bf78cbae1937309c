// # DigitalOcean DNS Provider
//
// This crate provides the `DomainRecordClient` implementation for the
// DigitalOcean API v2.
//
// ## Architectural Constraints
//
// ### Trust Level: Untrusted (DNS Provider)
//
// - ✅ One HTTP request per call, to the DigitalOcean API only
// - ✅ Full error propagation (the update cycle logs and moves on)
// - ✅ HTTP timeout configured
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry logic, NO caching, NO background tasks
// - ❌ NO create-vs-edit decisions (owned by `RecordUpdater`)
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Construction fails if the token is empty
//
// ## API Reference
//
// - List records: GET `/v2/domains/:domain/records?type=A&name=:fqdn`
// - Create record: POST `/v2/domains/:domain/records`
// - Update record: PUT `/v2/domains/:domain/records/:id`

use async_trait::async_trait;
use dnsupdate_core::traits::{DomainRecord, DomainRecordClient, DomainRecordEditRequest};
use dnsupdate_core::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// DigitalOcean API base URL
const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com/v2";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER: &str = "digitalocean";

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    domain_records: Vec<DomainRecord>,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    domain_record: DomainRecord,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Deserialize)]
struct ApiError {
    id: String,
    message: String,
}

/// DigitalOcean domain record client
///
/// # Dry-Run Mode
///
/// When `dry_run` is true the client still performs lookups, but create and
/// edit calls only log the request they would have sent.
pub struct DigitalOceanClient {
    /// DigitalOcean API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DigitalOceanClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitalOceanClient")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl DigitalOceanClient {
    /// Create a client with its own HTTP client and request timeout
    pub fn new(api_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dnsupdate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_client(api_token, client)
    }

    /// Create a client around an existing HTTP client
    pub fn with_client(api_token: impl Into<String>, client: reqwest::Client) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("DigitalOcean API token cannot be empty"));
        }

        Ok(Self {
            api_token,
            base_url: DIGITALOCEAN_API_BASE.to_string(),
            client,
            dry_run: false,
        })
    }

    /// Point the client at another API root (e.g. a local test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn records_url(&self, domain: &str) -> String {
        format!("{}/domains/{}/records", self.base_url, domain)
    }

    /// Send a request and turn non-success statuses into errors
    async fn send(&self, request: reqwest::RequestBuilder, action: &str) -> Result<reqwest::Response> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        Err(status_error(status, &body, action))
    }
}

/// Map a failed API response to an error
fn status_error(status: reqwest::StatusCode, body: &str, action: &str) -> Error {
    let detail = serde_json::from_str::<ApiError>(body)
        .map(|e| format!("{} ({})", e.message, e.id))
        .unwrap_or_else(|_| body.trim().to_string());

    let message = match status.as_u16() {
        401 | 403 => format!(
            "Authentication failed: Invalid API token or insufficient permissions. Status: {} - {}",
            status, detail
        ),
        404 => format!("{}: not found. Status: {} - {}", action, status, detail),
        429 => format!(
            "Rate limit exceeded. Please retry later. Status: {} - {}",
            status, detail
        ),
        500..=599 => format!(
            "DigitalOcean server error (transient): {} - {}",
            status, detail
        ),
        _ => format!("{} failed: {} - {}", action, status, detail),
    };
    Error::provider(PROVIDER, message)
}

#[async_trait]
impl DomainRecordClient for DigitalOceanClient {
    /// # API Call
    ///
    /// ```http
    /// GET /v2/domains/example.com/records?type=A&name=web.example.com&page=1&per_page=1
    /// Authorization: Bearer <token>
    /// ```
    async fn records_by_type_and_name(
        &self,
        domain: &str,
        record_type: &str,
        fqdn: &str,
        per_page: usize,
    ) -> Result<Vec<DomainRecord>> {
        tracing::debug!("Looking up {} records for {}", record_type, fqdn);

        let per_page = per_page.to_string();
        let request = self.client.get(self.records_url(domain)).query(&[
            ("type", record_type),
            ("name", fqdn),
            ("page", "1"),
            ("per_page", per_page.as_str()),
        ]);

        let response = self.send(request, "Record lookup").await?;
        let body: RecordsResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to parse response: {}", e)))?;

        tracing::debug!("Found {} record(s) for {}", body.domain_records.len(), fqdn);
        Ok(body.domain_records)
    }

    /// # API Call
    ///
    /// ```http
    /// POST /v2/domains/example.com/records
    /// { "type": "A", "name": "web", "data": "203.0.113.5" }
    /// ```
    async fn create_record(
        &self,
        domain: &str,
        request: &DomainRecordEditRequest,
    ) -> Result<DomainRecord> {
        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST to {} with payload: {}",
                self.records_url(domain),
                serde_json::to_string(request)?
            );
            return Ok(DomainRecord {
                id: 0,
                record_type: request.record_type.clone(),
                name: request.name.clone(),
                data: request.data.clone(),
                ttl: None,
            });
        }

        let http_request = self.client.post(self.records_url(domain)).json(request);
        let response = self.send(http_request, "Record create").await?;
        let body: RecordResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to parse response: {}", e)))?;

        Ok(body.domain_record)
    }

    /// # API Call
    ///
    /// ```http
    /// PUT /v2/domains/example.com/records/3352896
    /// { "type": "A", "name": "web", "data": "203.0.113.5" }
    /// ```
    async fn edit_record(
        &self,
        domain: &str,
        id: u64,
        request: &DomainRecordEditRequest,
    ) -> Result<DomainRecord> {
        let url = format!("{}/{}", self.records_url(domain), id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT to {} with payload: {}",
                url,
                serde_json::to_string(request)?
            );
            return Ok(DomainRecord {
                id,
                record_type: request.record_type.clone(),
                name: request.name.clone(),
                data: request.data.clone(),
                ttl: None,
            });
        }

        let http_request = self.client.put(url).json(request);
        let response = self.send(http_request, "Record update").await?;
        let body: RecordResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to parse response: {}", e)))?;

        Ok(body.domain_record)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
