// # DNS Provider Capability
//
// Defines the record operations the updater needs from a DNS provider:
// list-by-type-and-name, create and edit.
//
// ## Implementations
//
// - DigitalOcean: `dnsupdate-provider-digitalocean` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsupdate_core::traits::{DomainRecordClient, A_RECORD};
//
// let records = client
//     .records_by_type_and_name("example.com", A_RECORD, "web.example.com", 1)
//     .await?;
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Record type maintained by dnsupdate
pub const A_RECORD: &str = "A";

/// A DNS record as stored by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Provider-assigned record id
    pub id: u64,
    /// Record type (always "A" for records this crate touches)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Host part of the name (e.g. "web" for web.example.com)
    pub name: String,
    /// Record value, the IP address for A records
    pub data: String,
    /// Time-to-live in seconds
    #[serde(default)]
    pub ttl: Option<u32>,
}

/// Body of a create or edit request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecordEditRequest {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub data: String,
}

impl DomainRecordEditRequest {
    /// An A record pointing `name` at `address`
    pub fn a_record(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            record_type: A_RECORD.to_string(),
            name: name.into(),
            data: address.into(),
        }
    }
}

/// Trait for DNS provider clients
///
/// # Trust Level: Untrusted
///
/// Implementations only translate calls into API requests:
/// - One HTTP request per call
/// - No retries, no caching between calls
/// - Never decide whether a write is needed (owned by `RecordUpdater`)
/// - Never log the API token
#[async_trait]
pub trait DomainRecordClient: Send + Sync {
    /// List records of `record_type` whose fully-qualified name is `fqdn`
    ///
    /// Returns at most `per_page` records from the first page.
    async fn records_by_type_and_name(
        &self,
        domain: &str,
        record_type: &str,
        fqdn: &str,
        per_page: usize,
    ) -> Result<Vec<DomainRecord>, crate::Error>;

    /// Create a record in `domain`
    async fn create_record(
        &self,
        domain: &str,
        request: &DomainRecordEditRequest,
    ) -> Result<DomainRecord, crate::Error>;

    /// Replace record `id` in `domain`
    async fn edit_record(
        &self,
        domain: &str,
        id: u64,
        request: &DomainRecordEditRequest,
    ) -> Result<DomainRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
