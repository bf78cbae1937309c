//! Record create-or-edit logic
//!
//! ```text
//! lookup A <host>.<domain> (page size 1)
//!   ├─ error        → LookupFailed
//!   ├─ no records   → create  → Created  | CreateFailed
//!   └─ first record
//!        ├─ same data  → Unchanged (no write)
//!        └─ different  → edit    → Updated | UpdateFailed
//! ```
//!
//! Only the first matching record is ever consulted. Duplicate A records for
//! the same name are neither detected nor cleaned up.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::traits::{A_RECORD, DomainRecordClient, DomainRecordEditRequest};

/// Records requested per lookup
const LOOKUP_PAGE_SIZE: usize = 1;

/// Result of a successful update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Record didn't exist and was created
    Created { id: u64 },
    /// Record existed with a different address and was edited
    Updated { id: u64, previous: String },
    /// Record already had the address (no write issued)
    Unchanged { id: u64 },
}

impl UpdateOutcome {
    /// Whether a write was issued against the provider
    pub fn wrote(&self) -> bool {
        !matches!(self, UpdateOutcome::Unchanged { .. })
    }
}

/// Keeps one A record in sync with a resolved address
#[derive(Clone)]
pub struct RecordUpdater {
    client: Arc<dyn DomainRecordClient>,
}

impl RecordUpdater {
    pub fn new(client: Arc<dyn DomainRecordClient>) -> Self {
        Self { client }
    }

    /// Point `<name>.<domain>` at `addr`, creating the record if needed
    ///
    /// Issues at most one write, and none when the record already matches.
    pub async fn update_record(&self, domain: &str, name: &str, addr: &str) -> Result<UpdateOutcome> {
        let fqdn = format!("{}.{}", name, domain);

        let records = self
            .client
            .records_by_type_and_name(domain, A_RECORD, &fqdn, LOOKUP_PAGE_SIZE)
            .await
            .map_err(|e| Error::lookup_failed(&fqdn, e))?;

        let request = DomainRecordEditRequest::a_record(name, addr);

        let Some(record) = records.into_iter().next() else {
            info!("host {} not found, will create new record", fqdn);
            let created = self
                .client
                .create_record(domain, &request)
                .await
                .map_err(|e| Error::create_failed(&fqdn, e))?;
            info!("created record {} for {} with {}", created.id, fqdn, addr);
            return Ok(UpdateOutcome::Created { id: created.id });
        };

        debug!("existing record {} found for {}", record.id, fqdn);
        if record.data == addr {
            info!("address {} for {} unchanged, skipping update", addr, fqdn);
            return Ok(UpdateOutcome::Unchanged { id: record.id });
        }

        self.client
            .edit_record(domain, record.id, &request)
            .await
            .map_err(|e| Error::update_failed(&fqdn, e))?;
        info!(
            "updated record {} for {} from {} to {}",
            record.id, fqdn, record.data, addr
        );

        Ok(UpdateOutcome::Updated {
            id: record.id,
            previous: record.data,
        })
    }
}
