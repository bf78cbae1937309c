//! Test doubles and common utilities for contract tests
//!
//! Fakes for the three capability traits. They keep call logs so tests can
//! assert exactly which requests were issued.

#![allow(dead_code)]

use dnsupdate_core::error::{Error, Result};
use dnsupdate_core::traits::{
    DomainRecord, DomainRecordClient, DomainRecordEditRequest, HttpFetcher, InterfaceAddresses,
};
use dnsupdate_core::{Config, EchoService, IpResolver, RecordUpdater, UpdateCycle};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Echo services pointing at fake URLs
pub fn fake_services() -> Vec<EchoService> {
    vec![
        EchoService::new("first", "http://first.test"),
        EchoService::new("second", "http://second.test"),
        EchoService::new("third", "http://third.test"),
    ]
}

/// An HttpFetcher answering from a fixed table
///
/// URLs missing from the table fail like a refused connection.
#[derive(Default)]
pub struct FakeFetcher {
    responses: Mutex<HashMap<String, std::result::Result<String, String>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every service answers with `body`
    pub fn answering(body: &str) -> Self {
        let fetcher = Self::new();
        for service in fake_services() {
            fetcher.respond(&service.url, body);
        }
        fetcher
    }

    pub fn respond(&self, url: &str, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(body.to_string()));
    }

    pub fn fail(&self, url: &str, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(message.to_string()));
    }

    /// URLs requested, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl HttpFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.responses.lock().unwrap().get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(Error::http(message.clone())),
            None => Err(Error::http(format!("connection refused: {}", url))),
        }
    }
}

/// InterfaceAddresses backed by a fixed table
#[derive(Default)]
pub struct FakeInterfaces {
    interfaces: HashMap<String, Vec<IpAddr>>,
    enumeration_error: Option<String>,
    lookups: AtomicUsize,
}

impl FakeInterfaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, addrs: &[&str]) -> Self {
        let addrs = addrs.iter().map(|a| a.parse().unwrap()).collect();
        self.interfaces.insert(name.to_string(), addrs);
        self
    }

    /// Every lookup fails as if getifaddrs(3) returned an error
    pub fn failing(reason: &str) -> Self {
        Self {
            enumeration_error: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl InterfaceAddresses for FakeInterfaces {
    async fn addresses(&self, interface: &str) -> Result<Vec<IpAddr>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.enumeration_error {
            return Err(Error::address_enumeration(interface, reason));
        }
        self.interfaces
            .get(interface)
            .cloned()
            .ok_or_else(|| Error::interface_not_found(interface))
    }
}

/// A call made against [`FakeRecordClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordCall {
    Lookup {
        domain: String,
        record_type: String,
        fqdn: String,
        per_page: usize,
    },
    Create {
        domain: String,
        request: DomainRecordEditRequest,
    },
    Edit {
        domain: String,
        id: u64,
        request: DomainRecordEditRequest,
    },
}

/// In-memory DNS zone implementing DomainRecordClient
#[derive(Default)]
pub struct FakeRecordClient {
    zones: Mutex<HashMap<String, Vec<DomainRecord>>>,
    calls: Mutex<Vec<RecordCall>>,
    next_id: AtomicUsize,
    fail_lookup: Mutex<bool>,
    fail_create: Mutex<bool>,
    fail_edit: Mutex<bool>,
}

impl FakeRecordClient {
    pub fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(1000),
            ..Self::default()
        }
    }

    /// Seed an existing record
    pub fn with_record(self, domain: &str, id: u64, name: &str, data: &str) -> Self {
        self.zones
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .push(DomainRecord {
                id,
                record_type: "A".to_string(),
                name: name.to_string(),
                data: data.to_string(),
                ttl: Some(1800),
            });
        self
    }

    pub fn failing_lookups(self) -> Self {
        *self.fail_lookup.lock().unwrap() = true;
        self
    }

    pub fn failing_creates(self) -> Self {
        *self.fail_create.lock().unwrap() = true;
        self
    }

    pub fn failing_edits(self) -> Self {
        *self.fail_edit.lock().unwrap() = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of create and edit calls
    pub fn writes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| !matches!(c, RecordCall::Lookup { .. }))
            .count()
    }

    pub fn lookups(&self) -> usize {
        self.calls().len() - self.writes()
    }

    /// Current records in `domain`
    pub fn records(&self, domain: &str) -> Vec<DomainRecord> {
        self.zones
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DomainRecordClient for FakeRecordClient {
    async fn records_by_type_and_name(
        &self,
        domain: &str,
        record_type: &str,
        fqdn: &str,
        per_page: usize,
    ) -> Result<Vec<DomainRecord>> {
        self.calls.lock().unwrap().push(RecordCall::Lookup {
            domain: domain.to_string(),
            record_type: record_type.to_string(),
            fqdn: fqdn.to_string(),
            per_page,
        });
        if *self.fail_lookup.lock().unwrap() {
            return Err(Error::provider("fake", "lookup unavailable"));
        }

        Ok(self
            .records(domain)
            .into_iter()
            .filter(|r| r.record_type == record_type && format!("{}.{}", r.name, domain) == fqdn)
            .take(per_page)
            .collect())
    }

    async fn create_record(
        &self,
        domain: &str,
        request: &DomainRecordEditRequest,
    ) -> Result<DomainRecord> {
        self.calls.lock().unwrap().push(RecordCall::Create {
            domain: domain.to_string(),
            request: request.clone(),
        });
        if *self.fail_create.lock().unwrap() {
            return Err(Error::provider("fake", "create rejected"));
        }

        let record = DomainRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) as u64,
            record_type: request.record_type.clone(),
            name: request.name.clone(),
            data: request.data.clone(),
            ttl: Some(1800),
        };
        self.zones
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn edit_record(
        &self,
        domain: &str,
        id: u64,
        request: &DomainRecordEditRequest,
    ) -> Result<DomainRecord> {
        self.calls.lock().unwrap().push(RecordCall::Edit {
            domain: domain.to_string(),
            id,
            request: request.clone(),
        });
        if *self.fail_edit.lock().unwrap() {
            return Err(Error::provider("fake", "edit rejected"));
        }

        let mut zones = self.zones.lock().unwrap();
        let record = zones
            .get_mut(domain)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| Error::provider("fake", format!("record {} not found", id)))?;
        record.data = request.data.clone();
        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Resolver over the given fakes using [`fake_services`]
pub fn resolver(fetcher: Arc<FakeFetcher>, interfaces: Arc<FakeInterfaces>) -> IpResolver {
    IpResolver::with_services(fetcher, interfaces, fake_services())
}

/// Update cycle wired to fakes
pub fn cycle(
    config: Config,
    fetcher: Arc<FakeFetcher>,
    interfaces: Arc<FakeInterfaces>,
    client: Arc<FakeRecordClient>,
) -> UpdateCycle {
    UpdateCycle::new(
        Arc::new(config),
        resolver(fetcher, interfaces),
        RecordUpdater::new(client),
    )
}
