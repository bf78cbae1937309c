//! Capability traits for dnsupdate
//!
//! The core never touches the network or the OS directly. It calls into
//! these narrow interfaces, implemented by the sibling crates and by fakes
//! in tests.
//!
//! - [`HttpFetcher`]: fetch a URL body (public IP echo services)
//! - [`InterfaceAddresses`]: addresses bound to a local interface
//! - [`DomainRecordClient`]: DNS provider record lookup, create and edit

pub mod dns_provider;
pub mod ip_source;

pub use dns_provider::{DomainRecord, DomainRecordClient, DomainRecordEditRequest, A_RECORD};
pub use ip_source::{HttpFetcher, InterfaceAddresses};
