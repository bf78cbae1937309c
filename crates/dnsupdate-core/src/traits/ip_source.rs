// # IP Source Capabilities
//
// Two narrow interfaces the resolver is built on:
//
// - `HttpFetcher`: "given a URL, return a body or an error". Backed by
//   reqwest in `dnsupdate-ip-http`.
// - `InterfaceAddresses`: "given an interface name, return its addresses".
//   Backed by getifaddrs(3) in `dnsupdate-ip-interface`.
//
// Address *selection* (skip loopback, prefer IPv4) and echo-service fallback
// live in the core resolver, not in the implementations.
//
// ## Usage
//
// ```rust,ignore
// use dnsupdate_core::traits::HttpFetcher;
//
// let body = fetcher.fetch("http://ifconfig.me").await?;
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for plain HTTP GET implementations
///
/// # Contract
///
/// - One request per call, no retries
/// - Transport failures, read failures and non-success statuses are errors
/// - The body is returned as-is; trimming is the caller's job
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Fetch `url` and return the full response body
    async fn fetch(&self, url: &str) -> Result<String, crate::Error>;
}

/// Trait for local interface address lookups
///
/// # Errors
///
/// - [`crate::Error::AddressEnumerationFailed`] when the OS lookup fails
/// - [`crate::Error::InterfaceNotFound`] when no interface has that name
///
/// An interface that exists but has no addresses yields `Ok(vec![])`.
#[async_trait]
pub trait InterfaceAddresses: Send + Sync {
    /// Addresses bound to `interface`, in the order the OS reports them
    async fn addresses(&self, interface: &str) -> Result<Vec<IpAddr>, crate::Error>;
}
