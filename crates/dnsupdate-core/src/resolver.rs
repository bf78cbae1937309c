//! Address resolution
//!
//! Turns a [`HostEntry`] into the dotted IPv4 string to publish:
//!
//! - interface configured: first non-loopback, IPv4-expressible address bound
//!   to that interface
//! - otherwise: first non-empty answer from the echo services, tried in order
//!
//! Nothing is cached; every cycle resolves from scratch.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::HostEntry;
use crate::error::{Error, Result};
use crate::traits::{HttpFetcher, InterfaceAddresses};

/// A public endpoint that answers with the caller's address as plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoService {
    /// Short name for logs
    pub name: String,
    /// URL to GET
    pub url: String,
}

impl EchoService {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Echo services in preference order
pub fn default_echo_services() -> Vec<EchoService> {
    vec![
        EchoService::new("ifconfig.co", "http://ifconfig.co"),
        EchoService::new("ipinfo.io/ip", "http://ipinfo.io/ip"),
        EchoService::new("ifconfig.me", "http://ifconfig.me"),
    ]
}

/// Resolves the current address of a host
#[derive(Clone)]
pub struct IpResolver {
    fetcher: Arc<dyn HttpFetcher>,
    interfaces: Arc<dyn InterfaceAddresses>,
    services: Vec<EchoService>,
}

impl IpResolver {
    /// Create a resolver using [`default_echo_services`]
    pub fn new(fetcher: Arc<dyn HttpFetcher>, interfaces: Arc<dyn InterfaceAddresses>) -> Self {
        Self::with_services(fetcher, interfaces, default_echo_services())
    }

    /// Create a resolver with an explicit echo service list
    pub fn with_services(
        fetcher: Arc<dyn HttpFetcher>,
        interfaces: Arc<dyn InterfaceAddresses>,
        services: Vec<EchoService>,
    ) -> Self {
        Self {
            fetcher,
            interfaces,
            services,
        }
    }

    /// Echo services this resolver falls back across
    pub fn services(&self) -> &[EchoService] {
        &self.services
    }

    /// Resolve the address for `host`
    pub async fn resolve(&self, host: &HostEntry) -> Result<String> {
        match host.interface() {
            Some(interface) => {
                info!("checking private ip for interface {}", interface);
                self.resolve_interface(interface).await
            }
            None => {
                info!("checking public ip for current host");
                self.resolve_public().await
            }
        }
    }

    /// Address bound to a local interface
    pub async fn resolve_interface(&self, interface: &str) -> Result<String> {
        let addrs = self.interfaces.addresses(interface).await?;
        debug!("interface {} has {} address(es)", interface, addrs.len());

        select_address(&addrs)
            .map(|ip| ip.to_string())
            .ok_or_else(|| Error::NoSuitableAddress {
                interface: interface.to_string(),
            })
    }

    /// Address reported by the first echo service that answers
    pub async fn resolve_public(&self) -> Result<String> {
        for service in &self.services {
            info!("resolving public ip with {}", service.name);

            match self.fetcher.fetch(&service.url).await {
                Ok(body) => {
                    let ip = body.trim();
                    if ip.is_empty() {
                        warn!("empty response from {}", service.name);
                        continue;
                    }
                    if ip.parse::<Ipv4Addr>().is_err() {
                        warn!("{} answered with a non-IPv4 value: {:?}", service.name, ip);
                    }
                    return Ok(ip.to_string());
                }
                Err(e) => {
                    warn!("failed to resolve public ip with {}: {}", service.name, e);
                }
            }
        }

        Err(Error::PublicIpUnresolvable)
    }
}

/// First address that is not loopback and can be written as IPv4
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) count as IPv4.
pub fn select_address(addrs: &[IpAddr]) -> Option<Ipv4Addr> {
    addrs.iter().find_map(|addr| {
        if addr.is_loopback() {
            return None;
        }
        match addr {
            IpAddr::V4(v4) => Some(*v4),
            IpAddr::V6(v6) => v6.to_ipv4_mapped().filter(|v4| !v4.is_loopback()),
        }
    })
}
