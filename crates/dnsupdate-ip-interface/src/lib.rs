// # Interface Address Source
//
// This crate provides the `InterfaceAddresses` implementation used for hosts
// configured with an `Interface`: it lists the addresses bound to a local
// network interface via getifaddrs(3).
//
// ## Platform Support
//
// Unix only (getifaddrs via the `nix` crate). On other platforms every lookup
// fails with `AddressEnumerationFailed`, which the update cycle logs and skips.
//
// Selecting which address to publish (non-loopback, IPv4) is done by the core
// resolver; this crate only reports what the OS has.

use dnsupdate_core::traits::InterfaceAddresses;
use dnsupdate_core::{Error, Result};

use std::net::IpAddr;

/// getifaddrs(3)-backed [`InterfaceAddresses`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl SystemInterfaces {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl InterfaceAddresses for SystemInterfaces {
    async fn addresses(&self, interface: &str) -> Result<Vec<IpAddr>> {
        let entries = system_entries(interface)?;
        let addrs = addresses_of(interface, entries)?;
        tracing::debug!("interface {} addresses: {:?}", interface, addrs);
        Ok(addrs)
    }
}

/// Addresses of `interface` from `(interface name, address)` entries
///
/// An interface appears in getifaddrs output even without an IP address (as
/// a link-layer entry), so any entry with the name proves it exists.
pub fn addresses_of<I>(interface: &str, entries: I) -> Result<Vec<IpAddr>>
where
    I: IntoIterator<Item = (String, Option<IpAddr>)>,
{
    let mut found = false;
    let mut addrs = Vec::new();

    for (name, addr) in entries {
        if name != interface {
            continue;
        }
        found = true;
        if let Some(addr) = addr {
            addrs.push(addr);
        }
    }

    if !found {
        return Err(Error::interface_not_found(interface));
    }
    Ok(addrs)
}

#[cfg(unix)]
fn system_entries(interface: &str) -> Result<Vec<(String, Option<IpAddr>)>> {
    let ifaddrs =
        nix::ifaddrs::getifaddrs().map_err(|e| Error::address_enumeration(interface, e))?;

    Ok(ifaddrs
        .map(|ifaddr| {
            let ip = ifaddr.address.as_ref().and_then(|storage| {
                if let Some(sin) = storage.as_sockaddr_in() {
                    Some(IpAddr::V4(sin.ip()))
                } else {
                    storage.as_sockaddr_in6().map(|sin6| IpAddr::V6(sin6.ip()))
                }
            });
            (ifaddr.interface_name, ip)
        })
        .collect())
}

#[cfg(not(unix))]
fn system_entries(interface: &str) -> Result<Vec<(String, Option<IpAddr>)>> {
    Err(Error::address_enumeration(
        interface,
        "interface lookup is only supported on unix",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, addr: Option<&str>) -> (String, Option<IpAddr>) {
        (name.to_string(), addr.map(|a| a.parse().unwrap()))
    }

    #[test]
    fn test_addresses_filtered_by_name() {
        let entries = vec![
            entry("lo", Some("127.0.0.1")),
            entry("eth0", None),
            entry("eth0", Some("192.168.1.20")),
            entry("wlan0", Some("10.0.0.3")),
            entry("eth0", Some("fe80::1")),
        ];

        let addrs = addresses_of("eth0", entries).unwrap();
        assert_eq!(
            addrs,
            vec![
                "192.168.1.20".parse::<IpAddr>().unwrap(),
                "fe80::1".parse::<IpAddr>().unwrap()
            ]
        );
    }

    #[test]
    fn test_interface_without_addresses_exists() {
        let addrs = addresses_of("eth1", vec![entry("eth1", None)]).unwrap();
        assert!(addrs.is_empty());
    }

    #[test]
    fn test_missing_interface() {
        let err = addresses_of("eth9", vec![entry("eth0", Some("192.168.1.20"))]).unwrap_err();
        assert!(matches!(err, Error::InterfaceNotFound { .. }));
    }

    #[tokio::test]
    #[cfg(target_os = "linux")]
    async fn test_loopback_is_listed() {
        let addrs = SystemInterfaces::new().addresses("lo").await.unwrap();
        assert!(addrs.iter().any(|a| a.is_loopback()));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_unknown_system_interface() {
        let err = SystemInterfaces::new()
            .addresses("dnsupdate-none0")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InterfaceNotFound { .. }));
    }
}
