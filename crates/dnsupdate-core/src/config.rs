//! Configuration types for dnsupdate
//!
//! The configuration is loaded once at startup, validated, and then shared
//! read-only (behind an `Arc`) with the update cycle for the lifetime of the
//! process.
//!
//! ## File format
//!
//! ```toml
//! AuthToken = "dop_v1_..."
//!
//! [Hosts.web]
//! Domain = "example.com"
//!
//! [Hosts.nas]
//! Domain = "example.com"
//! Interface = "eth0"
//! ```
//!
//! Lower-case keys (`authtoken`, `auth_token`, `hosts`, `domain`,
//! `interface`) are accepted as well.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Daemon configuration
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// DNS provider API token
    /// ⚠️ NEVER log this value
    #[serde(rename = "AuthToken", alias = "authtoken", alias = "auth_token", default)]
    pub auth_token: String,

    /// Hosts to keep updated, keyed by host name (the left-most label)
    #[serde(rename = "Hosts", alias = "hosts", default)]
    pub hosts: BTreeMap<String, HostEntry>,
}

// Custom Debug implementation that hides the auth token
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("auth_token", &"<REDACTED>")
            .field("hosts", &self.hosts)
            .finish()
    }
}

impl Config {
    /// Create an empty configuration
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            hosts: BTreeMap::new(),
        }
    }

    /// Add a host entry
    pub fn with_host(mut self, name: impl Into<String>, entry: HostEntry) -> Self {
        self.hosts.insert(name.into(), entry);
        self
    }

    /// Read and parse a TOML configuration file
    ///
    /// The result is not validated; call [`Config::validate`] before use.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Replace the token when an override is present and non-empty
    ///
    /// Used for `DNSUPDATE_AUTH_TOKEN`, so the secret can stay out of the file.
    pub fn with_auth_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.auth_token = token;
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth_token.is_empty() {
            return Err(Error::config("provider auth token not set"));
        }
        if self.hosts.is_empty() {
            return Err(Error::config("no hosts configuration set"));
        }
        for (name, host) in &self.hosts {
            if name.is_empty() {
                return Err(Error::config(format!("invalid hostname '{}'", name)));
            }
            if host.domain.is_empty() {
                return Err(Error::config(format!(
                    "domain not set for hostname '{}'",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// One DNS record to maintain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    /// Network interface to read the address from; public lookup when unset
    #[serde(
        rename = "Interface",
        alias = "interface",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub interface: Option<String>,

    /// Zone the record lives in (e.g. "example.com")
    #[serde(rename = "Domain", alias = "domain", default)]
    pub domain: String,
}

impl HostEntry {
    /// Entry resolved through the public echo services
    pub fn public(domain: impl Into<String>) -> Self {
        Self {
            interface: None,
            domain: domain.into(),
        }
    }

    /// Entry resolved from a local network interface
    pub fn on_interface(domain: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            interface: Some(interface.into()),
            domain: domain.into(),
        }
    }

    /// The configured interface, treating an empty name as unset
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref().filter(|i| !i.is_empty())
    }
}
