//! Error types for dnsupdate
//!
//! One enum covers the whole pipeline. Configuration errors are fatal at
//! startup; every other variant is recovered per host by the update cycle.

use thiserror::Error;

/// Result type alias for dnsupdate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation failed
    ///
    /// Displays the bare message so validation errors read exactly as written.
    #[error("{0}")]
    Config(String),

    /// The configured network interface does not exist
    #[error("network interface '{interface}' not found")]
    InterfaceNotFound { interface: String },

    /// The OS refused to enumerate interface addresses
    #[error("failed to enumerate addresses for interface '{interface}': {reason}")]
    AddressEnumerationFailed { interface: String, reason: String },

    /// The interface has no non-loopback IPv4 address
    #[error("no suitable IP address found for interface {interface}")]
    NoSuitableAddress { interface: String },

    /// Every public echo service failed or answered with an empty body
    #[error("couldn't resolve public ip address")]
    PublicIpUnresolvable,

    /// Looking up the existing A record failed
    #[error("error looking up DNS record for {fqdn}: {source}")]
    LookupFailed {
        fqdn: String,
        #[source]
        source: Box<Error>,
    },

    /// Creating a missing A record failed
    #[error("error creating record for {fqdn}: {source}")]
    CreateFailed {
        fqdn: String,
        #[source]
        source: Box<Error>,
    },

    /// Editing an existing A record failed
    #[error("error updating record for {fqdn}: {source}")]
    UpdateFailed {
        fqdn: String,
        #[source]
        source: Box<Error>,
    },

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success answer from a remote API
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn interface_not_found(interface: impl Into<String>) -> Self {
        Self::InterfaceNotFound {
            interface: interface.into(),
        }
    }

    pub fn address_enumeration(interface: impl Into<String>, reason: impl ToString) -> Self {
        Self::AddressEnumerationFailed {
            interface: interface.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn lookup_failed(fqdn: &str, source: Error) -> Self {
        Self::LookupFailed {
            fqdn: fqdn.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn create_failed(fqdn: &str, source: Error) -> Self {
        Self::CreateFailed {
            fqdn: fqdn.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn update_failed(fqdn: &str, source: Error) -> Self {
        Self::UpdateFailed {
            fqdn: fqdn.to_string(),
            source: Box::new(source),
        }
    }

    /// Whether this error came from resolving an address (as opposed to
    /// talking to the DNS provider)
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Self::InterfaceNotFound { .. }
                | Self::AddressEnumerationFailed { .. }
                | Self::NoSuitableAddress { .. }
                | Self::PublicIpUnresolvable
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("failed to parse config file: {}", err))
    }
}
