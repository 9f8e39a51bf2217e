//! Client builder.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;

use super::{Client, ClientConfig, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};
use crate::message::MAX_COMMUNITY_LEN;
use crate::transport::{SNMP_PORT, Transport, UdpTransport};

/// Builder for [`Client`].
///
/// # Example
///
/// ```rust,no_run
/// use usnmp::Client;
/// use std::time::Duration;
///
/// # async fn example() -> usnmp::Result<()> {
/// let client = Client::builder("192.168.1.1")
///     .community("private")
///     .timeout(Duration::from_secs(5))
///     .connect()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    host: String,
    port: u16,
    community: Bytes,
    timeout: Duration,
    request_id: i32,
}

impl ClientBuilder {
    /// Create a builder for `host`, which may be a name or an address.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: SNMP_PORT,
            community: Bytes::from_static(b"public"),
            timeout: DEFAULT_TIMEOUT,
            request_id: 1,
        }
    }

    /// Destination port (default: 161).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Community string (default: `public`).
    pub fn community(mut self, community: impl AsRef<[u8]>) -> Self {
        self.community = Bytes::copy_from_slice(community.as_ref());
        self
    }

    /// Time to wait for a response (default: 2 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Request id of the first request (default: 1). Later requests count up.
    pub fn request_id(mut self, request_id: i32) -> Self {
        self.request_id = request_id;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.community.len() > MAX_COMMUNITY_LEN {
            return Err(Error::Config(format!(
                "community of {} bytes exceeds {MAX_COMMUNITY_LEN}",
                self.community.len()
            )));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be non-zero".into()));
        }
        Ok(())
    }

    fn resolve_target(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| Error::Config(format!("could not resolve address '{}': {e}", self.host)))?
            .next()
            .ok_or_else(|| Error::Config(format!("could not resolve address '{}'", self.host)))
    }

    fn build_config(&self) -> ClientConfig {
        ClientConfig {
            community: self.community.clone(),
            timeout: self.timeout,
            first_request_id: self.request_id,
        }
    }

    /// Bind an ephemeral UDP socket and create the client.
    pub async fn connect(self) -> Result<Client<UdpTransport>> {
        self.validate()?;
        let target = self.resolve_target()?;
        let transport = UdpTransport::bind_for(target).await?;
        Ok(Client::new(transport, target, self.build_config()))
    }

    /// Create the client on an existing transport.
    pub fn build_with<T: Transport>(self, transport: T) -> Result<Client<T>> {
        self.validate()?;
        let target = self.resolve_target()?;
        Ok(Client::new(transport, target, self.build_config()))
    }
}
