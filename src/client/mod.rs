//! SNMPv1 manager.
//!
//! A [`Client`] sends GET, GET-NEXT and SET requests to one agent and waits
//! for the matching GetResponse. Traps are fire-and-forget.

mod builder;

pub use builder::ClientBuilder;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::message::{Response, parse_response, wrap};
use crate::oid::Oid;
use crate::pdu::{GenericTrap, PduType, build_request, build_trap};
use crate::transport::{Transport, UdpTransport};
use crate::value::Value;
use crate::varbind::{VarBind, VarBindList};

/// Default response timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Client configuration.
///
/// Most users should use [`ClientBuilder`] rather than constructing this directly.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Community string (default: "public")
    pub community: Bytes,
    /// Response timeout (default: 2 seconds)
    pub timeout: Duration,
    /// Request id of the first request (default: 1)
    pub first_request_id: i32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            community: Bytes::from_static(b"public"),
            timeout: DEFAULT_TIMEOUT,
            first_request_id: 1,
        }
    }
}

/// SNMPv1 client for one agent.
///
/// Cloning is cheap; clones share the socket and the request id counter.
#[derive(Clone)]
pub struct Client<T: Transport = UdpTransport> {
    inner: Arc<ClientInner<T>>,
}

struct ClientInner<T: Transport> {
    transport: T,
    target: SocketAddr,
    config: ClientConfig,
    next_id: AtomicI32,
}

impl Client<UdpTransport> {
    /// Start building a client for `host`.
    pub fn builder(host: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(host)
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, target: SocketAddr, config: ClientConfig) -> Self {
        let next_id = AtomicI32::new(config.first_request_id);
        Self {
            inner: Arc::new(ClientInner {
                transport,
                target,
                config,
                next_id,
            }),
        }
    }

    /// Address requests are sent to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.inner.target
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    fn next_request_id(&self) -> i32 {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Wait for a datagram from the target that decodes as a GetResponse.
    async fn recv_response(&self) -> Result<Response> {
        loop {
            let (data, source) = self.inner.transport.recv_from().await?;
            if source != self.inner.target {
                tracing::debug!(target: "usnmp::client", { snmp.source = %source }, "ignoring datagram from unexpected source");
                continue;
            }
            return parse_response(&data);
        }
    }

    /// Send a request PDU and wait for its response.
    ///
    /// A response carrying a non-zero error-status is returned as
    /// [`Error::Snmp`].
    #[instrument(
        level = "debug",
        skip(self, varbinds),
        fields(snmp.target = %self.peer_addr(), snmp.request_id = tracing::field::Empty)
    )]
    pub async fn request(&self, pdu_type: PduType, varbinds: &VarBindList) -> Result<Response> {
        let request_id = self.next_request_id();
        tracing::Span::current().record("snmp.request_id", request_id);

        let pdu = build_request(pdu_type, request_id, Some(varbinds))?;
        let data = wrap(&self.inner.config.community, &pdu)?;
        tracing::trace!(target: "usnmp::client", { snmp.bytes = data.len() }, "sending request");
        self.inner.transport.send_to(&data, self.inner.target).await?;

        let response = tokio::time::timeout(self.inner.config.timeout, self.recv_response())
            .await
            .map_err(|_| {
                tracing::debug!(target: "usnmp::client", { peer = %self.peer_addr(), request_id }, "request timed out");
                Error::Timeout {
                    target: self.inner.target,
                }
            })??;

        if response.request_id != request_id {
            tracing::warn!(target: "usnmp::client", { expected = request_id, actual = response.request_id, peer = %self.peer_addr() }, "request ID mismatch in response");
            return Err(Error::RequestIdMismatch {
                expected: request_id,
                actual: response.request_id,
            });
        }
        if response.error_status.is_error() {
            tracing::debug!(target: "usnmp::client", { snmp.status = %response.error_status, snmp.index = response.error_index }, "agent returned error");
        }
        response.into_result()
    }

    async fn request_oids(&self, pdu_type: PduType, oids: &[Oid]) -> Result<Vec<VarBind>> {
        let mut list = VarBindList::new();
        for oid in oids {
            list.append(oid, &Value::Null)?;
        }
        self.request(pdu_type, &list).await?.varbinds.to_vec()
    }

    /// GET the values of `oids`.
    pub async fn get(&self, oids: &[Oid]) -> Result<Vec<VarBind>> {
        self.request_oids(PduType::GetRequest, oids).await
    }

    /// GET-NEXT: the successor of each of `oids`.
    pub async fn get_next(&self, oids: &[Oid]) -> Result<Vec<VarBind>> {
        self.request_oids(PduType::GetNextRequest, oids).await
    }

    /// SET each varbind and return the agent's echo.
    pub async fn set(&self, varbinds: &[VarBind]) -> Result<Vec<VarBind>> {
        let mut list = VarBindList::new();
        for vb in varbinds {
            list.push(vb)?;
        }
        self.request(PduType::SetRequest, &list).await?.varbinds.to_vec()
    }

    /// Send a trap to the target without waiting for anything.
    #[instrument(level = "debug", skip(self, enterprise, varbinds), fields(snmp.target = %self.peer_addr()))]
    pub async fn send_trap(
        &self,
        enterprise: &Oid,
        agent_addr: Ipv4Addr,
        generic: GenericTrap,
        specific: i32,
        time_stamp: u32,
        varbinds: Option<&VarBindList>,
    ) -> Result<()> {
        let pdu = build_trap(enterprise, agent_addr, generic, specific, time_stamp, varbinds)?;
        let data = wrap(&self.inner.config.community, &pdu)?;
        self.inner.transport.send_to(&data, self.inner.target).await
    }
}
