//! UDP transport.

use super::{MAX_DATAGRAM_SIZE, Transport};
use crate::error::{Error, Result};
use crate::util::{bind_ephemeral_udp_socket, bind_udp_socket};
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;

/// UDP socket shared between tasks.
#[derive(Clone)]
pub struct UdpTransport {
    inner: Arc<UdpTransportInner>,
}

struct UdpTransportInner {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("local_addr", &self.inner.local_addr)
            .finish()
    }
}

impl UdpTransport {
    /// Bind to a local address.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = bind_udp_socket(addr).map_err(|e| Error::io(Some(addr), e))?;
        Self::from_socket(socket)
    }

    /// Bind an ephemeral port suitable for talking to `target`.
    pub async fn bind_for(target: SocketAddr) -> Result<Self> {
        let socket = bind_ephemeral_udp_socket(target).map_err(|e| Error::io(Some(target), e))?;
        Self::from_socket(socket)
    }

    fn from_socket(socket: UdpSocket) -> Result<Self> {
        let local_addr = socket.local_addr().map_err(|e| Error::io(None, e))?;
        tracing::debug!(target: "usnmp::transport", { snmp.local_addr = %local_addr }, "UDP socket bound");
        Ok(Self {
            inner: Arc::new(UdpTransportInner { socket, local_addr }),
        })
    }
}

impl Transport for UdpTransport {
    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<()> {
        tracing::trace!(target: "usnmp::transport", { snmp.target = %target, snmp.bytes = data.len() }, "UDP send");
        self.inner
            .socket
            .send_to(data, target)
            .await
            .map_err(|e| Error::io(Some(target), e))?;
        Ok(())
    }

    async fn recv_from(&self) -> Result<(Bytes, SocketAddr)> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let (len, source) = self
            .inner
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(|e| Error::io(None, e))?;
        buf.truncate(len);
        tracing::trace!(target: "usnmp::transport", { snmp.source = %source, snmp.bytes = len }, "UDP recv");
        Ok((Bytes::from(buf), source))
    }

    fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }
}
