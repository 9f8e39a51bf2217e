//! Datagram transport.
//!
//! The engine never touches sockets. Agents and managers move encoded
//! messages through a [`Transport`]; [`UdpTransport`] is the UDP one.

mod udp;

pub use udp::UdpTransport;

use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;

/// Well-known agent port.
pub const SNMP_PORT: u16 = 161;

/// Well-known trap port.
pub const TRAP_PORT: u16 = 162;

/// Largest datagram read from the network.
pub const MAX_DATAGRAM_SIZE: usize = 65535;

/// Unconnected datagram transport.
///
/// Implementations are cheap to clone and safe to share between tasks.
pub trait Transport: Send + Sync + Clone {
    /// Send one datagram to `target`.
    fn send_to(&self, data: &[u8], target: SocketAddr) -> impl Future<Output = Result<()>> + Send;

    /// Receive one datagram from any source.
    fn recv_from(&self) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send;

    /// Local bind address.
    fn local_addr(&self) -> SocketAddr;
}
