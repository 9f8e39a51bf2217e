//! Request handling.

use std::net::SocketAddr;
use std::sync::PoisonError;

use super::Agent;
use crate::engine::{self, AllowAll, Authenticator, Reply};
use crate::error::{Error, Result};
use crate::pdu::{GenericTrap, PduType};
use crate::transport::Transport;

impl Agent {
    /// Run one datagram through the engine.
    ///
    /// Authorization uses the community table entry of the source address.
    pub(crate) fn process(&self, data: &[u8], source: SocketAddr) -> Result<Reply> {
        let table = self
            .inner
            .communities
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let by_source = |community: &[u8], pdu_type: PduType| {
            table.authorize(source.ip(), community, pdu_type)
        };
        let auth: &dyn Authenticator = if self.inner.authenticate {
            &by_source
        } else {
            &AllowAll
        };
        let mut mib = self.mib();
        engine::process(data, &mut mib, auth)
    }

    /// Answer one datagram, or drop it.
    pub(crate) async fn handle_request(&self, data: &[u8], source: SocketAddr) {
        match self.process(data, source) {
            Ok(reply) => {
                if reply.is_error() {
                    tracing::debug!(target: "usnmp::agent", { snmp.source = %source, snmp.status = %reply.error_status, snmp.index = reply.error_index }, "answering with error");
                }
                if let Err(e) = self.inner.transport.send_to(&reply.message, source).await {
                    tracing::warn!(target: "usnmp::agent", { snmp.source = %source, error = %e }, "failed to send response");
                }
                if reply.request_type == PduType::SetRequest {
                    self.save_if_dirty().await;
                }
            }
            Err(Error::InvalidCommunity { .. }) => {
                tracing::warn!(target: "usnmp::agent", { snmp.source = %source }, "authentication failure");
                self.send_trap(GenericTrap::AuthenticationFailure).await;
            }
            Err(e) => {
                tracing::debug!(target: "usnmp::agent", { snmp.source = %source, error = %e }, "dropping request");
            }
        }
    }
}
