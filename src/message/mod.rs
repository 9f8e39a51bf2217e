//! SNMPv1 message envelope.
//!
//! - [`wrap`] prefixes an encoded PDU with version and community
//! - [`parse_response`] and [`parse_trap`] decode what a manager receives
//! - [`Envelope`] is the borrowed header view the agent engine works from

mod community;

pub use community::{Envelope, wrap};

use bytes::Bytes;

use crate::error::{DecodeErrorKind, Error, ErrorStatus, Result};
use crate::pdu::{Pdu, PduType, TrapPdu};
use crate::varbind::VarBindList;

/// Version field of every SNMPv1 message.
pub const SNMP_VERSION_1: i32 = 0;

/// Longest community string accepted.
pub const MAX_COMMUNITY_LEN: usize = 15;

/// Decoded GetResponse.
#[derive(Debug, Clone)]
pub struct Response {
    pub community: Bytes,
    pub request_id: i32,
    pub error_status: ErrorStatus,
    /// 1-based index of the failing varbind, 0 when there is none.
    pub error_index: u32,
    pub varbinds: VarBindList,
}

impl Response {
    /// Turn a non-zero error-status into [`Error::Snmp`].
    pub fn into_result(self) -> Result<Self> {
        if self.error_status.is_error() {
            return Err(Error::Snmp {
                status: self.error_status,
                index: self.error_index,
            });
        }
        Ok(self)
    }
}

/// Decoded Trap message.
#[derive(Debug, Clone)]
pub struct Trap {
    pub community: Bytes,
    pub pdu: TrapPdu,
}

/// Decode a GetResponse message.
pub fn parse_response(data: &[u8]) -> Result<Response> {
    let env = Envelope::decode(data)?;
    if env.pdu_type != PduType::GetResponse {
        tracing::debug!(target: "usnmp::ber", { snmp.offset = %env.pdu.start, pdu_type = %env.pdu_type }, "expected GetResponse");
        return Err(Error::decode(
            env.pdu.start,
            DecodeErrorKind::UnexpectedPduType(env.pdu.tag),
        ));
    }
    let pdu = Pdu::decode(&mut env.pdu_decoder())?;
    Ok(Response {
        community: Bytes::copy_from_slice(env.community),
        request_id: pdu.request_id,
        error_status: pdu.error_status,
        error_index: pdu.error_index,
        varbinds: pdu.varbinds,
    })
}

/// Decode a Trap message.
pub fn parse_trap(data: &[u8]) -> Result<Trap> {
    let env = Envelope::decode(data)?;
    if env.pdu_type != PduType::Trap {
        tracing::debug!(target: "usnmp::ber", { snmp.offset = %env.pdu.start, pdu_type = %env.pdu_type }, "expected Trap");
        return Err(Error::decode(
            env.pdu.start,
            DecodeErrorKind::UnexpectedPduType(env.pdu.tag),
        ));
    }
    let pdu = TrapPdu::decode(&mut env.pdu_decoder())?;
    Ok(Trap {
        community: Bytes::copy_from_slice(env.community),
        pdu,
    })
}
