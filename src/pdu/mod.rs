//! SNMPv1 Protocol Data Units.
//!
//! Builders produce the encoded PDU TLV ready for [`crate::message::wrap`].
//! [`Pdu`] and [`TrapPdu`] are the decoded forms used by the manager side.

use std::net::Ipv4Addr;

use bytes::Bytes;

use crate::ber::{Decoder, TlvWriter, tag};
use crate::error::{DecodeErrorKind, Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::varbind::VarBindList;

/// Capacity of a request message.
pub const REQUEST_BUFFER_SIZE: usize = 960;

/// Capacity of a response message.
pub const RESPONSE_BUFFER_SIZE: usize = 1280;

/// PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    GetRequest = 0xA0,
    GetNextRequest = 0xA1,
    GetResponse = 0xA2,
    SetRequest = 0xA3,
    Trap = 0xA4,
}

impl PduType {
    /// Create from tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tag::GET_REQUEST => Some(Self::GetRequest),
            tag::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::GET_RESPONSE => Some(Self::GetResponse),
            tag::SET_REQUEST => Some(Self::SetRequest),
            tag::TRAP => Some(Self::Trap),
            _ => None,
        }
    }

    /// Get the tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Whether an agent answers this PDU type.
    pub fn is_request(self) -> bool {
        matches!(
            self,
            Self::GetRequest | Self::GetNextRequest | Self::SetRequest
        )
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetRequest => write!(f, "GetRequest"),
            Self::GetNextRequest => write!(f, "GetNextRequest"),
            Self::GetResponse => write!(f, "GetResponse"),
            Self::SetRequest => write!(f, "SetRequest"),
            Self::Trap => write!(f, "Trap"),
        }
    }
}

/// SNMPv1 generic trap types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum GenericTrap {
    /// coldStart(0) - agent is reinitializing, config may change
    ColdStart = 0,
    /// warmStart(1) - agent is reinitializing, config unchanged
    WarmStart = 1,
    /// linkDown(2) - communication link failure
    LinkDown = 2,
    /// linkUp(3) - communication link came up
    LinkUp = 3,
    /// authenticationFailure(4) - improperly authenticated message received
    AuthenticationFailure = 4,
    /// egpNeighborLoss(5) - EGP peer marked down
    EgpNeighborLoss = 5,
    /// enterpriseSpecific(6) - vendor-specific trap, see specific_trap field
    EnterpriseSpecific = 6,
}

impl GenericTrap {
    /// Create from integer value.
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::ColdStart),
            1 => Some(Self::WarmStart),
            2 => Some(Self::LinkDown),
            3 => Some(Self::LinkUp),
            4 => Some(Self::AuthenticationFailure),
            5 => Some(Self::EgpNeighborLoss),
            6 => Some(Self::EnterpriseSpecific),
            _ => None,
        }
    }

    /// Get the integer value.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl std::fmt::Display for GenericTrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ColdStart => "coldStart",
            Self::WarmStart => "warmStart",
            Self::LinkDown => "linkDown",
            Self::LinkUp => "linkUp",
            Self::AuthenticationFailure => "authenticationFailure",
            Self::EgpNeighborLoss => "egpNeighborLoss",
            Self::EnterpriseSpecific => "enterpriseSpecific",
        };
        f.write_str(name)
    }
}

fn put_varbinds(w: &mut TlvWriter, varbinds: Option<&VarBindList>) -> Result<()> {
    match varbinds {
        Some(list) => w.put_raw(list.as_bytes()),
        None => w.put_raw(&[tag::SEQUENCE, 0x00]),
    }
}

/// Build a request PDU.
///
/// Error-status and error-index are zero. With no varbinds the list is an
/// empty SEQUENCE.
///
/// # Example
///
/// ```
/// use usnmp::pdu::{PduType, build_request};
///
/// let pdu = build_request(PduType::GetRequest, 7, None).unwrap();
/// assert_eq!(
///     &pdu[..],
///     [0xA0, 0x0B, 0x02, 0x01, 0x07, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x30, 0x00]
/// );
/// ```
pub fn build_request(
    pdu_type: PduType,
    request_id: i32,
    varbinds: Option<&VarBindList>,
) -> Result<Bytes> {
    let mut w = TlvWriter::new(REQUEST_BUFFER_SIZE);
    w.constructed(pdu_type.tag(), |w| {
        w.put_integer(request_id)?;
        w.put_integer(0)?;
        w.put_integer(0)?;
        put_varbinds(w, varbinds)
    })?;
    Ok(w.freeze())
}

/// Build a Trap PDU.
pub fn build_trap(
    enterprise: &Oid,
    agent_addr: Ipv4Addr,
    generic: GenericTrap,
    specific: i32,
    time_stamp: u32,
    varbinds: Option<&VarBindList>,
) -> Result<Bytes> {
    let mut w = TlvWriter::new(REQUEST_BUFFER_SIZE);
    w.constructed(tag::TRAP, |w| {
        w.put_oid(enterprise)?;
        w.put_ip_address(agent_addr.octets())?;
        w.put_integer(generic.as_i32())?;
        w.put_integer(specific)?;
        w.put_unsigned(tag::TIMETICKS, time_stamp)?;
        put_varbinds(w, varbinds)
    })?;
    Ok(w.freeze())
}

/// Decoded request or response PDU.
#[derive(Debug, Clone)]
pub struct Pdu {
    pub pdu_type: PduType,
    pub request_id: i32,
    pub error_status: ErrorStatus,
    /// 1-based index of the failing varbind, 0 when there is none.
    pub error_index: u32,
    pub varbinds: VarBindList,
}

impl Pdu {
    /// Decode a request or response PDU.
    pub fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        let tlv = decoder.read_tlv()?;
        let pdu_type = PduType::from_tag(tlv.tag)
            .filter(|t| *t != PduType::Trap)
            .ok_or_else(|| {
                tracing::debug!(target: "usnmp::ber", { snmp.offset = %tlv.start, tag = tlv.tag }, "unexpected PDU type");
                Error::decode(tlv.start, DecodeErrorKind::UnexpectedPduType(tlv.tag))
            })?;
        let mut pdu = decoder.enter(&tlv);

        let request_id = pdu.read_integer()?;
        let error_status = ErrorStatus::from_i32(pdu.read_integer()?);
        let error_index = pdu.read_integer()?.max(0) as u32;
        let varbinds = read_varbind_list(&mut pdu)?;

        Ok(Pdu {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }

    /// Whether the error-status is non-zero.
    pub fn is_error(&self) -> bool {
        self.error_status.is_error()
    }
}

/// Decoded Trap PDU.
#[derive(Debug, Clone)]
pub struct TrapPdu {
    pub enterprise: Oid,
    pub agent_addr: Ipv4Addr,
    /// Generic trap code, see [`GenericTrap`].
    pub generic_trap: i32,
    pub specific_trap: i32,
    /// Sender uptime in hundredths of a second.
    pub time_stamp: u32,
    pub varbinds: VarBindList,
}

impl TrapPdu {
    /// Decode a Trap PDU.
    pub fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        let mut pdu = decoder.read_constructed(tag::TRAP)?;

        let enterprise = pdu.read_oid()?;
        let agent_addr = Ipv4Addr::from(pdu.read_ip_address()?);
        let generic_trap = pdu.read_integer()?;
        let specific_trap = pdu.read_integer()?;
        let time_stamp = pdu.read_unsigned(tag::TIMETICKS)?;
        let varbinds = read_varbind_list(&mut pdu)?;

        Ok(TrapPdu {
            enterprise,
            agent_addr,
            generic_trap,
            specific_trap,
            time_stamp,
            varbinds,
        })
    }

    /// The generic trap code as an enum.
    pub fn generic(&self) -> Option<GenericTrap> {
        GenericTrap::from_i32(self.generic_trap)
    }
}

/// Read the varbind list that must end a PDU.
fn read_varbind_list(pdu: &mut Decoder<'_>) -> Result<VarBindList> {
    let tlv = pdu.expect(tag::SEQUENCE)?;
    if !pdu.is_empty() {
        return Err(Error::decode(pdu.offset(), DecodeErrorKind::TrailingData));
    }
    VarBindList::from_ber(pdu.raw(&tlv))
}
