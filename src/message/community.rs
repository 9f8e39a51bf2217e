//! Community-based SNMPv1 envelope.
//!
//! `SEQUENCE { version INTEGER (0), community OCTET STRING, pdu PDU }`

use super::{MAX_COMMUNITY_LEN, SNMP_VERSION_1};
use crate::ber::{Decoder, Tlv, TlvWriter, decode_integer, tag};
use crate::error::{DecodeErrorKind, EncodeErrorKind, Error, Result};
use crate::pdu::{PduType, RESPONSE_BUFFER_SIZE};
use bytes::Bytes;

/// Borrowed view of a decoded envelope.
///
/// Keeps the raw TLVs so a reply can copy request fields byte for byte.
#[derive(Debug, Clone)]
pub struct Envelope<'a> {
    seq: Decoder<'a>,
    /// The version INTEGER.
    pub version: Tlv,
    /// The community OCTET STRING.
    pub community_tlv: Tlv,
    /// Community string bytes.
    pub community: &'a [u8],
    /// The PDU TLV.
    pub pdu: Tlv,
    /// PDU type named by the PDU tag.
    pub pdu_type: PduType,
}

impl<'a> Envelope<'a> {
    /// Decode the envelope of a whole message.
    ///
    /// Fails unless the message is exactly one SEQUENCE holding version 0,
    /// a community of at most [`MAX_COMMUNITY_LEN`] bytes, and one PDU.
    pub fn decode(data: &'a [u8]) -> Result<Self> {
        let mut outer = Decoder::new(data);
        let mut seq = outer.read_sequence()?;
        if !outer.is_empty() {
            tracing::debug!(target: "usnmp::ber", { snmp.offset = %outer.offset() }, "trailing data after message");
            return Err(Error::decode(outer.offset(), DecodeErrorKind::TrailingData));
        }

        let version = seq.expect(tag::INTEGER)?;
        let version_num = decode_integer(seq.value(&version), version.value_start)?;
        if version_num != SNMP_VERSION_1 {
            tracing::debug!(target: "usnmp::ber", { snmp.offset = %version.start, version = version_num }, "unknown SNMP version");
            return Err(Error::decode(
                version.start,
                DecodeErrorKind::UnknownVersion(version_num),
            ));
        }

        let community_tlv = seq.expect(tag::OCTET_STRING)?;
        if community_tlv.len > MAX_COMMUNITY_LEN {
            tracing::debug!(target: "usnmp::ber", { snmp.offset = %community_tlv.start, length = community_tlv.len }, "community string too long");
            return Err(Error::decode(
                community_tlv.start,
                DecodeErrorKind::CommunityTooLong {
                    length: community_tlv.len,
                },
            ));
        }
        let community = seq.value(&community_tlv);

        let pdu = seq.read_tlv()?;
        let pdu_type = PduType::from_tag(pdu.tag).ok_or_else(|| {
            tracing::debug!(target: "usnmp::ber", { snmp.offset = %pdu.start, tag = pdu.tag }, "unexpected PDU type");
            Error::decode(pdu.start, DecodeErrorKind::UnexpectedPduType(pdu.tag))
        })?;
        if !seq.is_empty() {
            return Err(Error::decode(seq.offset(), DecodeErrorKind::TrailingData));
        }

        Ok(Self {
            seq,
            version,
            community_tlv,
            community,
            pdu,
            pdu_type,
        })
    }

    /// Decoder over the PDU contents.
    pub fn pdu_contents(&self) -> Decoder<'a> {
        self.seq.enter(&self.pdu)
    }

    /// Decoder positioned at the PDU TLV itself.
    pub fn pdu_decoder(&self) -> Decoder<'a> {
        self.seq.span(&self.pdu)
    }

    /// Raw bytes of a TLV from this message.
    pub fn raw(&self, tlv: &Tlv) -> &'a [u8] {
        self.seq.raw(tlv)
    }
}

/// Wrap an encoded PDU in an SNMPv1 envelope.
///
/// # Example
///
/// ```
/// use usnmp::message::wrap;
///
/// let msg = wrap(b"public", &[0xA0, 0x00]).unwrap();
/// assert_eq!(
///     &msg[..],
///     [0x30, 0x0D, 0x02, 0x01, 0x00, 0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', 0xA0, 0x00]
/// );
/// ```
pub fn wrap(community: &[u8], pdu: &[u8]) -> Result<Bytes> {
    if community.len() > MAX_COMMUNITY_LEN {
        return Err(Error::encode(EncodeErrorKind::CommunityTooLong {
            length: community.len(),
        }));
    }
    let mut w = TlvWriter::new(RESPONSE_BUFFER_SIZE);
    w.constructed(tag::SEQUENCE, |w| {
        w.put_integer(SNMP_VERSION_1)?;
        w.put_octet_string(community)?;
        w.put_raw(pdu)
    })?;
    Ok(w.freeze())
}
