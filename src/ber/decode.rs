//! BER decoding.
//!
//! The decoder borrows the whole message and walks it with absolute offsets,
//! so every [`Tlv`] it produces can be used to copy the exact request bytes
//! into a reply.

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;

/// Position of one TLV inside a message.
///
/// Produced fresh by every decode step and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv {
    /// Tag byte.
    pub tag: u8,
    /// Offset of the tag byte.
    pub start: usize,
    /// Decoded length of the value.
    pub len: usize,
    /// Offset of the first value byte.
    pub value_start: usize,
    /// Offset of the next sibling TLV.
    pub next: usize,
}

impl Tlv {
    /// Width of tag plus length field.
    pub fn header_len(&self) -> usize {
        self.value_start - self.start
    }

    /// Width of the whole TLV.
    pub fn total_len(&self) -> usize {
        self.next - self.start
    }
}

/// BER decoder over a borrowed buffer.
///
/// A decoder covers the range `offset..end`. [`Decoder::enter`] creates a
/// decoder restricted to the value of a constructed TLV, keeping offsets
/// absolute.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    offset: usize,
    end: usize,
}

impl<'a> Decoder<'a> {
    /// Create a decoder over the whole buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            end: data.len(),
        }
    }

    /// Get the current absolute offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Get remaining bytes in this decoder's range.
    pub fn remaining(&self) -> usize {
        self.end - self.offset
    }

    /// Check if we've reached the end of the range.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.end
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.data[self.offset])
        }
    }

    /// Read the next TLV header and skip over its value.
    pub fn read_tlv(&mut self) -> Result<Tlv> {
        let start = self.offset;
        let Some(tag) = self.peek_tag() else {
            tracing::debug!(target: "usnmp::ber", { snmp.offset = %start, kind = %DecodeErrorKind::TruncatedData }, "truncated data: unexpected end of input");
            return Err(Error::decode(start, DecodeErrorKind::TruncatedData));
        };
        let (len, consumed) = decode_length(&self.data[start + 1..self.end], start + 1)?;
        let value_start = start + 1 + consumed;
        let next = value_start.saturating_add(len);
        if next > self.end {
            tracing::debug!(target: "usnmp::ber", { snmp.offset = %start, length = len, available = self.end - value_start }, "length exceeds enclosing data");
            return Err(Error::decode(start, DecodeErrorKind::MalformedLength));
        }
        self.offset = next;
        Ok(Tlv {
            tag,
            start,
            len,
            value_start,
            next,
        })
    }

    /// Read the next TLV and require a specific tag.
    pub fn expect(&mut self, expected: u8) -> Result<Tlv> {
        let tlv = self.read_tlv()?;
        if tlv.tag != expected {
            let kind = DecodeErrorKind::UnexpectedTag {
                expected,
                actual: tlv.tag,
            };
            tracing::debug!(target: "usnmp::ber", { snmp.offset = %tlv.start, kind = %kind }, "unexpected tag");
            return Err(Error::decode(tlv.start, kind));
        }
        Ok(tlv)
    }

    /// Value bytes of a TLV read from this decoder.
    pub fn value(&self, tlv: &Tlv) -> &'a [u8] {
        &self.data[tlv.value_start..tlv.next]
    }

    /// Raw bytes of a TLV, header included.
    pub fn raw(&self, tlv: &Tlv) -> &'a [u8] {
        &self.data[tlv.start..tlv.next]
    }

    /// Create a decoder over the value of a constructed TLV.
    pub fn enter(&self, tlv: &Tlv) -> Decoder<'a> {
        Decoder {
            data: self.data,
            offset: tlv.value_start,
            end: tlv.next,
        }
    }

    /// Create a decoder covering exactly one TLV, header included.
    pub fn span(&self, tlv: &Tlv) -> Decoder<'a> {
        Decoder {
            data: self.data,
            offset: tlv.start,
            end: tlv.next,
        }
    }

    /// Read an INTEGER TLV.
    pub fn read_integer(&mut self) -> Result<i32> {
        let tlv = self.expect(tag::INTEGER)?;
        decode_integer(self.value(&tlv), tlv.value_start)
    }

    /// Read an unsigned integer-family TLV with the given tag.
    pub fn read_unsigned(&mut self, expected: u8) -> Result<u32> {
        let tlv = self.expect(expected)?;
        decode_unsigned(self.value(&tlv), tlv.value_start)
    }

    /// Read an OCTET STRING TLV.
    pub fn read_octet_string(&mut self) -> Result<&'a [u8]> {
        let tlv = self.expect(tag::OCTET_STRING)?;
        Ok(self.value(&tlv))
    }

    /// Read an OBJECT IDENTIFIER TLV.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let tlv = self.expect(tag::OBJECT_IDENTIFIER)?;
        Oid::from_ber(self.value(&tlv)).map_err(|e| match e {
            Error::InvalidOid { kind, .. } => {
                Error::decode(tlv.value_start, DecodeErrorKind::InvalidOid(kind))
            }
            other => other,
        })
    }

    /// Read an IpAddress TLV.
    pub fn read_ip_address(&mut self) -> Result<[u8; 4]> {
        let tlv = self.expect(tag::IP_ADDRESS)?;
        self.value(&tlv).try_into().map_err(|_| {
            Error::decode(
                tlv.start,
                DecodeErrorKind::InvalidLength {
                    tag: tag::IP_ADDRESS,
                    length: tlv.len,
                },
            )
        })
    }

    /// Read a constructed TLV with the given tag and return a decoder over its value.
    pub fn read_constructed(&mut self, expected: u8) -> Result<Decoder<'a>> {
        let tlv = self.expect(expected)?;
        Ok(self.enter(&tlv))
    }

    /// Read a SEQUENCE and return a decoder over its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder<'a>> {
        self.read_constructed(tag::SEQUENCE)
    }
}

/// Decode a signed INTEGER value (1 to 4 bytes, sign-extended).
pub fn decode_integer(bytes: &[u8], offset: usize) -> Result<i32> {
    if bytes.is_empty() || bytes.len() > 4 {
        tracing::debug!(target: "usnmp::ber", { snmp.offset = %offset, length = bytes.len() }, "invalid integer length");
        return Err(Error::decode(offset, DecodeErrorKind::InvalidInteger));
    }
    let init: i32 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
    Ok(bytes.iter().fold(init, |acc, &b| (acc << 8) | b as i32))
}

/// Decode an unsigned 32-bit value (Counter32, Gauge32, TimeTicks).
///
/// Accepts a fifth leading byte only when it is the 0x00 sign pad.
pub fn decode_unsigned(bytes: &[u8], offset: usize) -> Result<u32> {
    let digits = match bytes {
        [0x00, rest @ ..] if rest.len() == 4 => rest,
        _ if !bytes.is_empty() && bytes.len() <= 4 => bytes,
        _ => {
            tracing::debug!(target: "usnmp::ber", { snmp.offset = %offset, length = bytes.len() }, "invalid unsigned length");
            return Err(Error::decode(offset, DecodeErrorKind::InvalidInteger));
        }
    };
    Ok(digits.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
}
