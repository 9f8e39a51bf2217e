//! Forward BER writer with length backpatching.
//!
//! BER puts a length in front of a payload whose size is unknown until the
//! payload has been written. [`TlvWriter::constructed`] writes the tag and a
//! one-byte placeholder, runs the caller's closure to produce the payload,
//! then fixes the length. When the final length needs the long form the
//! payload is shifted once to make room. All offset arithmetic for this lives
//! in [`TlvWriter::backpatch`].
//!
//! Every writer has a fixed capacity. Writes past it fail with
//! [`EncodeErrorKind::CapacityExceeded`] and leave earlier content intact.

use bytes::Bytes;

use super::length::{encode_length, length_field_width};
use super::tag;
use crate::error::{EncodeErrorKind, Error, Result};
use crate::oid::Oid;

/// Strip redundant leading bytes from a big-endian integer value.
///
/// For INTEGER, leading 0x00/0xFF bytes are dropped while the next byte
/// carries the same sign bit. For the unsigned types, leading 0x00 bytes
/// are dropped and one is kept (or added by the caller) when the top bit of
/// the first remaining byte is set. At least one byte always remains.
///
/// Returns the canonical sub-slice.
///
/// # Examples
///
/// ```
/// use usnmp::ber::{canonicalize_integer, tag};
///
/// assert_eq!(canonicalize_integer(tag::INTEGER, &[0, 0, 0, 0]), &[0x00]);
/// assert_eq!(canonicalize_integer(tag::INTEGER, &[0xFF, 0xFF, 0xFF, 0xFF]), &[0xFF]);
/// assert_eq!(canonicalize_integer(tag::INTEGER, &[0, 0, 0, 0x80]), &[0x00, 0x80]);
/// assert_eq!(canonicalize_integer(tag::GAUGE32, &[0, 0, 0, 0x80, 0]), &[0x00, 0x80, 0x00]);
/// ```
pub fn canonicalize_integer(tag: u8, value: &[u8]) -> &[u8] {
    let mut v = value;
    if tag == tag::INTEGER {
        while v.len() > 1
            && ((v[0] == 0x00 && v[1] & 0x80 == 0) || (v[0] == 0xFF && v[1] & 0x80 != 0))
        {
            v = &v[1..];
        }
    } else {
        while v.len() > 1 && v[0] == 0x00 && v[1] & 0x80 == 0 {
            v = &v[1..];
        }
    }
    v
}

/// Encode an integer-family value canonically into `out`, returning its length.
///
/// `out` receives at most 5 bytes: unsigned values with the top bit set get a
/// 0x00 pad so they are never read back as negative.
fn encode_integer(tag: u8, raw: u32, out: &mut [u8; 5]) -> usize {
    out[0] = 0;
    out[1..].copy_from_slice(&raw.to_be_bytes());
    let body = if tag == tag::INTEGER {
        canonicalize_integer(tag, &out[1..])
    } else {
        canonicalize_integer(tag, &out[..])
    };
    let len = body.len();
    let start = 5 - len;
    out.copy_within(start.., 0);
    len
}

/// Writer that builds a BER message front to back inside a bounded buffer.
#[derive(Debug, Clone)]
pub struct TlvWriter {
    buf: Vec<u8>,
    capacity: usize,
}

impl TlvWriter {
    /// Create a writer that refuses to grow beyond `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still available before the capacity is reached.
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Discard everything written.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Drop everything written after `len`.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    /// Freeze into immutable bytes.
    pub fn freeze(self) -> Bytes {
        Bytes::from(self.buf)
    }

    fn reserve(&self, additional: usize) -> Result<()> {
        if additional > self.remaining() {
            tracing::trace!(target: "usnmp::ber", { needed = additional, available = self.remaining() }, "write would exceed buffer capacity");
            return Err(Error::encode(EncodeErrorKind::CapacityExceeded {
                capacity: self.capacity,
            }));
        }
        Ok(())
    }

    /// Append raw, already-encoded bytes.
    pub fn put_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Append a primitive TLV.
    pub fn put_tlv(&mut self, tag: u8, value: &[u8]) -> Result<()> {
        let (len_buf, len_width) = encode_length(value.len())?;
        self.reserve(1 + len_width + value.len())?;
        self.buf.push(tag);
        self.buf.extend_from_slice(&len_buf[..len_width]);
        self.buf.extend_from_slice(value);
        Ok(())
    }

    /// Append a signed INTEGER in canonical form.
    pub fn put_integer(&mut self, value: i32) -> Result<()> {
        self.put_integer_family(tag::INTEGER, value as u32)
    }

    /// Append an unsigned integer-family value (Counter32, Gauge32, TimeTicks).
    pub fn put_unsigned(&mut self, tag: u8, value: u32) -> Result<()> {
        self.put_integer_family(tag, value)
    }

    fn put_integer_family(&mut self, tag: u8, raw: u32) -> Result<()> {
        let mut out = [0u8; 5];
        let len = encode_integer(tag, raw, &mut out);
        self.put_tlv(tag, &out[..len])
    }

    pub fn put_null(&mut self) -> Result<()> {
        self.put_tlv(tag::NULL, &[])
    }

    pub fn put_octet_string(&mut self, value: &[u8]) -> Result<()> {
        self.put_tlv(tag::OCTET_STRING, value)
    }

    pub fn put_oid(&mut self, oid: &Oid) -> Result<()> {
        let ber = oid.to_ber()?;
        self.put_tlv(tag::OBJECT_IDENTIFIER, &ber)
    }

    pub fn put_ip_address(&mut self, addr: [u8; 4]) -> Result<()> {
        self.put_tlv(tag::IP_ADDRESS, &addr)
    }

    /// Write a constructed TLV whose payload is produced by `f`.
    ///
    /// On error the writer is rolled back to where the TLV began.
    pub fn constructed<F, E>(&mut self, tag: u8, f: F) -> std::result::Result<(), E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        let start = self.buf.len();
        self.reserve(2)?;
        self.buf.push(tag);
        self.buf.push(0);
        let result = self.extend_at(start, f);
        if result.is_err() {
            self.buf.truncate(start);
        }
        result
    }

    /// Reopen the constructed TLV at `start` and append to its payload.
    ///
    /// The TLV must be the last element written. On error the payload is
    /// restored to what it was before the call.
    pub fn extend_at<F, E>(&mut self, start: usize, f: F) -> std::result::Result<(), E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        let mark = self.buf.len();
        let result = f(self).and_then(|()| self.backpatch(start).map_err(E::from));
        if result.is_err() {
            self.buf.truncate(mark);
        }
        result
    }

    /// Rewrite the length of the TLV at `start` to cover everything after its header.
    fn backpatch(&mut self, start: usize) -> Result<()> {
        let old_width = length_field_width(self.buf[start + 1]);
        let payload_start = start + 1 + old_width;
        let payload_len = self.buf.len() - payload_start;
        let (len_buf, new_width) = encode_length(payload_len)?;

        if new_width > old_width {
            self.reserve(new_width - old_width)?;
        }
        self.buf
            .splice(start + 1..payload_start, len_buf[..new_width].iter().copied());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integer_bytes(value: i32) -> Vec<u8> {
        let mut w = TlvWriter::new(16);
        w.put_integer(value).unwrap();
        w.as_slice().to_vec()
    }

    #[test]
    fn test_integer_canonical_forms() {
        assert_eq!(integer_bytes(0), [0x02, 0x01, 0x00]);
        assert_eq!(integer_bytes(-1), [0x02, 0x01, 0xFF]);
        assert_eq!(integer_bytes(128), [0x02, 0x02, 0x00, 0x80]);
        assert_eq!(integer_bytes(127), [0x02, 0x01, 0x7F]);
        assert_eq!(integer_bytes(-128), [0x02, 0x01, 0x80]);
        assert_eq!(integer_bytes(-129), [0x02, 0x02, 0xFF, 0x7F]);
        assert_eq!(
            integer_bytes(i32::MAX),
            [0x02, 0x04, 0x7F, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_unsigned_canonical_forms() {
        let mut w = TlvWriter::new(32);
        w.put_unsigned(tag::TIMETICKS, 0).unwrap();
        w.put_unsigned(tag::COUNTER32, 0x80).unwrap();
        w.put_unsigned(tag::GAUGE32, u32::MAX).unwrap();
        assert_eq!(
            w.as_slice(),
            [
                0x43, 0x01, 0x00, //
                0x41, 0x02, 0x00, 0x80, //
                0x42, 0x05, 0x00, 0xFF, 0xFF, 0xFF, 0xFF
            ]
        );
    }

    #[test]
    fn test_constructed_short_form() {
        let mut w = TlvWriter::new(64);
        w.constructed(tag::SEQUENCE, |w| {
            w.put_integer(1)?;
            w.put_null()
        })
        .unwrap();
        assert_eq!(w.as_slice(), [0x30, 0x05, 0x02, 0x01, 0x01, 0x05, 0x00]);
    }

    #[test]
    fn test_constructed_shifts_for_long_form() {
        let payload = vec![0xAB; 200];
        let mut w = TlvWriter::new(512);
        w.constructed(tag::SEQUENCE, |w| w.put_octet_string(&payload))
            .unwrap();
        let out = w.as_slice();
        assert_eq!(&out[..5], [0x30, 0x81, 0xCB, 0x04, 0x81]);
        assert_eq!(out[5], 200);
        assert_eq!(out.len(), 3 + 3 + 200);
        assert!(out[6..].iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn test_nested_backpatch_two_octet_form() {
        let payload = vec![0x11; 300];
        let mut w = TlvWriter::new(1024);
        w.constructed(tag::SEQUENCE, |w| {
            w.put_integer(0)?;
            w.constructed(tag::GET_RESPONSE, |w| w.put_octet_string(&payload))
        })
        .unwrap();
        let out = w.as_slice();
        // inner: A2 82 01 30 | 04 82 01 2C | payload
        assert_eq!(&out[..4], [0x30, 0x82, 0x01, 0x37]);
        assert_eq!(&out[4..7], [0x02, 0x01, 0x00]);
        assert_eq!(&out[7..11], [0xA2, 0x82, 0x01, 0x30]);
        assert_eq!(&out[11..15], [0x04, 0x82, 0x01, 0x2C]);
        assert_eq!(out.len(), 15 + 300);
    }

    #[test]
    fn test_capacity_exceeded_rolls_back() {
        let mut w = TlvWriter::new(10);
        w.put_integer(7).unwrap();
        let err = w
            .constructed(tag::SEQUENCE, |w| w.put_octet_string(b"too long for this"))
            .unwrap_err();
        assert!(err.is_capacity_exceeded());
        assert_eq!(w.as_slice(), [0x02, 0x01, 0x07]);
    }

    #[test]
    fn test_extend_at_grows_existing_sequence() {
        let mut w = TlvWriter::new(64);
        w.constructed(tag::SEQUENCE, |_| Ok::<(), Error>(())).unwrap();
        assert_eq!(w.as_slice(), [0x30, 0x00]);
        w.extend_at(0, |w| w.put_null()).unwrap();
        w.extend_at(0, |w| w.put_integer(3)).unwrap();
        assert_eq!(
            w.as_slice(),
            [0x30, 0x05, 0x05, 0x00, 0x02, 0x01, 0x03]
        );
    }

    #[test]
    fn test_extend_at_failure_keeps_previous_payload() {
        let mut w = TlvWriter::new(8);
        w.constructed(tag::SEQUENCE, |w| w.put_null()).unwrap();
        let err = w
            .extend_at(0, |w| w.put_octet_string(b"abcdef"))
            .unwrap_err();
        assert!(err.is_capacity_exceeded());
        assert_eq!(w.as_slice(), [0x30, 0x02, 0x05, 0x00]);
    }
}
