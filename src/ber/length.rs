//! BER length encoding and decoding.
//!
//! - Short form: single byte, bit 8 = 0, value 0-127
//! - Long form: initial byte (bit 8 = 1, bits 7-1 = count), followed by the
//!   big-endian length bytes
//! - Indefinite form (0x80): rejected
//!
//! SNMPv1 messages are bounded by fixed buffers, so encoding stops at the
//! two-octet long form.

use crate::error::{DecodeErrorKind, EncodeErrorKind, Error, Result};

/// Largest length [`encode_length`] accepts.
pub const MAX_LENGTH: usize = 0xFFFF;

/// Encode a length, returning the bytes in wire order and how many are used.
pub fn encode_length(len: usize) -> Result<([u8; 3], usize)> {
    if len < 0x80 {
        Ok(([len as u8, 0, 0], 1))
    } else if len <= 0xFF {
        Ok(([0x81, len as u8, 0], 2))
    } else if len <= MAX_LENGTH {
        Ok(([0x82, (len >> 8) as u8, len as u8], 3))
    } else {
        Err(Error::encode(EncodeErrorKind::LengthTooLarge { length: len }))
    }
}

/// Width in bytes of the length field whose first byte is `first`.
pub fn length_field_width(first: u8) -> usize {
    if first & 0x80 == 0 {
        1
    } else {
        1 + (first & 0x7F) as usize
    }
}

/// Decode a length from bytes, returning `(length, bytes_consumed)`.
///
/// The `base_offset` parameter is used to report error offsets correctly
/// when this is called from within a decoder.
pub fn decode_length(data: &[u8], base_offset: usize) -> Result<(usize, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    if first == 0x80 {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::IndefiniteLength,
        ));
    }

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let num_octets = (first & 0x7F) as usize;
    if num_octets > 4 {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthTooLong { octets: num_octets },
        ));
    }
    if data.len() < 1 + num_octets {
        return Err(Error::decode(base_offset, DecodeErrorKind::MalformedLength));
    }

    let len = data[1..=num_octets]
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);

    Ok((len, 1 + num_octets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form() {
        assert_eq!(decode_length(&[0], 0).unwrap(), (0, 1));
        assert_eq!(decode_length(&[127], 0).unwrap(), (127, 1));
    }

    #[test]
    fn test_long_form() {
        assert_eq!(decode_length(&[0x81, 128], 0).unwrap(), (128, 2));
        assert_eq!(decode_length(&[0x82, 0x01, 0x00], 0).unwrap(), (256, 3));
        assert_eq!(decode_length(&[0x82, 0x04, 0xB0], 0).unwrap(), (1200, 3));
    }

    #[test]
    fn test_claimed_bytes_exceed_buffer() {
        let err = decode_length(&[0x82, 0x01], 5).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 5,
                kind: DecodeErrorKind::MalformedLength
            }
        ));
    }

    #[test]
    fn test_indefinite_rejected() {
        assert!(decode_length(&[0x80], 0).is_err());
    }

    #[test]
    fn test_too_many_octets() {
        let err = decode_length(&[0x85, 1, 2, 3, 4, 5], 0).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::LengthTooLong { octets: 5 },
                ..
            }
        ));
    }

    #[test]
    fn test_encode_widths() {
        assert_eq!(encode_length(0).unwrap(), ([0, 0, 0], 1));
        assert_eq!(encode_length(0x7F).unwrap(), ([0x7F, 0, 0], 1));
        assert_eq!(encode_length(0x80).unwrap(), ([0x81, 0x80, 0], 2));
        assert_eq!(encode_length(0xFF).unwrap(), ([0x81, 0xFF, 0], 2));
        assert_eq!(encode_length(0x100).unwrap(), ([0x82, 0x01, 0x00], 3));
        assert!(encode_length(0x10000).is_err());
    }

    #[test]
    fn test_field_width() {
        assert_eq!(length_field_width(0x05), 1);
        assert_eq!(length_field_width(0x81), 2);
        assert_eq!(length_field_width(0x82), 3);
    }
}
