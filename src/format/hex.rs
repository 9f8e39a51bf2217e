//! Hexadecimal encoding and decoding utilities.

use std::fmt;

/// Encode bytes as lowercase hex with no separator.
///
/// ```
/// use usnmp::format::hex::encode;
///
/// assert_eq!(encode(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
/// ```
pub fn encode(bytes: &[u8]) -> String {
    Bytes(bytes).to_string()
}

/// Encode bytes as lowercase hex pairs joined by `-`.
///
/// ```
/// use usnmp::format::hex::encode_dashed;
///
/// assert_eq!(encode_dashed(&[0x00, 0x1a, 0xff]), "00-1a-ff");
/// assert_eq!(encode_dashed(&[]), "");
/// ```
pub fn encode_dashed(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join("-")
}

/// Decode dash-separated hex pairs. Digits may be upper or lower case.
///
/// An empty string decodes to an empty octet string.
pub fn decode_dashed(s: &str) -> Result<Vec<u8>, DecodeError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split('-')
        .map(|pair| {
            if pair.len() != 2 {
                return Err(DecodeError::BadPair);
            }
            u8::from_str_radix(pair, 16).map_err(|_| DecodeError::InvalidChar)
        })
        .collect()
}

/// True when every byte is printable ASCII (space through `~`).
pub fn is_printable(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| (0x20..=0x7E).contains(b))
}

/// Error type for hex decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Group is not exactly two hex digits.
    BadPair,
    /// Invalid hexadecimal character.
    InvalidChar,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadPair => write!(f, "expected two hex digits per octet"),
            Self::InvalidChar => write!(f, "invalid hex digit"),
        }
    }
}

/// Hex view of a byte slice that formats on display, for log fields.
///
/// ```
/// use usnmp::format::hex::Bytes;
///
/// let data = [0xde, 0xad, 0xbe, 0xef];
/// assert_eq!(format!("{}", Bytes(&data)), "deadbeef");
/// ```
pub struct Bytes<'a>(pub &'a [u8]);

impl fmt::Debug for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Display for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_display() {
        assert_eq!(format!("{}", Bytes(&[0x00, 0xff, 0x42])), "00ff42");
        assert_eq!(format!("{}", Bytes(&[])), "");
    }

    #[test]
    fn test_encode_dashed() {
        assert_eq!(encode_dashed(b"Hello"), "48-65-6c-6c-6f");
        assert_eq!(encode_dashed(&[0x0f]), "0f");
    }

    #[test]
    fn test_decode_dashed_mixed_case() {
        assert_eq!(
            decode_dashed("DE-ad-Be-ef").unwrap(),
            vec![0xde, 0xad, 0xbe, 0xef]
        );
        assert_eq!(decode_dashed("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_dashed_errors() {
        assert_eq!(decode_dashed("1"), Err(DecodeError::BadPair));
        assert_eq!(decode_dashed("12-345"), Err(DecodeError::BadPair));
        assert_eq!(decode_dashed("12-"), Err(DecodeError::BadPair));
        assert_eq!(decode_dashed("gg"), Err(DecodeError::InvalidChar));
    }

    #[test]
    fn test_is_printable() {
        assert!(is_printable(b"public ~"));
        assert!(!is_printable(&[0x41, 0x00]));
        assert!(is_printable(&[]));
    }
}
