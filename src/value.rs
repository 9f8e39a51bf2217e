//! SNMPv1 value types.
//!
//! [`Value`] is the typed payload of a varbind or MIB entry. [`DataType`]
//! names a value's type without carrying data; MIB entries use it to
//! declare what a SET must supply.

use crate::ber::{Decoder, TlvWriter, decode_integer, decode_unsigned, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::format::hex;
use crate::oid::Oid;
use bytes::Bytes;

/// Type of an SNMPv1 value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Null,
    Integer,
    OctetString,
    ObjectIdentifier,
    IpAddress,
    Counter32,
    Gauge32,
    TimeTicks,
    Opaque,
}

impl DataType {
    /// BER tag for this type.
    pub fn tag(self) -> u8 {
        match self {
            DataType::Null => tag::NULL,
            DataType::Integer => tag::INTEGER,
            DataType::OctetString => tag::OCTET_STRING,
            DataType::ObjectIdentifier => tag::OBJECT_IDENTIFIER,
            DataType::IpAddress => tag::IP_ADDRESS,
            DataType::Counter32 => tag::COUNTER32,
            DataType::Gauge32 => tag::GAUGE32,
            DataType::TimeTicks => tag::TIMETICKS,
            DataType::Opaque => tag::OPAQUE,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            tag::NULL => DataType::Null,
            tag::INTEGER => DataType::Integer,
            tag::OCTET_STRING => DataType::OctetString,
            tag::OBJECT_IDENTIFIER => DataType::ObjectIdentifier,
            tag::IP_ADDRESS => DataType::IpAddress,
            tag::COUNTER32 => DataType::Counter32,
            tag::GAUGE32 => DataType::Gauge32,
            tag::TIMETICKS => DataType::TimeTicks,
            tag::OPAQUE => DataType::Opaque,
            _ => return None,
        })
    }

    /// Single-letter code used by the MIB dump and the command-line tools.
    pub fn letter(self) -> char {
        match self {
            DataType::Null => 'N',
            DataType::Integer => 'I',
            DataType::OctetString => 'S',
            DataType::ObjectIdentifier => 'O',
            DataType::IpAddress => 'A',
            DataType::Counter32 => 'C',
            DataType::Gauge32 => 'G',
            DataType::TimeTicks => 'T',
            DataType::Opaque => 'Q',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        Some(match c {
            'N' => DataType::Null,
            'I' => DataType::Integer,
            'S' => DataType::OctetString,
            'O' => DataType::ObjectIdentifier,
            'A' => DataType::IpAddress,
            'C' => DataType::Counter32,
            'G' => DataType::Gauge32,
            'T' => DataType::TimeTicks,
            'Q' => DataType::Opaque,
            _ => return None,
        })
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::Null => "NULL",
            DataType::Integer => "INTEGER",
            DataType::OctetString => "OCTET STRING",
            DataType::ObjectIdentifier => "OBJECT IDENTIFIER",
            DataType::IpAddress => "IpAddress",
            DataType::Counter32 => "Counter",
            DataType::Gauge32 => "Gauge",
            DataType::TimeTicks => "TimeTicks",
            DataType::Opaque => "Opaque",
        };
        f.write_str(name)
    }
}

/// SNMPv1 value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// NULL, the placeholder value of GET and GET-NEXT requests.
    Null,
    /// INTEGER (signed 32-bit).
    Integer(i32),
    /// OCTET STRING.
    OctetString(Bytes),
    /// OBJECT IDENTIFIER.
    ObjectIdentifier(Oid),
    /// IpAddress (4 bytes, network order).
    IpAddress([u8; 4]),
    /// Counter (unsigned 32-bit, wrapping).
    Counter32(u32),
    /// Gauge (unsigned 32-bit).
    Gauge32(u32),
    /// TimeTicks (hundredths of a second).
    TimeTicks(u32),
    /// Opaque (arbitrary BER passed through).
    Opaque(Bytes),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Integer(_) => DataType::Integer,
            Value::OctetString(_) => DataType::OctetString,
            Value::ObjectIdentifier(_) => DataType::ObjectIdentifier,
            Value::IpAddress(_) => DataType::IpAddress,
            Value::Counter32(_) => DataType::Counter32,
            Value::Gauge32(_) => DataType::Gauge32,
            Value::TimeTicks(_) => DataType::TimeTicks,
            Value::Opaque(_) => DataType::Opaque,
        }
    }

    /// BER tag of this value.
    pub fn tag(&self) -> u8 {
        self.data_type().tag()
    }

    /// Try to get as i32.
    ///
    /// ```
    /// use usnmp::Value;
    ///
    /// assert_eq!(Value::Integer(-5).as_i32(), Some(-5));
    /// assert_eq!(Value::Counter32(5).as_i32(), None);
    /// ```
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u32 (Counter32, Gauge32, TimeTicks, or a non-negative Integer).
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v),
            Value::Integer(v) if *v >= 0 => Some(*v as u32),
            _ => None,
        }
    }

    /// Try to get the raw bytes of an OctetString or Opaque.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(v) | Value::Opaque(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get an OctetString as UTF-8 text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::OctetString(v) => std::str::from_utf8(v).ok(),
            _ => None,
        }
    }

    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    pub fn as_ip(&self) -> Option<std::net::Ipv4Addr> {
        match self {
            Value::IpAddress(addr) => Some(std::net::Ipv4Addr::from(*addr)),
            _ => None,
        }
    }

    /// Encode as a complete TLV.
    pub fn encode(&self, w: &mut TlvWriter) -> Result<()> {
        match self {
            Value::Null => w.put_null(),
            Value::Integer(v) => w.put_integer(*v),
            Value::OctetString(data) => w.put_octet_string(data),
            Value::ObjectIdentifier(oid) => w.put_oid(oid),
            Value::IpAddress(addr) => w.put_ip_address(*addr),
            Value::Counter32(v) => w.put_unsigned(tag::COUNTER32, *v),
            Value::Gauge32(v) => w.put_unsigned(tag::GAUGE32, *v),
            Value::TimeTicks(v) => w.put_unsigned(tag::TIMETICKS, *v),
            Value::Opaque(data) => w.put_tlv(tag::OPAQUE, data),
        }
    }

    /// Decode a value from its tag and content bytes.
    ///
    /// `offset` is the position of `data` in the message, used for errors.
    pub fn from_tlv(tag: u8, data: &[u8], offset: usize) -> Result<Self> {
        let bad_length = || {
            tracing::debug!(target: "usnmp::ber", { snmp.offset = %offset, tag = tag, length = data.len() }, "invalid length for value type");
            Error::decode(
                offset,
                DecodeErrorKind::InvalidLength {
                    tag,
                    length: data.len(),
                },
            )
        };
        match tag {
            tag::NULL if data.is_empty() => Ok(Value::Null),
            tag::NULL => Err(bad_length()),
            tag::INTEGER => decode_integer(data, offset).map(Value::Integer),
            tag::OCTET_STRING => Ok(Value::OctetString(Bytes::copy_from_slice(data))),
            tag::OBJECT_IDENTIFIER => Oid::from_ber(data)
                .map(Value::ObjectIdentifier)
                .map_err(|e| match e {
                    Error::InvalidOid { kind, .. } => {
                        Error::decode(offset, DecodeErrorKind::InvalidOid(kind))
                    }
                    other => other,
                }),
            tag::IP_ADDRESS => data
                .try_into()
                .map(Value::IpAddress)
                .map_err(|_| bad_length()),
            tag::COUNTER32 => decode_unsigned(data, offset).map(Value::Counter32),
            tag::GAUGE32 => decode_unsigned(data, offset).map(Value::Gauge32),
            tag::TIMETICKS => decode_unsigned(data, offset).map(Value::TimeTicks),
            tag::OPAQUE => Ok(Value::Opaque(Bytes::copy_from_slice(data))),
            other => {
                tracing::debug!(target: "usnmp::ber", { snmp.offset = %offset, tag = other }, "invalid data type");
                Err(Error::decode(
                    offset,
                    DecodeErrorKind::InvalidDataType { tag: other },
                ))
            }
        }
    }

    /// Read the next TLV from a decoder as a value.
    pub fn decode(decoder: &mut Decoder<'_>) -> Result<Self> {
        let tlv = decoder.read_tlv()?;
        Self::from_tlv(tlv.tag, decoder.value(&tlv), tlv.value_start)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(data) => {
                if hex::is_printable(data) {
                    write!(f, "{}", String::from_utf8_lossy(data))
                } else {
                    write!(f, "{}", hex::encode_dashed(data))
                }
            }
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress(addr) => {
                write!(f, "{}.{}.{}.{}", addr[0], addr[1], addr[2], addr[3])
            }
            Value::Counter32(v) => write!(f, "{}", v),
            Value::Gauge32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => {
                let secs = v / 100;
                let days = secs / 86400;
                let hours = (secs % 86400) / 3600;
                let mins = (secs % 3600) / 60;
                let s = secs % 60;
                write!(f, "{}d {}h {}m {}s", days, hours, mins, s)
            }
            Value::Opaque(data) => write!(f, "Opaque({})", hex::Bytes(data)),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(Bytes::from(s))
    }
}

impl From<&[u8]> for Value {
    fn from(data: &[u8]) -> Self {
        Value::OctetString(Bytes::copy_from_slice(data))
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

impl From<std::net::Ipv4Addr> for Value {
    fn from(addr: std::net::Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    fn encode(value: &Value) -> Vec<u8> {
        let mut w = TlvWriter::new(64);
        value.encode(&mut w).unwrap();
        w.as_slice().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Value> {
        Value::decode(&mut Decoder::new(bytes))
    }

    #[test]
    fn test_integer_encoding_is_canonical() {
        assert_eq!(encode(&Value::Integer(0)), [0x02, 0x01, 0x00]);
        assert_eq!(encode(&Value::Integer(-1)), [0x02, 0x01, 0xFF]);
        assert_eq!(encode(&Value::Integer(128)), [0x02, 0x02, 0x00, 0x80]);
    }

    #[test]
    fn test_unsigned_high_bit_gets_pad() {
        assert_eq!(
            encode(&Value::TimeTicks(0x8000_0000)),
            [0x43, 0x05, 0x00, 0x80, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            decode(&[0x43, 0x05, 0x00, 0x80, 0x00, 0x00, 0x00]).unwrap(),
            Value::TimeTicks(0x8000_0000)
        );
    }

    #[test]
    fn test_unsigned_is_not_sign_extended() {
        assert_eq!(decode(&[0x41, 0x01, 0xFF]).unwrap(), Value::Counter32(255));
        assert_eq!(decode(&[0x02, 0x01, 0xFF]).unwrap(), Value::Integer(-1));
    }

    #[test]
    fn test_decode_length_rules() {
        assert!(decode(&[0x05, 0x01, 0x00]).is_err());
        assert!(decode(&[0x40, 0x03, 1, 2, 3]).is_err());
        assert!(decode(&[0x02, 0x05, 0, 0, 0, 0, 1]).is_err());
        assert!(decode(&[0x02, 0x00]).is_err());
    }

    #[test]
    fn test_decode_unknown_tag() {
        let err = decode(&[0x46, 0x01, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::InvalidDataType { tag: 0x46 },
                ..
            }
        ));
    }

    #[test]
    fn test_decode_oid_value() {
        let bytes = encode(&Value::ObjectIdentifier(oid!(P, 38644, 30)));
        assert_eq!(
            decode(&bytes).unwrap(),
            Value::ObjectIdentifier(oid!(P, 38644, 30))
        );
    }

    #[test]
    fn test_data_type_letters() {
        for c in ['N', 'I', 'S', 'O', 'A', 'C', 'G', 'T'] {
            assert_eq!(DataType::from_letter(c).unwrap().letter(), c);
        }
        assert_eq!(DataType::from_letter('Z'), None);
        assert_eq!(DataType::from_tag(0x43), Some(DataType::TimeTicks));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("router-1").to_string(), "router-1");
        assert_eq!(Value::from(&[0x00u8, 0x1a][..]).to_string(), "00-1a");
        assert_eq!(Value::TimeTicks(360_000).to_string(), "0d 1h 0m 0s");
        assert_eq!(Value::IpAddress([10, 0, 0, 1]).to_string(), "10.0.0.1");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Gauge32(7).as_u32(), Some(7));
        assert_eq!(Value::Integer(-7).as_u32(), None);
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(
            Value::IpAddress([127, 0, 0, 1]).as_ip(),
            Some(std::net::Ipv4Addr::LOCALHOST)
        );
    }
}
