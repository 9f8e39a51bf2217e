//! Error types for usnmp.
//!
//! - [`Error`] - the error type for all library operations
//! - [`ErrorStatus`] - SNMPv1 error-status codes carried in a response PDU
//! - kind enums ([`DecodeErrorKind`], [`EncodeErrorKind`], [`OidErrorKind`]) that
//!   describe *what* went wrong at the codec level
//!
//! The protocol engine separates three failure classes. Structural failures
//! (malformed BER, wrong tags, bad version) surface as [`Error::Decode`] and
//! produce no reply. Authorization failures surface as
//! [`Error::InvalidCommunity`]. Per-varbind protocol failures never become an
//! `Error` inside the engine: they are encoded into the reply as an
//! error-status/error-index pair. A manager that receives such a reply sees it
//! as [`Error::Snmp`].
//!
//! # Example
//!
//! ```
//! use usnmp::{Error, ErrorStatus};
//!
//! let err = Error::Snmp { status: ErrorStatus::NoSuchName, index: 2 };
//! assert_eq!(err.to_string(), "SNMP error: noSuchName at index 2");
//! ```

use std::net::SocketAddr;

use bytes::Bytes;

/// Result type alias using the library's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// BER decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// Expected a different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Data ended before the TLV was complete.
    TruncatedData,
    /// Length field claims more bytes than the buffer holds.
    MalformedLength,
    /// Indefinite length (0x80) is not used by SNMP.
    IndefiniteLength,
    /// Long-form length uses more octets than supported.
    LengthTooLong { octets: usize },
    /// Value length is invalid for its type.
    InvalidLength { tag: u8, length: usize },
    /// Tag does not name a value type this engine understands.
    InvalidDataType { tag: u8 },
    /// Integer is zero-length or wider than 32 bits.
    InvalidInteger,
    /// Message version is not SNMPv1.
    UnknownVersion(i32),
    /// Community string longer than the engine accepts.
    CommunityTooLong { length: usize },
    /// PDU tag not valid in this position.
    UnexpectedPduType(u8),
    /// Varbind is not `SEQUENCE { OID, value }`.
    MalformedVarbind,
    /// Request carried a non-zero error-status or error-index.
    NonZeroErrorField,
    /// Embedded OID could not be decoded.
    InvalidOid(OidErrorKind),
    /// Bytes remain after the outermost TLV.
    TrailingData,
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::TruncatedData => write!(f, "unexpected end of data"),
            Self::MalformedLength => write!(f, "length exceeds available data"),
            Self::IndefiniteLength => write!(f, "indefinite length encoding not supported"),
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({} octets)", octets)
            }
            Self::InvalidLength { tag, length } => {
                write!(f, "invalid length {} for tag 0x{:02X}", length, tag)
            }
            Self::InvalidDataType { tag } => write!(f, "invalid data type 0x{:02X}", tag),
            Self::InvalidInteger => write!(f, "invalid integer encoding"),
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version: {}", v),
            Self::CommunityTooLong { length } => {
                write!(f, "community string too long ({} bytes)", length)
            }
            Self::UnexpectedPduType(tag) => write!(f, "unexpected PDU type 0x{:02X}", tag),
            Self::MalformedVarbind => write!(f, "malformed varbind"),
            Self::NonZeroErrorField => write!(f, "request has non-zero error fields"),
            Self::InvalidOid(kind) => write!(f, "invalid OID: {}", kind),
            Self::TrailingData => write!(f, "trailing data after message"),
        }
    }
}

/// BER encode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeErrorKind {
    /// Writing would exceed the buffer's fixed capacity.
    CapacityExceeded { capacity: usize },
    /// Length does not fit the two-octet long form.
    LengthTooLarge { length: usize },
    /// OID cannot be encoded (unknown root or too many elements).
    InvalidOid(OidErrorKind),
    /// Community string longer than the protocol limit.
    CommunityTooLong { length: usize },
}

impl std::fmt::Display for EncodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityExceeded { capacity } => {
                write!(f, "buffer capacity of {} bytes exceeded", capacity)
            }
            Self::LengthTooLarge { length } => write!(f, "length {} too large to encode", length),
            Self::InvalidOid(kind) => write!(f, "cannot encode OID: {}", kind),
            Self::CommunityTooLong { length } => {
                write!(f, "community of {} bytes is too long", length)
            }
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OidErrorKind {
    /// Text or BER does not start with one of the supported roots.
    UnknownRoot,
    /// Arc is not a valid unsigned 32-bit number.
    InvalidArc,
    /// Too many elements.
    TooManyArcs { count: usize, max: usize },
    /// Subidentifier overflows u32.
    SubidentifierOverflow,
    /// Subidentifier ends with the continuation bit set.
    TruncatedSubidentifier,
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRoot => write!(f, "unknown OID root"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} elements, maximum is {}", count, max)
            }
            Self::SubidentifierOverflow => write!(f, "subidentifier overflow"),
            Self::TruncatedSubidentifier => write!(f, "truncated subidentifier"),
        }
    }
}

/// SNMPv1 error status codes.
///
/// # Example
///
/// ```
/// use usnmp::ErrorStatus;
///
/// let status = ErrorStatus::from_i32(2);
/// assert_eq!(status, ErrorStatus::NoSuchName);
/// assert_eq!(status.as_i32(), 2);
/// assert_eq!(status.to_string(), "noSuchName");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    /// Operation completed successfully (status = 0).
    NoError,
    /// Response would not fit the response buffer (status = 1).
    TooBig,
    /// Requested OID not found, or end of MIB reached (status = 2).
    NoSuchName,
    /// Value has the wrong type or encoding (status = 3).
    BadValue,
    /// Attempted to SET a read-only object (status = 4).
    ReadOnly,
    /// Unspecified error (status = 5).
    GenErr,
    /// Code outside the SNMPv1 range.
    Other(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            other => Self::Other(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::Other(code) => *code,
        }
    }

    pub fn is_error(&self) -> bool {
        *self != Self::NoError
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::Other(code) => write!(f, "unknown({})", code),
        }
    }
}

/// The main error type for all usnmp operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Socket or file I/O failed.
    #[error("I/O error{}: {source}", target.map(|t| format!(" communicating with {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// BER decoding failed.
    #[error("decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// BER encoding failed.
    #[error("encode error: {kind}")]
    Encode { kind: EncodeErrorKind },

    /// OID text could not be parsed.
    #[error("invalid OID{}: {kind}", input.as_ref().map(|s| format!(" '{}'", s)).unwrap_or_default())]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>,
    },

    /// A response carried a non-zero error-status.
    #[error("SNMP error: {status} at index {index}")]
    Snmp { status: ErrorStatus, index: u32 },

    /// Community string rejected for the requested operation.
    #[error("community {:?} not authorized", String::from_utf8_lossy(community))]
    InvalidCommunity { community: Bytes },

    /// Response request-id does not match the request.
    #[error("request ID mismatch: expected {expected}, got {actual}")]
    RequestIdMismatch { expected: i32, actual: i32 },

    /// No response within the configured timeout.
    #[error("timeout waiting for {target}")]
    Timeout { target: SocketAddr },

    /// Message exceeds the fixed buffer size.
    #[error("message too large: {size} bytes exceeds maximum {max}")]
    MessageTooLarge { size: usize, max: usize },

    /// A MIB entry with this OID already exists.
    #[error("duplicate MIB entry {oid}")]
    DuplicateOid { oid: crate::oid::Oid },

    /// A MIB dump line could not be parsed.
    #[error("MIB dump line {line}: {reason}")]
    MibFormat { line: usize, reason: Box<str> },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    /// Create an encode error.
    pub fn encode(kind: EncodeErrorKind) -> Self {
        Self::Encode { kind }
    }

    /// Create an invalid OID error.
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Create an I/O error, optionally tagged with the peer.
    pub fn io(target: Option<SocketAddr>, source: std::io::Error) -> Self {
        Self::Io { target, source }
    }

    /// Whether this error means the reply buffer ran out of room.
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(
            self,
            Self::Encode {
                kind: EncodeErrorKind::CapacityExceeded { .. }
            }
        )
    }
}
