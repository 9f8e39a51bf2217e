//! Variable bindings.
//!
//! A [`VarBind`] pairs an OID with a value. A [`VarBindList`] is an encoded
//! `SEQUENCE OF SEQUENCE { OID, value }` held in a bounded buffer, built by
//! appending and read back with a [`VarBindIter`].
//!
//! ```
//! use usnmp::{Value, VarBindList, oid};
//!
//! let mut list = VarBindList::new();
//! list.append(&oid!(B, 1, 5, 0), &Value::from("router-1")).unwrap();
//! list.append(&oid!(B, 1, 3, 0), &Value::Null).unwrap();
//!
//! let oids: Vec<String> = list
//!     .iter()
//!     .map(|vb| vb.unwrap().oid.to_string())
//!     .collect();
//! assert_eq!(oids, ["B.1.5.0", "B.1.3.0"]);
//! ```

use crate::ber::{Decoder, TlvWriter, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use crate::value::Value;

/// Default capacity of a standalone varbind list.
pub const VARBIND_BUFFER_SIZE: usize = 256;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with a NULL value (for GET requests).
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Encode as `SEQUENCE { OID, value }`.
    pub fn encode(&self, w: &mut TlvWriter) -> Result<()> {
        w.constructed(tag::SEQUENCE, |w| {
            w.put_oid(&self.oid)?;
            self.value.encode(w)
        })
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Encoded varbind list with a fixed capacity.
#[derive(Debug, Clone)]
pub struct VarBindList {
    writer: TlvWriter,
    count: usize,
}

impl VarBindList {
    /// Create an empty list with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(VARBIND_BUFFER_SIZE)
    }

    /// Create an empty list that can hold `capacity` encoded bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut list = Self {
            writer: TlvWriter::new(capacity.max(2)),
            count: 0,
        };
        list.reset();
        list
    }

    /// Empty the list, leaving a zero-length SEQUENCE.
    pub fn reset(&mut self) {
        self.writer.clear();
        self.writer.put_raw(&[tag::SEQUENCE, 0x00]).ok();
        self.count = 0;
    }

    /// Append one varbind.
    ///
    /// Fails with a capacity error when the list is full. Earlier varbinds
    /// are kept.
    pub fn append(&mut self, oid: &Oid, value: &Value) -> Result<()> {
        self.writer.extend_at(0, |w| {
            w.constructed(tag::SEQUENCE, |w| {
                w.put_oid(oid)?;
                value.encode(w)
            })
        })?;
        self.count += 1;
        Ok(())
    }

    /// Append a [`VarBind`].
    pub fn push(&mut self, vb: &VarBind) -> Result<()> {
        self.append(&vb.oid, &vb.value)
    }

    /// Number of varbinds in the list.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The encoded SEQUENCE OF, header included.
    pub fn as_bytes(&self) -> &[u8] {
        self.writer.as_slice()
    }

    /// Iterate over the varbinds.
    pub fn iter(&self) -> VarBindIter<'_> {
        VarBindIter::new(self.as_bytes())
    }

    /// Decode all varbinds into a vector.
    pub fn to_vec(&self) -> Result<Vec<VarBind>> {
        self.iter().collect()
    }

    /// Take an encoded list from received bytes.
    ///
    /// `bytes` must be exactly one SEQUENCE. The varbinds inside are counted
    /// but not decoded.
    pub fn from_ber(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes);
        let mut items = dec.read_sequence()?;
        if !dec.is_empty() {
            return Err(Error::decode(dec.offset(), DecodeErrorKind::TrailingData));
        }
        let mut count = 0;
        while !items.is_empty() {
            items.read_tlv()?;
            count += 1;
        }
        let mut writer = TlvWriter::new(bytes.len().max(VARBIND_BUFFER_SIZE));
        writer.put_raw(bytes)?;
        Ok(Self { writer, count })
    }

    /// Wrap a writer that holds exactly one encoded SEQUENCE OF.
    pub(crate) fn from_writer(writer: TlvWriter, count: usize) -> Self {
        Self { writer, count }
    }
}

impl Default for VarBindList {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a VarBindList {
    type Item = Result<VarBind>;
    type IntoIter = VarBindIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

enum IterState<'a> {
    Start(Decoder<'a>),
    Items(Decoder<'a>),
    Done,
}

/// Single-pass cursor over an encoded varbind list.
///
/// The first item reads the outer SEQUENCE OF header. After the first
/// error the iterator is exhausted.
pub struct VarBindIter<'a> {
    state: IterState<'a>,
}

impl<'a> VarBindIter<'a> {
    /// Iterate over an encoded `SEQUENCE OF` varbind list.
    pub fn new(list: &'a [u8]) -> Self {
        Self {
            state: IterState::Start(Decoder::new(list)),
        }
    }

    fn read_one(items: &mut Decoder<'a>) -> Result<VarBind> {
        let start = items.offset();
        let malformed = |_: Error| {
            tracing::debug!(target: "usnmp::ber", { snmp.offset = %start }, "malformed varbind");
            Error::decode(start, DecodeErrorKind::MalformedVarbind)
        };
        let mut seq = items.read_sequence().map_err(malformed)?;
        let oid = seq.read_oid().map_err(|e| match e {
            Error::Decode {
                kind: DecodeErrorKind::InvalidOid(_),
                ..
            } => e,
            other => malformed(other),
        })?;
        if seq.is_empty() {
            return Err(malformed(Error::decode(seq.offset(), DecodeErrorKind::TruncatedData)));
        }
        let value = Value::decode(&mut seq)?;
        if !seq.is_empty() {
            return Err(malformed(Error::decode(seq.offset(), DecodeErrorKind::TrailingData)));
        }
        Ok(VarBind { oid, value })
    }
}

impl Iterator for VarBindIter<'_> {
    type Item = Result<VarBind>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, IterState::Done) {
                IterState::Start(mut dec) => match dec.read_sequence() {
                    Ok(items) => self.state = IterState::Items(items),
                    Err(e) => return Some(Err(e)),
                },
                IterState::Items(mut items) => {
                    if items.is_empty() {
                        return None;
                    }
                    let item = Self::read_one(&mut items);
                    if item.is_ok() {
                        self.state = IterState::Items(items);
                    }
                    return Some(item);
                }
                IterState::Done => return None,
            }
        }
    }
}

impl std::iter::FusedIterator for VarBindIter<'_> {}
