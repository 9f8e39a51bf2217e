//! Request engine.
//!
//! [`process`] turns one request message into one reply message in a single
//! pass. The request is walked with a [`Decoder`] while the reply is written
//! with a [`TlvWriter`]; each reply layer is a scoped TLV whose length is
//! fixed once its contents are known.
//!
//! Outcomes:
//!
//! | Request | Result |
//! |---|---|
//! | well formed, every varbind succeeds | `Ok(Reply)` with a GetResponse |
//! | varbind `k` fails | `Ok(Reply)` echoing the request PDU with error-status and error-index `k` |
//! | malformed framing, wrong version, non-request PDU | `Err(Error::Decode)`, send nothing |
//! | community rejected | `Err(Error::InvalidCommunity)`, send nothing |
//!
//! # Example
//!
//! ```
//! use usnmp::engine::{Communities, process};
//! use usnmp::message::{parse_response, wrap};
//! use usnmp::mib::{Access, MibEntry, MibStore};
//! use usnmp::pdu::{PduType, build_request};
//! use usnmp::{Value, VarBindList, oid};
//!
//! let mut mib = MibStore::new();
//! mib.insert(MibEntry::new(oid!(B, 1, 5, 0), Value::from("gw"), Access::ReadWrite)).unwrap();
//!
//! let mut list = VarBindList::new();
//! list.append(&oid!(B, 1, 5, 0), &Value::Null).unwrap();
//! let pdu = build_request(PduType::GetRequest, 1, Some(&list)).unwrap();
//! let request = wrap(b"public", &pdu).unwrap();
//!
//! let reply = process(&request, &mut mib, &Communities::default()).unwrap();
//! let response = parse_response(&reply.message).unwrap();
//! let vb = response.varbinds.iter().next().unwrap().unwrap();
//! assert_eq!(vb.value, Value::from("gw"));
//! ```

mod auth;

pub use auth::{AllowAll, Authenticator, Communities};

use bytes::Bytes;

use crate::ber::{Decoder, Tlv, TlvWriter, decode_integer, tag};
use crate::error::{DecodeErrorKind, Error, ErrorStatus, Result};
use crate::message::Envelope;
use crate::mib::MibStore;
use crate::oid::{Oid, Root};
use crate::pdu::{PduType, REQUEST_BUFFER_SIZE, RESPONSE_BUFFER_SIZE};
use crate::value::Value;
use crate::varbind::{VARBIND_BUFFER_SIZE, VarBindList};

/// Reply produced for a request.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Encoded GetResponse message.
    pub message: Bytes,
    /// Type of the request that was answered.
    pub request_type: PduType,
    pub error_status: ErrorStatus,
    /// 1-based index of the failing varbind, 0 on success.
    pub error_index: u32,
}

impl Reply {
    pub fn is_error(&self) -> bool {
        self.error_status.is_error()
    }
}

/// Why varbind processing stopped.
#[derive(Debug)]
enum Halt {
    /// A varbind failed; answer with this status and index.
    VarBind { status: ErrorStatus, index: u32 },
    /// Not answerable.
    Fatal(Error),
}

impl From<Error> for Halt {
    fn from(e: Error) -> Self {
        Halt::Fatal(e)
    }
}

/// Raw pieces of one request varbind.
struct RawVarBind<'a> {
    /// The whole `SEQUENCE { name, value }`.
    whole: &'a [u8],
    /// The name TLV.
    name: &'a [u8],
    /// Contents of the name TLV.
    name_ber: &'a [u8],
    /// `None` when the name is outside the three roots or too long.
    oid: Option<Oid>,
    value: Tlv,
    value_bytes: &'a [u8],
}

impl RawVarBind<'_> {
    fn is_null(&self) -> bool {
        self.value.tag == tag::NULL && self.value.len == 0
    }

    fn decode_value(&self) -> Result<Value> {
        Value::from_tlv(self.value.tag, self.value_bytes, self.value.value_start)
    }
}

/// Read the next varbind, classifying failures as SNMP error-status codes.
fn read_varbind<'a>(items: &mut Decoder<'a>) -> std::result::Result<RawVarBind<'a>, ErrorStatus> {
    let seq = items.read_tlv().map_err(|_| ErrorStatus::GenErr)?;
    if seq.tag != tag::SEQUENCE {
        return Err(ErrorStatus::GenErr);
    }
    let mut inner = items.enter(&seq);
    let name = inner.read_tlv().map_err(|_| ErrorStatus::GenErr)?;
    if name.tag != tag::OBJECT_IDENTIFIER {
        return Err(ErrorStatus::BadValue);
    }
    let name_ber = inner.value(&name);
    let oid = Oid::from_ber(name_ber).ok();
    let value = inner.read_tlv().map_err(|_| ErrorStatus::GenErr)?;
    if !inner.is_empty() {
        return Err(ErrorStatus::GenErr);
    }
    Ok(RawVarBind {
        whole: items.raw(&seq),
        name: items.raw(&name),
        name_ber,
        oid,
        value,
        value_bytes: items.value(&value),
    })
}

/// Run every varbind of `items` against the MIB, writing reply varbinds to `w`.
///
/// `w` must be positioned inside the reply's SEQUENCE OF.
fn run_varbinds(
    pdu_type: PduType,
    mut items: Decoder<'_>,
    mib: &mut MibStore,
    w: &mut TlvWriter,
) -> std::result::Result<u32, Halt> {
    let mut index = 0u32;
    while !items.is_empty() {
        index += 1;
        let fail = |status: ErrorStatus| Halt::VarBind { status, index };
        let write_fail = |e: Error| {
            if e.is_capacity_exceeded() {
                Halt::VarBind {
                    status: ErrorStatus::TooBig,
                    index,
                }
            } else {
                Halt::Fatal(e)
            }
        };

        let vb = read_varbind(&mut items).map_err(fail)?;
        match pdu_type {
            PduType::GetRequest => {
                let entry = vb
                    .oid
                    .as_ref()
                    .and_then(|oid| mib.get(oid))
                    .ok_or(fail(ErrorStatus::NoSuchName))?;
                if !vb.is_null() {
                    return Err(fail(ErrorStatus::BadValue));
                }
                let value = entry.read().map_err(fail)?;
                if value == Value::Null {
                    return Err(fail(ErrorStatus::GenErr));
                }
                w.constructed(tag::SEQUENCE, |w| {
                    w.put_raw(vb.name)?;
                    value.encode(w)
                })
                .map_err(write_fail)?;
            }
            PduType::GetNextRequest => {
                let entry = match &vb.oid {
                    Some(oid) => mib.get_next(oid),
                    // an unrepresentable name before a root continues at that root
                    None => Root::following(vb.name_ber)
                        .and_then(|root| mib.get_at_or_after(&Oid::from_slice(root, &[]))),
                }
                .ok_or(fail(ErrorStatus::NoSuchName))?;
                if !vb.is_null() {
                    return Err(fail(ErrorStatus::BadValue));
                }
                let value = entry.read().map_err(fail)?;
                if value == Value::Null {
                    return Err(fail(ErrorStatus::GenErr));
                }
                w.constructed(tag::SEQUENCE, |w| {
                    w.put_oid(entry.oid())?;
                    value.encode(w)
                })
                .map_err(write_fail)?;
            }
            PduType::SetRequest => {
                let oid = vb.oid.as_ref().ok_or(fail(ErrorStatus::NoSuchName))?;
                let entry = mib.get(oid).ok_or(fail(ErrorStatus::NoSuchName))?;
                if !entry.is_writable() {
                    return Err(fail(ErrorStatus::ReadOnly));
                }
                if vb.value.tag != entry.data_type().tag() {
                    return Err(fail(ErrorStatus::BadValue));
                }
                let value = vb.decode_value().map_err(|_| fail(ErrorStatus::BadValue))?;
                mib.set(oid, &value).map_err(fail)?;
                w.put_raw(vb.whole).map_err(write_fail)?;
            }
            PduType::Trap => {
                if vb.is_null() {
                    let entry = vb
                        .oid
                        .as_ref()
                        .and_then(|oid| mib.get(oid))
                        .ok_or(fail(ErrorStatus::NoSuchName))?;
                    let value = entry.read().map_err(fail)?;
                    w.constructed(tag::SEQUENCE, |w| {
                        w.put_raw(vb.name)?;
                        value.encode(w)
                    })
                    .map_err(write_fail)?;
                } else {
                    vb.decode_value().map_err(|_| fail(ErrorStatus::BadValue))?;
                    w.put_raw(vb.whole).map_err(write_fail)?;
                }
            }
            PduType::GetResponse => {
                return Err(Halt::Fatal(Error::decode(
                    0,
                    DecodeErrorKind::UnexpectedPduType(pdu_type.tag()),
                )));
            }
        }
    }
    Ok(index)
}

/// Read an error-status or error-index field of a request; it must be a
/// one-byte INTEGER 0.
fn expect_zero_field(pdu: &mut Decoder<'_>) -> Result<()> {
    let tlv = pdu.expect(tag::INTEGER)?;
    let value = decode_integer(pdu.value(&tlv), tlv.value_start)?;
    if tlv.len != 1 || value != 0 {
        tracing::debug!(target: "usnmp::engine", { snmp.offset = %tlv.start }, "request has non-zero error field");
        return Err(Error::decode(tlv.start, DecodeErrorKind::NonZeroErrorField));
    }
    Ok(())
}

/// Process one request message against the MIB.
///
/// See the module documentation for the possible outcomes.
pub fn process(request: &[u8], mib: &mut MibStore, auth: &dyn Authenticator) -> Result<Reply> {
    if request.len() > REQUEST_BUFFER_SIZE {
        tracing::debug!(target: "usnmp::engine", { size = request.len(), max = REQUEST_BUFFER_SIZE }, "request too large");
        return Err(Error::MessageTooLarge {
            size: request.len(),
            max: REQUEST_BUFFER_SIZE,
        });
    }

    let env = Envelope::decode(request)?;
    let request_type = env.pdu_type;
    if !request_type.is_request() {
        tracing::debug!(target: "usnmp::engine", { snmp.offset = %env.pdu.start, pdu_type = %request_type }, "not a request PDU");
        return Err(Error::decode(
            env.pdu.start,
            DecodeErrorKind::UnexpectedPduType(env.pdu.tag),
        ));
    }

    if !auth.authorize(env.community, request_type) {
        tracing::warn!(target: "usnmp::engine", { community = %String::from_utf8_lossy(env.community), pdu_type = %request_type }, "community rejected");
        return Err(Error::InvalidCommunity {
            community: Bytes::copy_from_slice(env.community),
        });
    }

    let mut pdu = env.pdu_contents();
    let request_id = pdu.expect(tag::INTEGER)?;
    decode_integer(pdu.value(&request_id), request_id.value_start)?;
    expect_zero_field(&mut pdu)?;
    expect_zero_field(&mut pdu)?;
    let list = pdu.expect(tag::SEQUENCE)?;
    if !pdu.is_empty() {
        return Err(Error::decode(pdu.offset(), DecodeErrorKind::TrailingData));
    }
    let items = pdu.enter(&list);

    let mut w = TlvWriter::new(RESPONSE_BUFFER_SIZE);
    let result = w.constructed(tag::SEQUENCE, |w| {
        w.put_raw(env.raw(&env.version))?;
        w.put_raw(env.raw(&env.community_tlv))?;
        w.constructed(tag::GET_RESPONSE, |w| {
            w.put_raw(env.raw(&request_id))?;
            w.put_integer(0)?;
            w.put_integer(0)?;
            w.constructed(tag::SEQUENCE, |w| {
                run_varbinds(request_type, items, mib, w).map(|_| ())
            })
        })
    });

    let (status, index) = match result {
        Ok(()) => {
            tracing::trace!(target: "usnmp::engine", { pdu_type = %request_type, size = w.len() }, "request answered");
            return Ok(Reply {
                message: w.freeze(),
                request_type,
                error_status: ErrorStatus::NoError,
                error_index: 0,
            });
        }
        Err(Halt::VarBind { status, index }) => (status, index),
        Err(Halt::Fatal(e)) if e.is_capacity_exceeded() => (ErrorStatus::TooBig, 0),
        Err(Halt::Fatal(e)) => return Err(e),
    };

    tracing::debug!(target: "usnmp::engine", { pdu_type = %request_type, snmp.status = %status, snmp.index = index }, "varbind failed");

    // Echo the request PDU with the error fields set.
    let mut w = TlvWriter::new(RESPONSE_BUFFER_SIZE);
    w.constructed(tag::SEQUENCE, |w| {
        w.put_raw(env.raw(&env.version))?;
        w.put_raw(env.raw(&env.community_tlv))?;
        w.constructed(tag::GET_RESPONSE, |w| {
            w.put_raw(env.raw(&request_id))?;
            w.put_integer(status.as_i32())?;
            w.put_integer(index as i32)?;
            w.put_raw(env.raw(&list))
        })
    })?;
    Ok(Reply {
        message: w.freeze(),
        request_type,
        error_status: status,
        error_index: index,
    })
}

/// Run the varbind engine over a standalone list.
///
/// For GET, GET-NEXT and SET the result is what a GetResponse would carry.
/// For TRAP, NULL values are filled in from the MIB and other values are
/// copied through. A failing varbind yields [`Error::Snmp`] with its
/// 1-based index.
pub fn vblist_parse(
    pdu_type: PduType,
    list: &VarBindList,
    mib: &mut MibStore,
) -> Result<VarBindList> {
    let mut outer = Decoder::new(list.as_bytes());
    let items = outer.read_sequence()?;

    let mut w = TlvWriter::new(VARBIND_BUFFER_SIZE.max(list.as_bytes().len()));
    let mut count = 0;
    let result = w.constructed(tag::SEQUENCE, |w| {
        count = run_varbinds(pdu_type, items, mib, w)?;
        Ok::<(), Halt>(())
    });
    match result {
        Ok(()) => Ok(VarBindList::from_writer(w, count as usize)),
        Err(Halt::VarBind { status, index }) => {
            tracing::debug!(target: "usnmp::engine", { %pdu_type, snmp.status = %status, snmp.index = index }, "varbind list failed");
            Err(Error::Snmp { status, index })
        }
        Err(Halt::Fatal(e)) => Err(e),
    }
}
