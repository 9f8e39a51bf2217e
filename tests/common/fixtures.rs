//! Standard test fixtures with realistic MIB data.

use bytes::Bytes;
use usnmp::mib::{Access, MibEntry, MibStore};
use usnmp::{Oid, PduType, Value, VarBindList, oid};

pub const COMMUNITY_RO: &str = "public";
pub const COMMUNITY_RW: &str = "private";

pub fn sys_descr() -> Oid {
    oid!(B, 1, 1, 0)
}

pub fn sys_uptime() -> Oid {
    oid!(B, 1, 3, 0)
}

pub fn sys_contact() -> Oid {
    oid!(B, 1, 4, 0)
}

pub fn sys_name() -> Oid {
    oid!(B, 1, 5, 0)
}

/// The system group with a mix of read-only and writable leaves.
pub fn system_mib() -> MibStore {
    [
        MibEntry::new(sys_descr(), Value::from("usnmp test agent"), Access::ReadOnly),
        MibEntry::new(
            oid!(B, 1, 2, 0),
            Value::ObjectIdentifier(oid!(P, 38644, 30)),
            Access::ReadOnly,
        ),
        MibEntry::new(sys_uptime(), Value::TimeTicks(0), Access::ReadOnly),
        MibEntry::new(sys_contact(), Value::from("ops@lab"), Access::ReadWrite),
        MibEntry::new(sys_name(), Value::from("gw"), Access::ReadWrite),
        MibEntry::new(oid!(B, 1, 6, 0), Value::from("18thFloor"), Access::ReadWrite),
        MibEntry::new(oid!(B, 1, 7, 0), Value::Integer(72), Access::ReadOnly),
    ]
    .into_iter()
    .collect()
}

/// `{B.1.1, B.1.2, B.2.1}` plus a writable INTEGER at `B.1.3.0`.
pub fn scenario_mib() -> MibStore {
    [
        MibEntry::new(oid!(B, 1, 1), Value::from("first"), Access::ReadOnly),
        MibEntry::new(oid!(B, 1, 2), Value::Counter32(7), Access::ReadOnly),
        MibEntry::new(oid!(B, 1, 3, 0), Value::Integer(5), Access::ReadWrite),
        MibEntry::new(oid!(B, 2, 1), Value::Gauge32(9), Access::ReadOnly),
    ]
    .into_iter()
    .collect()
}

/// Encode a full request message.
pub fn request(pdu_type: PduType, request_id: i32, community: &str, varbinds: &[(Oid, Value)]) -> Bytes {
    let mut list = VarBindList::new();
    for (oid, value) in varbinds {
        list.append(oid, value).unwrap();
    }
    let pdu = usnmp::pdu::build_request(pdu_type, request_id, Some(&list)).unwrap();
    usnmp::message::wrap(community.as_bytes(), &pdu).unwrap()
}
