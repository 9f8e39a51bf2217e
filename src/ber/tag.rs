//! Tag bytes used by SNMPv1.

pub const INTEGER: u8 = 0x02;
pub const OCTET_STRING: u8 = 0x04;
pub const NULL: u8 = 0x05;
pub const OBJECT_IDENTIFIER: u8 = 0x06;
/// SEQUENCE and SEQUENCE OF share the constructed universal tag.
pub const SEQUENCE: u8 = 0x30;

pub const IP_ADDRESS: u8 = 0x40;
pub const COUNTER32: u8 = 0x41;
pub const GAUGE32: u8 = 0x42;
pub const TIMETICKS: u8 = 0x43;
pub const OPAQUE: u8 = 0x44;

pub const GET_REQUEST: u8 = 0xA0;
pub const GET_NEXT_REQUEST: u8 = 0xA1;
pub const GET_RESPONSE: u8 = 0xA2;
pub const SET_REQUEST: u8 = 0xA3;
pub const TRAP: u8 = 0xA4;

/// Whether `tag` is one of the integer-family types.
pub fn is_integer_family(tag: u8) -> bool {
    matches!(tag, INTEGER | COUNTER32 | GAUGE32 | TIMETICKS)
}
