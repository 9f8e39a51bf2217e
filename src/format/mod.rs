//! Text renderings of SNMP octet strings.
//!
//! The MIB dump and the command-line tools show octet strings as
//! dash-separated hex pairs (`48-65-6c-6c-6f`), optionally followed by the
//! printable text in brackets.
//!
//! ```
//! use usnmp::format::hex;
//!
//! assert_eq!(hex::encode_dashed(b"Hi"), "48-69");
//! assert_eq!(hex::decode_dashed("48-69").unwrap(), b"Hi");
//! ```

pub mod hex;
