//! Text dump of a MIB store.
//!
//! One line per entry, `oid=T,A,V`:
//!
//! ```text
//! B.1.1.0=S,R,72-6f-75-74-65-72 [router]
//! B.1.2.0=O,R,P.38644.1
//! B.1.3.0=T,R,12345
//! B.1.4.0=N,R,-
//! P.38644.30.1=I,W,-5
//! ```
//!
//! `T` is the type letter of [`DataType::letter`], `A` is `R` or `W`. Octet
//! strings are dash-separated hex; when every byte is printable the text is
//! appended in brackets for the reader and ignored on load.

use std::fmt::Write as _;
use std::net::Ipv4Addr;
use std::path::Path;

use bytes::Bytes;

use super::{Access, MibEntry, MibStore};
use crate::error::{Error, Result};
use crate::format::hex;
use crate::oid::Oid;
use crate::value::{DataType, Value};

/// Format one entry as a dump line, without the trailing newline.
pub fn format_entry(entry: &MibEntry) -> String {
    let mut line = format!(
        "{}={},{},",
        entry.oid(),
        entry.data_type().letter(),
        entry.access().letter()
    );
    match entry.value() {
        Value::Null => line.push('-'),
        Value::Integer(v) => {
            let _ = write!(line, "{}", v);
        }
        Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => {
            let _ = write!(line, "{}", v);
        }
        Value::ObjectIdentifier(oid) => {
            let _ = write!(line, "{}", oid);
        }
        Value::IpAddress(addr) => {
            let _ = write!(line, "{}", Ipv4Addr::from(*addr));
        }
        Value::OctetString(data) => {
            line.push_str(&hex::encode_dashed(data));
            if !data.is_empty() && hex::is_printable(data) {
                let _ = write!(line, " [{}]", String::from_utf8_lossy(data));
            }
        }
        Value::Opaque(data) => line.push_str(&hex::encode_dashed(data)),
    }
    line
}

/// Parse one dump line.
///
/// `line_no` is only used in the error.
pub fn parse_line(line: &str, line_no: usize) -> Result<MibEntry> {
    let bad = |reason: &str| Error::MibFormat {
        line: line_no,
        reason: reason.into(),
    };

    let (oid_text, rest) = line.split_once('=').ok_or_else(|| bad("missing '='"))?;
    let oid = Oid::parse(oid_text.trim()).map_err(|e| bad(&e.to_string()))?;

    let mut fields = rest.splitn(3, ',');
    let data_type = fields
        .next()
        .and_then(single_char)
        .and_then(DataType::from_letter)
        .ok_or_else(|| bad("unknown type letter"))?;
    let access = fields
        .next()
        .and_then(single_char)
        .and_then(Access::from_letter)
        .ok_or_else(|| bad("unknown access letter"))?;
    // the value ends at the first blank; anything after it is commentary
    let text = fields
        .next()
        .ok_or_else(|| bad("missing value"))?
        .split_whitespace()
        .next()
        .unwrap_or("");

    let value = parse_value(data_type, text).map_err(|reason| bad(&reason))?;
    Ok(MibEntry::new(oid, value, access))
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.trim().chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn parse_value(data_type: DataType, text: &str) -> std::result::Result<Value, String> {
    let unsigned = |text: &str| text.parse::<u32>().map_err(|e| e.to_string());
    Ok(match data_type {
        DataType::Null => Value::Null,
        DataType::Integer => Value::Integer(text.parse().map_err(|e: std::num::ParseIntError| e.to_string())?),
        DataType::Counter32 => Value::Counter32(unsigned(text)?),
        DataType::Gauge32 => Value::Gauge32(unsigned(text)?),
        DataType::TimeTicks => Value::TimeTicks(unsigned(text)?),
        DataType::ObjectIdentifier => {
            Value::ObjectIdentifier(Oid::parse(text).map_err(|e| e.to_string())?)
        }
        DataType::IpAddress => {
            let addr: Ipv4Addr = text.parse().map_err(|e: std::net::AddrParseError| e.to_string())?;
            Value::IpAddress(addr.octets())
        }
        DataType::OctetString => {
            Value::OctetString(Bytes::from(hex::decode_dashed(text).map_err(|e| e.to_string())?))
        }
        DataType::Opaque => {
            Value::Opaque(Bytes::from(hex::decode_dashed(text).map_err(|e| e.to_string())?))
        }
    })
}

/// Render the whole store, one line per entry in ascending OID order.
pub fn to_text(store: &MibStore) -> String {
    let mut out = String::new();
    for entry in store {
        out.push_str(&format_entry(entry));
        out.push('\n');
    }
    out
}

/// Apply dump text to a store.
///
/// Lines naming an existing entry replace its inline value and keep its
/// access and accessor; the line is skipped if its type differs from the
/// entry's. Other lines insert a new entry. Blank lines are
/// ignored and malformed lines are skipped with a warning. Returns the
/// number of lines applied.
pub fn apply_text(store: &mut MibStore, text: &str) -> usize {
    let mut applied = 0;
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        let parsed = match parse_line(line, idx + 1) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(target: "usnmp::mib", error = %e, "skipping MIB dump line");
                continue;
            }
        };
        match store.get_mut(parsed.oid()) {
            Some(existing) if existing.data_type() != parsed.data_type() => {
                tracing::warn!(target: "usnmp::mib", { line = idx + 1, oid = %parsed.oid(), expected = %existing.data_type().letter(), found = %parsed.data_type().letter() }, "skipping MIB dump line with mismatched type");
                continue;
            }
            Some(existing) => existing.set_value(parsed.value().clone()),
            None => {
                store.upsert(parsed);
            }
        }
        applied += 1;
    }
    applied
}

/// Write the store to `path`.
pub fn save(store: &MibStore, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, to_text(store)).map_err(|e| Error::io(None, e))
}

/// Read `path` into the store. See [`apply_text`].
pub fn load(store: &mut MibStore, path: impl AsRef<Path>) -> Result<usize> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(None, e))?;
    Ok(apply_text(store, &text))
}
