//! Command-line argument structures for the usnmp tools.

use clap::Parser;
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::format::hex;
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

/// Arguments shared by the manager tools.
#[derive(Debug, Parser)]
pub struct ManagerArgs {
    /// Target host.
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Target port.
    #[arg(short = 'p', long = "port", default_value = "161")]
    pub port: u16,

    /// Request id of the first request.
    #[arg(short = 'i', long = "request-id", default_value = "1")]
    pub request_id: i32,

    /// Response timeout in seconds.
    #[arg(short = 't', long = "timeout", default_value = "2")]
    pub timeout: u64,
}

impl ManagerArgs {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Logging arguments.
#[derive(Debug, Parser)]
pub struct LogArgs {
    /// Enable debug logging (usnmp=debug).
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Enable trace logging (usnmp=trace).
    #[arg(short = 'D', long = "trace")]
    pub trace: bool,
}

impl LogArgs {
    /// Initialize tracing to stderr; `quiet` is the level when no flag is given.
    pub fn init_tracing(&self, quiet: &str) {
        use tracing_subscriber::EnvFilter;

        let filter = if self.trace {
            "usnmp=trace".to_string()
        } else if self.debug {
            "usnmp=debug".to_string()
        } else {
            format!("usnmp={quiet}")
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Value type letter used on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// `O`: OBJECT IDENTIFIER
    Oid,
    /// `S`: OCTET STRING from text
    String,
    /// `X`: OCTET STRING from dash-separated hex
    HexString,
    /// `A`: IpAddress
    IpAddress,
    /// `I`: INTEGER
    Integer,
    /// `T`: TimeTicks
    TimeTicks,
    /// `C`: Counter
    Counter,
    /// `G`: Gauge
    Gauge,
}

impl std::str::FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_ascii_uppercase(),
            _ => return Err(format!("invalid type specifier: {s}")),
        };
        match letter {
            'O' => Ok(ValueType::Oid),
            'S' => Ok(ValueType::String),
            'X' => Ok(ValueType::HexString),
            'A' => Ok(ValueType::IpAddress),
            'I' => Ok(ValueType::Integer),
            'T' => Ok(ValueType::TimeTicks),
            'C' => Ok(ValueType::Counter),
            'G' => Ok(ValueType::Gauge),
            _ => Err(format!("invalid type specifier: {s}")),
        }
    }
}

impl ValueType {
    /// Parse a string value into a [`Value`] of this type.
    pub fn parse_value(&self, s: &str) -> Result<Value, String> {
        match self {
            ValueType::Oid => Oid::parse(s)
                .map(Value::ObjectIdentifier)
                .map_err(|e| format!("invalid OID value: {e}")),
            ValueType::String => Ok(Value::from(s)),
            ValueType::HexString => hex::decode_dashed(s)
                .map(|bytes| Value::OctetString(bytes.into()))
                .map_err(|e| format!("invalid hex value '{s}': {e}")),
            ValueType::IpAddress => s
                .parse::<Ipv4Addr>()
                .map(Value::from)
                .map_err(|_| format!("invalid IP address: {s}")),
            ValueType::Integer => s
                .parse()
                .map(Value::Integer)
                .map_err(|_| format!("invalid integer value: {s}")),
            ValueType::TimeTicks => s
                .parse()
                .map(Value::TimeTicks)
                .map_err(|_| format!("invalid timeticks value: {s}")),
            ValueType::Counter => s
                .parse()
                .map(Value::Counter32)
                .map_err(|_| format!("invalid counter value: {s}")),
            ValueType::Gauge => s
                .parse()
                .map(Value::Gauge32)
                .map_err(|_| format!("invalid gauge value: {s}")),
        }
    }
}

/// Parse an OID argument.
pub fn parse_oid(s: &str) -> Result<Oid, String> {
    Oid::parse(s).map_err(|e| format!("invalid OID '{s}': {e}"))
}

/// Parse `OID TYPE VALUE` triplets.
pub fn parse_varbinds(args: &[String]) -> Result<Vec<VarBind>, String> {
    if args.len() % 3 != 0 {
        return Err("arguments must be OID TYPE VALUE triplets".into());
    }
    args.chunks(3)
        .map(|chunk| {
            let oid = parse_oid(&chunk[0])?;
            let value_type: ValueType = chunk[1].parse().map_err(|_| {
                format!(
                    "invalid type specifier '{}'; use O, S, X, A, I, T, C or G",
                    chunk[1]
                )
            })?;
            let value = value_type.parse_value(&chunk[2])?;
            Ok(VarBind::new(oid, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_value_type_letters() {
        assert_eq!("i".parse::<ValueType>().unwrap(), ValueType::Integer);
        assert_eq!("G".parse::<ValueType>().unwrap(), ValueType::Gauge);
        assert!("Z".parse::<ValueType>().is_err());
        assert!("II".parse::<ValueType>().is_err());
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(
            ValueType::Integer.parse_value("-18").unwrap(),
            Value::Integer(-18)
        );
        assert_eq!(
            ValueType::String.parse_value("18thFloor").unwrap(),
            Value::from("18thFloor")
        );
        assert_eq!(
            ValueType::HexString.parse_value("0a-ff").unwrap(),
            Value::OctetString(bytes::Bytes::from_static(&[0x0A, 0xFF]))
        );
        assert_eq!(
            ValueType::IpAddress.parse_value("192.168.1.1").unwrap(),
            Value::IpAddress([192, 168, 1, 1])
        );
        assert_eq!(
            ValueType::Oid.parse_value("P.38644.1").unwrap(),
            Value::ObjectIdentifier(oid!(P, 38644, 1))
        );
        assert!(ValueType::Counter.parse_value("-1").is_err());
        assert!(ValueType::IpAddress.parse_value("1.2.3").is_err());
    }

    #[test]
    fn test_parse_varbinds() {
        let args: Vec<String> = ["B.1.6.0", "S", "lab", "B.1.3.0", "T", "100"]
            .into_iter()
            .map(String::from)
            .collect();
        let vbs = parse_varbinds(&args).unwrap();
        assert_eq!(vbs.len(), 2);
        assert_eq!(vbs[1].value, Value::TimeTicks(100));
        assert!(parse_varbinds(&args[..2]).is_err());
    }
}
