// The Error enum carries an OID and a SocketAddr inline.
#![allow(clippy::result_large_err)]

//! # usnmp
//!
//! A compact SNMPv1 engine for small agents and managers.
//!
//! ## Features
//!
//! - Bounded BER encoding and decoding over fixed-capacity buffers
//! - OIDs under the three well-known roots `B` (mib-2), `E` (experimental)
//!   and `P` (enterprises)
//! - An ordered MIB store with GET, GET-NEXT and SET, plus a text dump format
//! - A request engine that turns one request datagram into one response
//! - An async agent, client and trap sender built on Tokio
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use usnmp::{Client, oid};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), usnmp::Error> {
//!     let client = Client::builder("192.168.1.1")
//!         .community("public")
//!         .connect()
//!         .await?;
//!
//!     for vb in client.get_next(&[oid!(B, 1)]).await? {
//!         println!("{vb}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Engine Only
//!
//! ```rust
//! use usnmp::engine::{self, Communities};
//! use usnmp::mib::{Access, MibEntry, MibStore};
//! use usnmp::{PduType, Value, VarBindList, oid};
//!
//! let mut mib: MibStore = [MibEntry::new(oid!(B, 1, 5, 0), Value::from("gw"), Access::ReadWrite)]
//!     .into_iter()
//!     .collect();
//!
//! let mut list = VarBindList::new();
//! list.append(&oid!(B, 1, 5, 0), &Value::Null).unwrap();
//! let pdu = usnmp::pdu::build_request(PduType::GetRequest, 1, Some(&list)).unwrap();
//! let request = usnmp::message::wrap(b"public", &pdu).unwrap();
//!
//! let reply = engine::process(&request, &mut mib, &Communities::default()).unwrap();
//! assert!(!reply.is_error());
//! ```

pub mod agent;
pub mod ber;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod message;
pub mod mib;
pub mod oid;
pub mod pdu;
pub mod transport;
pub mod value;
pub mod varbind;

pub(crate) mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use agent::{Agent, AgentBuilder};
pub use client::{Client, ClientBuilder, ClientConfig};
pub use config::{CommunityEntry, CommunityTable, KeyValues};
pub use engine::{AllowAll, Authenticator, Communities, Reply};
pub use error::{
    DecodeErrorKind, EncodeErrorKind, Error, ErrorStatus, OidErrorKind, Result,
};
pub use mib::{Access, Accessor, MibEntry, MibStore};
pub use oid::{Oid, Root};
pub use pdu::{GenericTrap, Pdu, PduType, TrapPdu};
pub use transport::{Transport, UdpTransport};
pub use value::{DataType, Value};
pub use varbind::{VarBind, VarBindList};
