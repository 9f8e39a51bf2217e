//! BER primitives for SNMPv1.
//!
//! - [`Decoder`] walks a borrowed message and yields [`Tlv`] descriptors
//! - [`TlvWriter`] builds messages front to back and backpatches lengths
//! - [`length`] holds the length-field codec
//! - [`tag`] names the tag bytes

mod decode;
pub mod length;
pub mod tag;
mod writer;

pub use decode::{Decoder, Tlv, decode_integer, decode_unsigned};
pub use length::{decode_length, encode_length};
pub use writer::{TlvWriter, canonicalize_integer};
