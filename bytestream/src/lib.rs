//! Byte cursor and numeric encoding primitives for the opwire protocol.
//!
//! This crate provides [`Reader`] and [`Writer`] for byte-level decoding and
//! encoding of the protocol's wire representations: raw and offset bytes,
//! little-endian shorts and ints, the mixed-order "V1" int, big-endian
//! variable-length ints, and both string conventions the peer uses.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked; writes honor a
//!   configured message size cap.
//! - **No domain knowledge** - This crate knows nothing about opcodes,
//!   messages, or sessions.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bytestream::{Reader, Writer};
//!
//! let mut writer = Writer::new();
//! writer.write_le_u32(16_909_060).unwrap();
//! writer.write_offset_u8(200).unwrap();
//!
//! let bytes = writer.finish();
//! assert_eq!(bytes, [0x04, 0x03, 0x02, 0x01, 72]);
//!
//! let mut reader = Reader::new(&bytes);
//! assert_eq!(reader.read_le_u32().unwrap(), 16_909_060);
//! assert_eq!(reader.read_offset_u8().unwrap(), 200);
//! ```

pub mod charset;
mod error;
mod reader;
mod writer;

pub use error::{StreamError, StreamResult};
pub use reader::Reader;
pub use writer::{Writer, DEFAULT_MAX_BYTES};
