//! Little-endian byte cursor primitives for rdpsnd PDU decoding.
//!
//! This crate provides [`ByteReader`] and [`ByteWriter`] for reading and
//! writing the fixed-width little-endian fields every RDPSND PDU is built from.
//! It is designed for bounded, panic-free operation with explicit error handling.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about PDUs or audio.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bytestream::{ByteReader, ByteWriter};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_u16_le(7);
//! writer.write_u32_le(44_100);
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::new(&bytes);
//! assert_eq!(reader.read_u16_le().unwrap(), 7);
//! assert_eq!(reader.read_u32_le().unwrap(), 44_100);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{ByteError, ByteResult};
pub use reader::ByteReader;
pub use writer::ByteWriter;
