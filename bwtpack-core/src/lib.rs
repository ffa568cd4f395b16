//! # bwtpack Core
//!
//! Core components shared by the bwtpack crates:
//!
//! - [`bitstream`]: MSB-first bit reader/writer for Huffman payloads
//! - [`cursor`]: bounds-checked big-endian reads for frame and table parsing
//! - [`stage`]: the per-block pipeline stages
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI (bwtpack-cli)                                       │
//! │     compress / decompress / test / info                 │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codec (bwtpack)                                         │
//! │     split -> BWT -> MTF -> RLE -> Huffman -> frame      │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate)                                       │
//! │     bit I/O, byte cursor, errors, stages                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bwtpack_core::bitstream::{MsbBitReader, MsbBitWriter};
//! use bwtpack_core::cursor::ByteCursor;
//!
//! let mut writer = MsbBitWriter::new();
//! writer.write_bits(0b110, 3);
//! let bytes = writer.into_bytes();
//!
//! let mut reader = MsbBitReader::with_bit_len(&bytes, 3);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b110);
//!
//! let mut cursor = ByteCursor::new(&[0, 0, 1, 0]);
//! assert_eq!(cursor.read_u32_be("length").unwrap(), 256);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod cursor;
pub mod error;
pub mod stage;

// Re-exports for convenience
pub use bitstream::{MsbBitReader, MsbBitWriter};
pub use cursor::ByteCursor;
pub use error::{BwtPackError, Result};
pub use stage::Stage;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{MsbBitReader, MsbBitWriter};
    pub use crate::cursor::ByteCursor;
    pub use crate::error::{BwtPackError, Result};
    pub use crate::stage::Stage;
}
