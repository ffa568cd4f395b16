//! Block-sorting compression for bwtpack.
//!
//! Input is cut into fixed-size blocks and every block runs through the same
//! chain of transforms:
//!
//! 1. Burrows-Wheeler Transform (BWT) - groups bytes with similar context
//! 2. Move-to-Front Transform (MTF) - turns those groups into small ranks
//! 3. Run-Length Encoding (RLE) - collapses runs into `(count, value)` pairs
//! 4. Huffman Coding - entropy codes the pairs with a per-block table
//!
//! Each block becomes one self-contained [frame](frame), so blocks can be
//! compressed and decompressed independently. With the `parallel` feature
//! enabled, [`compress_parallel`] and [`decompress_parallel`] spread blocks
//! over a rayon pool and produce the same bytes as the serial path.
//!
//! # Example
//!
//! ```rust
//! use bwtpack::{PipelineConfig, compress, decompress};
//!
//! let data = b"abracadabra abracadabra abracadabra";
//! let compressed = compress(data, &PipelineConfig::default()).unwrap();
//! assert_eq!(decompress(&compressed).unwrap(), data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Burrows-Wheeler Transform implementation.
pub mod bwt;
pub mod config;
mod decode;
mod encode;
pub mod frame;
pub mod huffman;
pub mod mtf;
pub mod rle;
pub mod split;

pub use bwtpack_core::error::{BwtPackError, Result};
pub use bwtpack_core::stage::Stage;
pub use config::{DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, PipelineConfig};
pub use decode::{BlockDecoder, decompress, decompress_block, decompress_stream};
pub use encode::{BlockEncoder, compress, compress_block, compress_stream};
pub use frame::{FrameInfo, frame_infos, frames};

#[cfg(feature = "parallel")]
pub use decode::decompress_parallel;
#[cfg(feature = "parallel")]
pub use encode::compress_parallel;

/// Totals for a compressed or decompressed stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Number of blocks (frames) processed.
    pub blocks: usize,
    /// Bytes consumed.
    pub bytes_in: u64,
    /// Bytes produced.
    pub bytes_out: u64,
}

impl StreamStats {
    /// Output size as a percentage of input size.
    pub fn ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            0.0
        } else {
            self.bytes_out as f64 / self.bytes_in as f64 * 100.0
        }
    }
}
