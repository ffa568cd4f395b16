//! Per-block pipeline stages.

use std::fmt;

/// A step in the per-block state machine.
///
/// Compression walks `Split -> Bwt -> Mtf -> Rle -> Entropy -> Framed`;
/// decompression walks the same states in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Block splitting (compress) or frame reading (decompress).
    Split,
    /// Burrows-Wheeler transform.
    Bwt,
    /// Move-to-front transform.
    Mtf,
    /// Run-length coding.
    Rle,
    /// Huffman coding.
    Entropy,
    /// Frame serialization.
    Framed,
}

impl Stage {
    /// Stages in compression order.
    pub const COMPRESS_ORDER: [Stage; 6] = [
        Stage::Split,
        Stage::Bwt,
        Stage::Mtf,
        Stage::Rle,
        Stage::Entropy,
        Stage::Framed,
    ];

    /// Short name used in log lines and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Split => "split",
            Stage::Bwt => "BWT",
            Stage::Mtf => "MTF",
            Stage::Rle => "RLE",
            Stage::Entropy => "entropy",
            Stage::Framed => "framed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
