//! Error types for bwtpack operations.
//!
//! Every decode stage detects its own failures and reports them with one of
//! the variants below. The pipeline orchestrator wraps stage errors in
//! [`BwtPackError::BlockFailed`] so the caller learns which block, and which
//! stage of that block, could not be reconstructed.

use crate::stage::Stage;
use std::io;
use thiserror::Error;

/// The main error type for bwtpack operations.
#[derive(Debug, Error)]
pub enum BwtPackError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input ended before a complete frame, field or RLE pair was read.
    #[error("Truncated input in {context}: need {needed} bytes, have {available}")]
    TruncatedInput {
        /// What was being read when the input ran out.
        context: &'static str,
        /// Number of bytes required.
        needed: usize,
        /// Number of bytes actually available.
        available: usize,
    },

    /// A BWT block cannot be inverted.
    #[error("Corrupt block: {message}")]
    CorruptBlock {
        /// Description of the corruption.
        message: String,
    },

    /// The sentinel BWT variant was handed a block that contains the sentinel.
    #[error("Block contains the sentinel byte at offset {offset}")]
    SentinelCollision {
        /// Offset of the first sentinel byte in the block.
        offset: usize,
    },

    /// Huffman bit sequence does not resolve to a symbol.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidCode {
        /// Bit position (within the packed payload) where decoding failed.
        bit_position: u64,
    },

    /// Serialized code table is inconsistent or not prefix-free.
    #[error("Malformed code table: {message}")]
    MalformedCodeTable {
        /// Description of the table error.
        message: String,
    },

    /// An RLE pair carries a zero run length.
    #[error("Invalid run at offset {offset}: zero-length run")]
    InvalidRun {
        /// Byte offset of the offending pair.
        offset: usize,
    },

    /// Pipeline configuration is out of range.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// An allocation for a block could not be satisfied.
    #[error("Resource exhausted: could not allocate {requested} elements")]
    ResourceExhausted {
        /// Number of elements requested.
        requested: usize,
    },

    /// A block failed somewhere in its stage chain.
    #[error("Block {block} failed at stage {stage}: {source}")]
    BlockFailed {
        /// Zero-based index of the failing block.
        block: usize,
        /// Stage where the failure was detected.
        stage: Stage,
        /// The stage error.
        #[source]
        source: Box<BwtPackError>,
    },
}

/// Result type alias for bwtpack operations.
pub type Result<T> = std::result::Result<T, BwtPackError>;

impl BwtPackError {
    /// Create a truncated input error.
    pub fn truncated(context: &'static str, needed: usize, available: usize) -> Self {
        Self::TruncatedInput {
            context,
            needed,
            available,
        }
    }

    /// Create a corrupt block error.
    pub fn corrupt_block(message: impl Into<String>) -> Self {
        Self::CorruptBlock {
            message: message.into(),
        }
    }

    /// Create a sentinel collision error.
    pub fn sentinel_collision(offset: usize) -> Self {
        Self::SentinelCollision { offset }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_code(bit_position: u64) -> Self {
        Self::InvalidCode { bit_position }
    }

    /// Create a malformed code table error.
    pub fn malformed_table(message: impl Into<String>) -> Self {
        Self::MalformedCodeTable {
            message: message.into(),
        }
    }

    /// Create an invalid run error.
    pub fn invalid_run(offset: usize) -> Self {
        Self::InvalidRun { offset }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a resource exhausted error.
    pub fn resource_exhausted(requested: usize) -> Self {
        Self::ResourceExhausted { requested }
    }

    /// Attach the block index and stage to a stage error.
    ///
    /// Errors that already carry a block index are returned unchanged.
    pub fn in_block(self, block: usize, stage: Stage) -> Self {
        match self {
            err @ Self::BlockFailed { .. } => err,
            err => Self::BlockFailed {
                block,
                stage,
                source: Box::new(err),
            },
        }
    }

    /// The innermost error, looking through any [`BwtPackError::BlockFailed`] wrapper.
    pub fn root_cause(&self) -> &Self {
        let mut err = self;
        while let Self::BlockFailed { source, .. } = err {
            err = source;
        }
        err
    }

    /// The failing block index, if this error was raised for a specific block.
    pub fn block_index(&self) -> Option<usize> {
        match self {
            Self::BlockFailed { block, .. } => Some(*block),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BwtPackError::truncated("frame header", 4, 1);
        assert!(err.to_string().contains("frame header"));

        let err = BwtPackError::invalid_code(17);
        assert!(err.to_string().contains("17"));

        let err = BwtPackError::malformed_table("duplicate symbol 0x41");
        assert!(err.to_string().contains("duplicate symbol"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: BwtPackError = io_err.into();
        assert!(matches!(err, BwtPackError::Io(_)));
    }

    #[test]
    fn test_in_block_wraps_once() {
        let err = BwtPackError::corrupt_block("bad index")
            .in_block(3, Stage::Bwt)
            .in_block(9, Stage::Entropy);

        assert_eq!(err.block_index(), Some(3));
        assert!(matches!(err.root_cause(), BwtPackError::CorruptBlock { .. }));
        assert!(err.to_string().contains("Block 3 failed at stage BWT"));
    }

    #[test]
    fn test_root_cause_of_plain_error() {
        let err = BwtPackError::invalid_run(6);
        assert!(matches!(err.root_cause(), BwtPackError::InvalidRun { offset: 6 }));
        assert_eq!(err.block_index(), None);
    }
}
