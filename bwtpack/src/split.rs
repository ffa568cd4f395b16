//! Block splitting.
//!
//! Blocks are consecutive, non-overlapping slices of the input. Every block
//! holds exactly `block_size` bytes except possibly the last, and empty input
//! yields no blocks.

use bwtpack_core::error::Result;
use std::io::{ErrorKind, Read};

/// Split an in-memory buffer into blocks of at most `block_size` bytes.
pub fn split_blocks(data: &[u8], block_size: usize) -> std::slice::Chunks<'_, u8> {
    data.chunks(block_size.max(1))
}

/// Iterator over owned blocks read from any [`Read`] source.
///
/// Short reads are retried until a block is full or the source reaches EOF,
/// so block boundaries depend only on the byte stream, not on how the source
/// delivers it.
#[derive(Debug)]
pub struct BlockReader<R: Read> {
    reader: R,
    block_size: usize,
    done: bool,
}

impl<R: Read> BlockReader<R> {
    /// Create a reader producing blocks of at most `block_size` bytes.
    pub fn new(reader: R, block_size: usize) -> Self {
        Self {
            reader,
            block_size: block_size.max(1),
            done: false,
        }
    }

    /// Consume this reader and return the underlying source.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn fill_block(&mut self) -> Result<Vec<u8>> {
        let mut block = vec![0u8; self.block_size];
        let mut filled = 0;

        while filled < block.len() {
            match self.reader.read(&mut block[filled..]) {
                Ok(0) => {
                    self.done = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Err(e.into());
                }
            }
        }

        block.truncate(filled);
        Ok(block)
    }
}

impl<R: Read> Iterator for BlockReader<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.fill_block() {
            Ok(block) if block.is_empty() => None,
            other => Some(other),
        }
    }
}
