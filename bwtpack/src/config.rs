//! Pipeline configuration.

use bwtpack_core::error::{BwtPackError, Result};

/// Default block size (64 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Largest accepted block size (16 MiB).
///
/// Keeps rotation indices and frame lengths inside `u32`, and Huffman code
/// lengths far below [`MAX_CODE_LEN`](crate::huffman::MAX_CODE_LEN).
pub const MAX_BLOCK_SIZE: usize = 16 * 1024 * 1024;

/// Pipeline configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Bytes per block (1 to [`MAX_BLOCK_SIZE`]).
    pub block_size: usize,
    /// Worker threads for the parallel API; 0 lets rayon decide.
    pub threads: usize,
}

impl PipelineConfig {
    /// Default configuration: 64 KiB blocks, automatic thread count.
    pub const DEFAULT: Self = Self {
        block_size: DEFAULT_BLOCK_SIZE,
        threads: 0,
    };

    /// Create a configuration with the given block size.
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            ..Self::DEFAULT
        }
    }

    /// Set the block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the worker thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Check that every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(BwtPackError::invalid_config(format!(
                "block size {} outside 1..={MAX_BLOCK_SIZE}",
                self.block_size
            )));
        }
        Ok(())
    }

    /// Run `op` on a pool with [`threads`](Self::threads) workers, or on the
    /// global rayon pool when it is 0.
    #[cfg(feature = "parallel")]
    pub(crate) fn install<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        if self.threads == 0 {
            return Ok(op());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|e| BwtPackError::invalid_config(format!("thread pool: {e}")))?;
        Ok(pool.install(op))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
