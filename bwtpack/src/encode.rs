//! Block-sorting encoder.

use crate::config::PipelineConfig;
use crate::frame::Frame;
use crate::split::{BlockReader, split_blocks};
use crate::{StreamStats, bwt, huffman, mtf, rle};
use bwtpack_core::Stage;
use bwtpack_core::error::{BwtPackError, Result};
use log::{debug, trace};
use std::io::{Read, Write};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Run one block through BWT, MTF, RLE and Huffman coding.
///
/// `index` is only used to label errors and log lines.
pub fn compress_block(block: &[u8], index: usize) -> Result<Frame> {
    let transformed = bwt::forward(block).map_err(|e| e.in_block(index, Stage::Bwt))?;
    trace!(
        "block {index}: {} bytes after {}, primary index {}",
        transformed.data.len(),
        Stage::Bwt,
        transformed.primary_index
    );

    let ranks = mtf::encode(&transformed.data);
    trace!("block {index}: {} ranks after {}", ranks.len(), Stage::Mtf);

    let runs = rle::encode(&ranks);
    trace!("block {index}: {} bytes after {}", runs.len(), Stage::Rle);

    let (payload, table) = huffman::encode(&runs);
    trace!(
        "block {index}: {} codes, {} payload bytes after {}",
        table.len(),
        payload.len(),
        Stage::Entropy
    );

    let frame = Frame {
        primary_index: transformed.primary_index,
        code_table: table.serialize(),
        payload,
    };
    debug!(
        "block {index}: {} -> {} bytes",
        block.len(),
        frame.encoded_len()
    );
    Ok(frame)
}

/// Streaming encoder writing one frame per block.
pub struct BlockEncoder<W: Write> {
    writer: W,
    config: PipelineConfig,
    stats: StreamStats,
}

impl<W: Write> BlockEncoder<W> {
    /// Create a new encoder.
    pub fn new(writer: W, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            writer,
            config,
            stats: StreamStats::default(),
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Totals for the frames written so far.
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Compress and write a single block.
    ///
    /// Empty blocks are skipped. A block larger than the configured block
    /// size is rejected; use [`write_all`](Self::write_all) to split data.
    pub fn write_block(&mut self, block: &[u8]) -> Result<()> {
        if block.is_empty() {
            return Ok(());
        }
        self.check_block_len(block.len())?;

        let frame = compress_block(block, self.stats.blocks)?;
        self.write_frame(&frame, block.len())
    }

    /// Compress a batch of blocks on the rayon pool and write them in order.
    ///
    /// Produces the same bytes as calling [`write_block`](Self::write_block)
    /// for each block. Nothing from the batch is written if any block fails
    /// to compress.
    #[cfg(feature = "parallel")]
    pub fn write_batch(&mut self, blocks: &[&[u8]]) -> Result<()> {
        let blocks: Vec<&[u8]> = blocks.iter().copied().filter(|b| !b.is_empty()).collect();
        for block in &blocks {
            self.check_block_len(block.len())?;
        }

        let first = self.stats.blocks;
        let frames: Vec<Frame> = self.config.install(|| {
            blocks
                .par_iter()
                .enumerate()
                .map(|(i, block)| compress_block(block, first + i))
                .collect::<Vec<Result<Frame>>>()
        })?
        .into_iter()
        .collect::<Result<_>>()?;

        for (frame, block) in frames.iter().zip(&blocks) {
            self.write_frame(frame, block.len())?;
        }
        Ok(())
    }

    fn check_block_len(&self, len: usize) -> Result<()> {
        if len > self.config.block_size {
            return Err(BwtPackError::invalid_config(format!(
                "block of {len} bytes exceeds block size {}",
                self.config.block_size
            )));
        }
        Ok(())
    }

    /// Split `data` into blocks and write each one.
    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        for block in split_blocks(data, self.config.block_size) {
            self.write_block(block)?;
        }
        Ok(())
    }

    /// Write an already compressed frame for a block of `raw_len` bytes.
    fn write_frame(&mut self, frame: &Frame, raw_len: usize) -> Result<()> {
        let bytes = frame.to_bytes()?;
        self.writer.write_all(&bytes)?;

        // Only count the frame once the writer has accepted all of it.
        self.stats.blocks += 1;
        self.stats.bytes_in += raw_len as u64;
        self.stats.bytes_out += bytes.len() as u64;
        Ok(())
    }

    /// Flush the writer and return it along with the stream totals.
    pub fn finish(mut self) -> Result<(W, StreamStats)> {
        self.writer.flush()?;
        debug!(
            "wrote {} blocks, {} -> {} bytes",
            self.stats.blocks, self.stats.bytes_in, self.stats.bytes_out
        );
        Ok((self.writer, self.stats))
    }
}

/// Compress data into a sequence of frames.
pub fn compress(data: &[u8], config: &PipelineConfig) -> Result<Vec<u8>> {
    let output = Vec::with_capacity(data.len() / 2 + 16);
    let mut encoder = BlockEncoder::new(output, *config)?;
    encoder.write_all(data)?;
    let (output, _) = encoder.finish()?;
    Ok(output)
}

/// Compress everything from `reader` into `writer`, one block at a time.
pub fn compress_stream<R: Read, W: Write>(
    reader: R,
    writer: W,
    config: &PipelineConfig,
) -> Result<StreamStats> {
    let mut encoder = BlockEncoder::new(writer, *config)?;
    for block in BlockReader::new(reader, config.block_size) {
        let block = block.map_err(|e| e.in_block(encoder.stats.blocks, Stage::Split))?;
        encoder.write_block(&block)?;
    }
    let (_, stats) = encoder.finish()?;
    Ok(stats)
}

/// Compress blocks on the rayon thread pool (requires the `parallel` feature).
///
/// The output is byte-identical to [`compress`] with the same configuration.
/// `config.threads` selects a dedicated pool size; 0 uses the global pool.
#[cfg(feature = "parallel")]
pub fn compress_parallel(data: &[u8], config: &PipelineConfig) -> Result<Vec<u8>> {
    let mut encoder = BlockEncoder::new(Vec::with_capacity(data.len() / 2 + 16), *config)?;
    let blocks: Vec<&[u8]> = split_blocks(data, config.block_size).collect();
    encoder.write_batch(&blocks)?;
    let (output, _) = encoder.finish()?;
    Ok(output)
}
