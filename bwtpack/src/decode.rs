//! Block-sorting decoder.

use crate::config::MAX_BLOCK_SIZE;
use crate::frame::{Frame, FrameRef, frames};
use crate::huffman::CodeTable;
use crate::{StreamStats, bwt, huffman, mtf, rle};
use bwtpack_core::Stage;
use bwtpack_core::error::{BwtPackError, Result};
use log::{debug, trace, warn};
use std::io::{Read, Write};

#[cfg(feature = "parallel")]
use crate::config::PipelineConfig;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Decode one frame back into the original block.
///
/// Any failure is reported as [`BwtPackError::BlockFailed`] carrying `index`
/// and the stage that rejected the frame.
pub fn decompress_block(frame: FrameRef<'_>, index: usize) -> Result<Vec<u8>> {
    decode_stages(frame, index).map_err(|err| {
        warn!("{err}");
        err
    })
}

/// Longest run stream an encoder emits: one pair per byte of a full block.
const MAX_RUN_STREAM: usize = 2 * MAX_BLOCK_SIZE;

fn decode_stages(frame: FrameRef<'_>, index: usize) -> Result<Vec<u8>> {
    let table =
        CodeTable::deserialize(frame.code_table).map_err(|e| e.in_block(index, Stage::Entropy))?;
    let runs = huffman::decode_with_limit(frame.payload, &table, MAX_RUN_STREAM)
        .map_err(|e| e.in_block(index, Stage::Entropy))?;
    trace!("block {index}: {} bytes after {}", runs.len(), Stage::Entropy);

    let ranks = rle::decode_with_limit(&runs, MAX_BLOCK_SIZE)
        .map_err(|e| e.in_block(index, Stage::Rle))?;
    trace!("block {index}: {} ranks after {}", ranks.len(), Stage::Rle);

    let last_column = mtf::decode(&ranks);

    // The encoder never writes empty blocks.
    if last_column.is_empty() {
        return Err(BwtPackError::corrupt_block("frame decodes to an empty block")
            .in_block(index, Stage::Bwt));
    }

    let block = bwt::inverse(&last_column, frame.primary_index)
        .map_err(|e| e.in_block(index, Stage::Bwt))?;
    debug!(
        "block {index}: {} -> {} bytes",
        frame.encoded_len(),
        block.len()
    );
    Ok(block)
}

/// Streaming decoder reading one frame per call.
pub struct BlockDecoder<R: Read> {
    reader: R,
    stats: StreamStats,
    finished: bool,
}

impl<R: Read> BlockDecoder<R> {
    /// Create a new decoder.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            stats: StreamStats::default(),
            finished: false,
        }
    }

    /// Totals for the blocks decoded so far.
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Read and decode the next block.
    ///
    /// Returns `Ok(None)` once the input ends cleanly on a frame boundary.
    pub fn read_block(&mut self) -> Result<Option<Vec<u8>>> {
        if self.finished {
            return Ok(None);
        }

        let index = self.stats.blocks;
        let frame = match Frame::read_from(&mut self.reader) {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.finished = true;
                return Ok(None);
            }
            Err(err) => {
                self.finished = true;
                let err = err.in_block(index, Stage::Framed);
                warn!("{err}");
                return Err(err);
            }
        };

        let block = decompress_block(frame.view(), index).inspect_err(|_| {
            self.finished = true;
        })?;

        self.stats.blocks += 1;
        self.stats.bytes_in += frame.encoded_len() as u64;
        self.stats.bytes_out += block.len() as u64;
        Ok(Some(block))
    }

    /// Consume the decoder and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Decompress a sequence of frames.
///
/// Nothing is returned unless every frame decodes.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len() * 2);
    for (index, frame) in frames(data).enumerate() {
        let frame = frame.map_err(|e| e.in_block(index, Stage::Framed))?;
        output.extend_from_slice(&decompress_block(frame, index)?);
    }
    Ok(output)
}

/// Decompress everything from `reader` into `writer`, one block at a time.
///
/// Blocks before a failing one have already been written when this returns
/// an error.
pub fn decompress_stream<R: Read, W: Write>(reader: R, mut writer: W) -> Result<StreamStats> {
    let mut decoder = BlockDecoder::new(reader);
    while let Some(block) = decoder.read_block()? {
        writer.write_all(&block)?;
    }
    writer.flush()?;

    let stats = decoder.stats();
    debug!(
        "read {} blocks, {} -> {} bytes",
        stats.blocks, stats.bytes_in, stats.bytes_out
    );
    Ok(stats)
}

/// Decompress frames on the rayon thread pool (requires the `parallel` feature).
///
/// Frame headers are parsed up front, so a truncated stream fails before any
/// block is decoded.
#[cfg(feature = "parallel")]
pub fn decompress_parallel(data: &[u8], config: &PipelineConfig) -> Result<Vec<u8>> {
    let parsed: Vec<FrameRef<'_>> = frames(data)
        .enumerate()
        .map(|(index, frame)| frame.map_err(|e| e.in_block(index, Stage::Framed)))
        .collect::<Result<_>>()?;

    let blocks: Vec<Result<Vec<u8>>> = config.install(|| {
        parsed
            .par_iter()
            .enumerate()
            .map(|(index, frame)| decompress_block(*frame, index))
            .collect()
    })?;

    let mut output = Vec::with_capacity(data.len() * 2);
    for block in blocks {
        output.extend_from_slice(&block?);
    }
    Ok(output)
}
