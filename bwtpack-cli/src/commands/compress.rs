//! Compress command implementation.

use crate::utils::{compressed_path, create_progress_bar, format_size};
use bwtpack::split::BlockReader;
use bwtpack::{BlockEncoder, PipelineConfig, StreamStats};
use indicatif::ProgressBar;
use log::{info, warn};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;

/// Blocks handed to the worker pool per batch, per worker.
const BLOCKS_PER_WORKER: usize = 2;

fn worker_count(threads: usize) -> usize {
    if threads > 0 {
        return threads;
    }
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(1)
}

pub fn cmd_compress(
    input: &Path,
    output: Option<&Path>,
    block_size: usize,
    threads: usize,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = PipelineConfig::new(block_size).with_threads(threads);
    config.validate()?;

    let output = output.map_or_else(|| compressed_path(input), Path::to_path_buf);
    let input_len = fs::metadata(input)?.len();
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(&output)?);

    let batch_len = worker_count(threads) * BLOCKS_PER_WORKER;
    info!(
        "compressing {} with {} byte blocks, {} blocks per batch",
        input.display(),
        block_size,
        batch_len
    );

    let pb = create_progress_bar(input_len, progress);
    let start = Instant::now();

    let result = encode_batches(reader, writer, config, batch_len, &pb);
    pb.finish_and_clear();

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(&output) {
                warn!("could not remove {}: {}", output.display(), remove_err);
            }
            return Err(e);
        }
    };

    println!(
        "{} -> {}: {} -> {} ({:.1}%, {} blocks) in {:.2?}",
        input.display(),
        output.display(),
        format_size(stats.bytes_in),
        format_size(stats.bytes_out),
        stats.ratio(),
        stats.blocks,
        start.elapsed()
    );

    Ok(())
}

/// Read blocks in batches and compress each batch on the worker pool.
fn encode_batches<R: Read, W: Write>(
    reader: R,
    writer: W,
    config: PipelineConfig,
    batch_len: usize,
    pb: &ProgressBar,
) -> Result<StreamStats, Box<dyn std::error::Error>> {
    let mut encoder = BlockEncoder::new(writer, config)?;
    let mut blocks = BlockReader::new(reader, config.block_size);
    loop {
        let batch: Vec<Vec<u8>> = blocks.by_ref().take(batch_len).collect::<Result<_, _>>()?;
        if batch.is_empty() {
            break;
        }

        let slices: Vec<&[u8]> = batch.iter().map(Vec::as_slice).collect();
        encoder.write_batch(&slices)?;
        pb.inc(slices.iter().map(|b| b.len() as u64).sum());
    }
    let (_, stats) = encoder.finish()?;
    Ok(stats)
}
