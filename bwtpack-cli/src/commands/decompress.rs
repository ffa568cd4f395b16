//! Decompress command implementation.

use crate::utils::{create_progress_bar, decompressed_path, format_size};
use bwtpack::BlockDecoder;
use log::warn;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

pub fn cmd_decompress(
    input: &Path,
    output: Option<&Path>,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.map_or_else(|| decompressed_path(input), Path::to_path_buf);
    let input_len = fs::metadata(input)?.len();
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(&output)?);

    let pb = create_progress_bar(input_len, progress);
    let start = Instant::now();

    let result = decode_into(reader, writer, |consumed| pb.set_position(consumed));
    pb.finish_and_clear();

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            // Never leave a partially decoded file behind.
            if let Err(remove_err) = fs::remove_file(&output) {
                warn!("could not remove {}: {}", output.display(), remove_err);
            }
            return Err(e);
        }
    };

    println!(
        "{} -> {}: {} -> {} ({} blocks) in {:.2?}",
        input.display(),
        output.display(),
        format_size(stats.bytes_in),
        format_size(stats.bytes_out),
        stats.blocks,
        start.elapsed()
    );

    Ok(())
}

fn decode_into<R: std::io::Read, W: Write>(
    reader: R,
    mut writer: W,
    mut on_progress: impl FnMut(u64),
) -> Result<bwtpack::StreamStats, Box<dyn std::error::Error>> {
    let mut decoder = BlockDecoder::new(reader);
    while let Some(block) = decoder.read_block()? {
        writer.write_all(&block)?;
        on_progress(decoder.stats().bytes_in);
    }
    writer.flush()?;
    Ok(decoder.stats())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bwtpack::{PipelineConfig, compress};

    #[test]
    fn test_decode_into_reports_progress() {
        let data = b"progress progress progress".repeat(20);
        let compressed = compress(&data, &PipelineConfig::new(100)).unwrap();

        let mut out = Vec::new();
        let mut seen = Vec::new();
        let stats = decode_into(&compressed[..], &mut out, |n| seen.push(n)).unwrap();

        assert_eq!(out, data);
        assert_eq!(seen.len(), stats.blocks);
        assert_eq!(seen.last().copied(), Some(compressed.len() as u64));
    }
}
