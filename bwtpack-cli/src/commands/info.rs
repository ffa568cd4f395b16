//! Info command implementation.

use crate::utils::format_size;
use bwtpack::frame::FRAME_OVERHEAD;
use bwtpack::huffman::{CodeTable, shannon_entropy};
use bwtpack::{decompress_block, frames};
use serde::Serialize;
use std::path::Path;

/// JSON serializable description of one frame.
#[derive(Debug, Serialize)]
struct FrameJson {
    index: usize,
    offset: usize,
    primary_index: u32,
    code_table_len: usize,
    payload_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    codes: Option<usize>,
    /// Decoded block size; absent when the block does not decode.
    #[serde(skip_serializing_if = "Option::is_none")]
    block_len: Option<usize>,
    /// Shannon entropy of the decoded block, in bits per byte.
    #[serde(skip_serializing_if = "Option::is_none")]
    entropy: Option<f64>,
    /// Frame bits spent per decoded byte.
    #[serde(skip_serializing_if = "Option::is_none")]
    bits_per_byte: Option<f64>,
}

/// JSON output for a compressed file.
#[derive(Debug, Serialize)]
struct StreamJson {
    file: String,
    size: u64,
    blocks: usize,
    frames: Vec<FrameJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Walk frame headers, stopping at the first one that does not parse.
fn collect_frames(data: &[u8]) -> (Vec<FrameJson>, Option<String>) {
    let mut iter = frames(data);
    let mut collected = Vec::new();

    loop {
        let offset = iter.offset();
        let index = collected.len();
        match iter.next() {
            None => return (collected, None),
            Some(Err(e)) => return (collected, Some(format!("block {}: {}", index, e))),
            Some(Ok(frame)) => {
                let block = decompress_block(frame, index).ok();
                let block_len = block.as_ref().map(Vec::len);
                collected.push(FrameJson {
                    index,
                    offset,
                    primary_index: frame.primary_index,
                    code_table_len: frame.code_table.len(),
                    payload_len: frame.payload.len(),
                    codes: CodeTable::deserialize(frame.code_table)
                        .ok()
                        .map(|t| t.len()),
                    block_len,
                    entropy: block.as_deref().map(shannon_entropy),
                    bits_per_byte: block_len
                        .filter(|&n| n > 0)
                        .map(|n| (frame.encoded_len() * 8) as f64 / n as f64),
                });
            }
        }
    }
}

pub fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input)?;
    let (frames, error) = collect_frames(&data);

    if json {
        let report = StreamJson {
            file: input.display().to_string(),
            size: data.len() as u64,
            blocks: frames.len(),
            frames,
            error,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Stream Information");
    println!("==================");
    println!("File: {}", input.display());
    println!("Size: {} ({} bytes)", format_size(data.len() as u64), data.len());
    println!("Blocks: {}", frames.len());

    if !frames.is_empty() {
        let tables: usize = frames.iter().map(|f| f.code_table_len).sum();
        let payloads: usize = frames.iter().map(|f| f.payload_len).sum();
        println!("  Frame headers: {} bytes", frames.len() * FRAME_OVERHEAD);
        println!("  Code tables:   {} bytes", tables);
        println!("  Payloads:      {} bytes", payloads);

        println!();
        println!(
            "{:>6}  {:>10}  {:>10}  {:>6}  {:>6}  {:>10}  {:>10}  {:>8}  {:>8}",
            "Block", "Offset", "Primary", "Codes", "Table", "Payload", "Size", "Entropy", "Bits/B"
        );
        for frame in &frames {
            let codes = frame
                .codes
                .map_or_else(|| "?".to_string(), |n| n.to_string());
            let size = frame
                .block_len
                .map_or_else(|| "?".to_string(), |n| n.to_string());
            let entropy = frame
                .entropy
                .map_or_else(|| "?".to_string(), |e| format!("{:.3}", e));
            let bits = frame
                .bits_per_byte
                .map_or_else(|| "?".to_string(), |b| format!("{:.3}", b));
            println!(
                "{:>6}  {:>10}  {:>10}  {:>6}  {:>6}  {:>10}  {:>10}  {:>8}  {:>8}",
                frame.index,
                frame.offset,
                frame.primary_index,
                codes,
                frame.code_table_len,
                frame.payload_len,
                size,
                entropy,
                bits
            );
        }
    }

    if let Some(err) = error {
        println!();
        println!("Warning: stream framing broken at {}", err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bwtpack::{PipelineConfig, compress, frame_infos};

    #[test]
    fn test_collect_frames_matches_library() {
        let data = b"information please ".repeat(30);
        let compressed = compress(&data, &PipelineConfig::new(128)).unwrap();

        let (frames, error) = collect_frames(&compressed);
        let infos = frame_infos(&compressed).unwrap();

        assert!(error.is_none());
        assert_eq!(frames.len(), infos.len());
        for (frame, info) in frames.iter().zip(&infos) {
            assert_eq!(frame.offset, info.offset);
            assert_eq!(frame.payload_len, info.payload_len);
            assert!(frame.codes.is_some());
            assert_eq!(frame.block_len, Some(128.min(data.len() - 128 * frame.index)));
        }
    }

    #[test]
    fn test_entropy_columns() {
        let compressed = compress(&[b'q'; 500], &PipelineConfig::default()).unwrap();
        let (frames, _) = collect_frames(&compressed);

        assert_eq!(frames[0].entropy, Some(0.0));
        let bits = frames[0].bits_per_byte.unwrap();
        assert!(bits > 0.0 && bits < 1.0);
    }

    #[test]
    fn test_undecodable_block_keeps_header_fields() {
        let mut compressed = compress(b"bad primary index", &PipelineConfig::default()).unwrap();
        compressed[..4].copy_from_slice(&u32::MAX.to_be_bytes());

        let (frames, error) = collect_frames(&compressed);
        assert!(error.is_none());
        assert_eq!(frames[0].primary_index, u32::MAX);
        assert!(frames[0].block_len.is_none());
        assert!(frames[0].entropy.is_none());
    }

    #[test]
    fn test_json_shape() {
        let compressed = compress(b"json", &PipelineConfig::default()).unwrap();
        let (frames, error) = collect_frames(&compressed);
        let report = StreamJson {
            file: "x.bwp".to_string(),
            size: compressed.len() as u64,
            blocks: frames.len(),
            frames,
            error,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["blocks"], 1);
        assert_eq!(value["frames"][0]["index"], 0);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_broken_framing_reported() {
        let compressed = compress(b"broken", &PipelineConfig::default()).unwrap();
        let (frames, error) = collect_frames(&compressed[..compressed.len() - 1]);
        assert!(frames.is_empty());
        assert!(error.is_some_and(|e| e.starts_with("block 0")));
    }
}
