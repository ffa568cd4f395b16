//! End-to-end pipeline tests.

use bwtpack::huffman::CodeTable;
use bwtpack::{
    BlockDecoder, BlockEncoder, PipelineConfig, compress, compress_stream, decompress,
    decompress_stream, frame_infos, frames,
};

/// Deterministic pseudo-random bytes.
fn lcg_bytes(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 16) as u8
        })
        .collect()
}

fn roundtrip(data: &[u8], config: &PipelineConfig) -> Vec<u8> {
    let compressed = compress(data, config).expect("compression failed");
    decompress(&compressed).expect("decompression failed")
}

#[test]
fn test_roundtrip_empty() {
    let compressed = compress(b"", &PipelineConfig::default()).expect("compression failed");
    assert!(compressed.is_empty(), "empty input must produce no frames");
    assert!(decompress(&compressed).expect("decompression failed").is_empty());
}

#[test]
fn test_roundtrip_single_byte() {
    for byte in [0x00, 0x41, 0xFF] {
        assert_eq!(roundtrip(&[byte], &PipelineConfig::default()), vec![byte]);
    }
}

#[test]
fn test_roundtrip_all_ff() {
    let original = vec![0xFFu8; 300];
    assert_eq!(roundtrip(&original, &PipelineConfig::default()), original);
}

#[test]
fn test_roundtrip_single_symbol_block() {
    let original = vec![0x41u8; 64];
    let compressed = compress(&original, &PipelineConfig::default()).expect("compression failed");
    assert_eq!(frames(&compressed).count(), 1);
    assert!(compressed.len() < original.len());

    assert_eq!(decompress(&compressed).expect("decompression failed"), original);
}

#[test]
fn test_frame_tables_are_prefix_free() {
    let original = lcg_bytes(10_000, 9);
    let compressed = compress(&original, &PipelineConfig::new(2500)).expect("compression failed");

    for frame in frames(&compressed) {
        let frame = frame.expect("valid frame");
        let table = CodeTable::deserialize(frame.code_table).expect("valid table");
        assert!(table.is_prefix_free());
    }
}

#[test]
fn test_roundtrip_binary_with_zeros() {
    // Zero bytes are ordinary data; the primary index is stored explicitly.
    let original: Vec<u8> = (0..4096u32).map(|i| if i % 3 == 0 { 0 } else { i as u8 }).collect();
    assert_eq!(roundtrip(&original, &PipelineConfig::new(1000)), original);
}

#[test]
fn test_roundtrip_text() {
    let original = b"It was the best of times, it was the worst of times, ".repeat(50);
    let compressed = compress(&original, &PipelineConfig::default()).expect("compression failed");

    println!("Original size: {} bytes", original.len());
    println!("Compressed size: {} bytes", compressed.len());

    assert!(compressed.len() < original.len());
    assert_eq!(decompress(&compressed).expect("decompression failed"), original);
}

#[test]
fn test_roundtrip_random_sizes() {
    for (seed, len) in [(1, 2), (2, 17), (3, 255), (4, 256), (5, 1000), (6, 8191)] {
        let original = lcg_bytes(len, seed);
        assert_eq!(
            roundtrip(&original, &PipelineConfig::new(512)),
            original,
            "len {len}"
        );
    }
}

#[test]
fn test_multi_block_fidelity() {
    let block_size = 4096;
    let original = lcg_bytes(block_size * 3 + 123, 42);
    let compressed =
        compress(&original, &PipelineConfig::new(block_size)).expect("compression failed");

    let infos = frame_infos(&compressed).expect("frame headers");
    assert_eq!(infos.len(), 4);
    assert_eq!(infos.last().map(|i| i.offset + i.frame_len()), Some(compressed.len()));

    assert_eq!(decompress(&compressed).expect("decompression failed"), original);
}

#[test]
fn test_block_size_one() {
    let original = b"per-byte blocks";
    let compressed = compress(original, &PipelineConfig::new(1)).expect("compression failed");
    assert_eq!(frames(&compressed).count(), original.len());
    assert_eq!(decompress(&compressed).expect("decompression failed"), original);
}

#[test]
fn test_streaming_matches_in_memory() {
    let original = lcg_bytes(20_000, 7);
    let config = PipelineConfig::new(3000);

    let mut compressed = Vec::new();
    let stats = compress_stream(&original[..], &mut compressed, &config).expect("compress_stream");
    assert_eq!(stats.blocks, 7);
    assert_eq!(stats.bytes_in, original.len() as u64);
    assert_eq!(stats.bytes_out, compressed.len() as u64);
    assert_eq!(compressed, compress(&original, &config).expect("compression failed"));

    let mut restored = Vec::new();
    let stats = decompress_stream(&compressed[..], &mut restored).expect("decompress_stream");
    assert_eq!(stats.blocks, 7);
    assert_eq!(restored, original);
}

#[test]
fn test_encoder_decoder_blocks() {
    let mut encoder =
        BlockEncoder::new(Vec::new(), PipelineConfig::default()).expect("valid config");
    encoder.write_block(b"first block").expect("write");
    encoder.write_block(b"second").expect("write");
    let (compressed, stats) = encoder.finish().expect("finish");
    assert_eq!(stats.blocks, 2);

    let mut decoder = BlockDecoder::new(&compressed[..]);
    assert_eq!(decoder.read_block().expect("read").as_deref(), Some(&b"first block"[..]));
    assert_eq!(decoder.read_block().expect("read").as_deref(), Some(&b"second"[..]));
    assert_eq!(decoder.read_block().expect("read"), None);
}
