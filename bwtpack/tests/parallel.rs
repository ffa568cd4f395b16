//! Parallel pipeline tests.

#![cfg(feature = "parallel")]

use bwtpack::{PipelineConfig, compress, compress_parallel, decompress, decompress_parallel};

fn sample(len: usize) -> Vec<u8> {
    let phrase = b"parallel block sorting keeps every block independent; ";
    let mut data: Vec<u8> = phrase.iter().cycle().take(len).copied().collect();
    for (i, byte) in data.iter_mut().enumerate().step_by(97) {
        *byte = (i % 251) as u8;
    }
    data
}

#[test]
fn test_parallel_matches_serial() {
    let data = sample(100_000);
    for block_size in [1000, 4096, 65536] {
        let config = PipelineConfig::new(block_size);
        let serial = compress(&data, &config).expect("serial compress failed");
        let parallel = compress_parallel(&data, &config).expect("parallel compress failed");
        assert_eq!(serial, parallel, "block size {block_size}");
    }
}

#[test]
fn test_parallel_roundtrip() {
    let data = sample(50_000);
    let config = PipelineConfig::new(2048).with_threads(3);

    let compressed = compress_parallel(&data, &config).expect("parallel compress failed");
    assert_eq!(
        decompress_parallel(&compressed, &config).expect("parallel decompress failed"),
        data
    );
    assert_eq!(decompress(&compressed).expect("decompress failed"), data);
}

#[test]
fn test_parallel_empty() {
    let config = PipelineConfig::default();
    let compressed = compress_parallel(b"", &config).expect("parallel compress failed");
    assert!(compressed.is_empty());
    assert!(
        decompress_parallel(&compressed, &config)
            .expect("parallel decompress failed")
            .is_empty()
    );
}

#[test]
fn test_parallel_reports_first_failing_block() {
    let data = sample(10_000);
    let config = PipelineConfig::new(1000);
    let mut compressed = compress(&data, &config).expect("compress failed");

    let infos = bwtpack::frame_infos(&compressed).expect("frame headers");
    for info in [&infos[3], &infos[7]] {
        compressed[info.offset..info.offset + 4].copy_from_slice(&u32::MAX.to_be_bytes());
    }

    let err = decompress_parallel(&compressed, &config).expect_err("corrupt frames must fail");
    assert_eq!(err.block_index(), Some(3));
}
