//! Criterion benchmarks for the bwtpack pipeline
//!
//! This benchmark suite evaluates:
//! - Compression/decompression speed across data patterns
//! - Block size impact on speed
//! - Individual stage cost (BWT, MTF, RLE, Huffman)
//! - Parallel vs. serial compression (with the `parallel` feature)

use bwtpack::{PipelineConfig, bwt, compress, decompress, huffman, mtf, rle};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

#[cfg(feature = "parallel")]
use bwtpack::{compress_parallel, decompress_parallel};

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Uniform data - a single repeated byte
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    /// Random data - no patterns (worst compression)
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Repetitive pattern - long identical contexts
    pub fn repetitive(size: usize) -> Vec<u8> {
        b"TOBEORNOTTOBEORTOBEORNOT"
            .iter()
            .cycle()
            .take(size)
            .copied()
            .collect()
    }

    /// Text-like data - realistic scenario
    pub fn text_like(size: usize) -> Vec<u8> {
        let text: &[u8] = b"The quick brown fox jumps over the lazy dog. \
                     Pack my box with five dozen liquor jugs. \
                     How vexingly quick daft zebras jump! \
                     Lorem ipsum dolor sit amet, consectetur adipiscing elit. ";
        text.iter().cycle().take(size).copied().collect()
    }
}

mod data_sizes {
    pub const TINY: usize = 1024; // 1 KB
    pub const SMALL: usize = 16 * 1024; // 16 KB
    pub const MEDIUM: usize = 64 * 1024; // 64 KB
    pub const LARGE: usize = 1024 * 1024; // 1 MB
}

/// Benchmark compression across data patterns
fn bench_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("patterns");
    let size = data_sizes::MEDIUM;

    let patterns: [(&str, PatternGenerator); 4] = [
        ("uniform", test_data::uniform),
        ("random", test_data::random),
        ("repetitive", test_data::repetitive),
        ("text", test_data::text_like),
    ];

    for (name, generator) in patterns {
        let data = generator(size);
        let config = PipelineConfig::default();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("compress", name), &data, |b, data| {
            b.iter(|| black_box(compress(black_box(data), &config).unwrap()));
        });

        let compressed = compress(&data, &config).unwrap();
        group.bench_with_input(
            BenchmarkId::new("decompress", name),
            &compressed,
            |b, compressed| {
                b.iter(|| black_box(decompress(black_box(compressed)).unwrap()));
            },
        );
    }

    group.finish();
}

/// Benchmark the effect of block size on compression speed
fn bench_block_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_sizes");
    let data = test_data::text_like(data_sizes::LARGE);

    for block_size in [data_sizes::SMALL, data_sizes::MEDIUM, 256 * 1024] {
        let config = PipelineConfig::new(block_size);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}KB", block_size / 1024)),
            &data,
            |b, data| {
                b.iter(|| black_box(compress(black_box(data), &config).unwrap()));
            },
        );
    }

    group.finish();
}

/// Benchmark each stage on its own
fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");

    for (size_name, size) in [("1KB", data_sizes::TINY), ("64KB", data_sizes::MEDIUM)] {
        let data = test_data::text_like(size);
        let transformed = bwt::forward(&data).unwrap();
        let ranks = mtf::encode(&transformed.data);
        let runs = rle::encode(&ranks);
        let (payload, table) = huffman::encode(&runs);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("bwt_forward", size_name), &data, |b, d| {
            b.iter(|| black_box(bwt::forward(black_box(d)).unwrap()));
        });
        group.bench_with_input(
            BenchmarkId::new("bwt_inverse", size_name),
            &transformed,
            |b, t| {
                b.iter(|| black_box(bwt::inverse(black_box(&t.data), t.primary_index).unwrap()));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("mtf", size_name),
            &transformed.data,
            |b, d| {
                b.iter(|| black_box(mtf::encode(black_box(d))));
            },
        );
        group.bench_with_input(BenchmarkId::new("rle", size_name), &ranks, |b, d| {
            b.iter(|| black_box(rle::encode(black_box(d))));
        });
        group.bench_with_input(BenchmarkId::new("huffman_encode", size_name), &runs, |b, d| {
            b.iter(|| black_box(huffman::encode(black_box(d))));
        });
        group.bench_with_input(
            BenchmarkId::new("huffman_decode", size_name),
            &payload,
            |b, p| {
                b.iter(|| black_box(huffman::decode(black_box(p), &table).unwrap()));
            },
        );
    }

    group.finish();
}

/// Benchmark parallel against serial compression
#[cfg(feature = "parallel")]
fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel");
    let data = test_data::text_like(data_sizes::LARGE);
    let config = PipelineConfig::new(data_sizes::MEDIUM);
    let compressed = compress(&data, &config).unwrap();

    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("compress_serial", |b| {
        b.iter(|| black_box(compress(black_box(&data), &config).unwrap()));
    });
    group.bench_function("compress_parallel", |b| {
        b.iter(|| black_box(compress_parallel(black_box(&data), &config).unwrap()));
    });
    group.bench_function("decompress_serial", |b| {
        b.iter(|| black_box(decompress(black_box(&compressed)).unwrap()));
    });
    group.bench_function("decompress_parallel", |b| {
        b.iter(|| black_box(decompress_parallel(black_box(&compressed), &config).unwrap()));
    });

    group.finish();
}

#[cfg(not(feature = "parallel"))]
criterion_group!(benches, bench_patterns, bench_block_sizes, bench_stages);

#[cfg(feature = "parallel")]
criterion_group!(
    benches,
    bench_patterns,
    bench_block_sizes,
    bench_stages,
    bench_parallel
);

criterion_main!(benches);
