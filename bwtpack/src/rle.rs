//! Run-Length Encoding.
//!
//! Runs are written as `(count, value)` byte pairs. A run longer than 255 is
//! split into several pairs, and a lone byte is still emitted as `(1, value)`.
//! The format expands data without repetition, but after MTF most of the
//! block is runs of zeros.

use bwtpack_core::error::{BwtPackError, Result};

/// Longest run a single pair can hold.
pub const MAX_RUN: usize = 255;

/// Encode data as `(count, value)` pairs.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len() / 2 + 2);
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        let mut run_len = 1;

        // Count consecutive identical bytes
        while i + run_len < data.len() && data[i + run_len] == byte && run_len < MAX_RUN {
            run_len += 1;
        }

        result.push(run_len as u8);
        result.push(byte);
        i += run_len;
    }

    result
}

/// Decode `(count, value)` pairs.
///
/// Fails with [`BwtPackError::TruncatedInput`] when a pair is cut short and
/// with [`BwtPackError::InvalidRun`] on a zero count.
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    decode_with_limit(data, usize::MAX)
}

/// Decode `(count, value)` pairs, refusing to expand past `limit` bytes.
///
/// The expanded length is summed before anything is allocated; a stream that
/// would exceed `limit` fails with [`BwtPackError::CorruptBlock`].
pub fn decode_with_limit(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    if data.len() % 2 != 0 {
        return Err(BwtPackError::truncated("RLE pair", 2, 1));
    }

    let expanded: usize = data.chunks_exact(2).map(|pair| pair[0] as usize).sum();
    if expanded > limit {
        return Err(BwtPackError::corrupt_block(format!(
            "runs expand to {expanded} bytes, limit is {limit}"
        )));
    }
    let mut result = Vec::with_capacity(expanded);

    for (index, pair) in data.chunks_exact(2).enumerate() {
        let count = pair[0] as usize;
        if count == 0 {
            return Err(BwtPackError::invalid_run(index * 2));
        }
        result.resize(result.len() + count, pair[1]);
    }

    Ok(result)
}
