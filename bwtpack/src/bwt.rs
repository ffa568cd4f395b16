//! Burrows-Wheeler Transform.
//!
//! The BWT is a reversible permutation that groups bytes sharing a right
//! context, so the following move-to-front stage sees long stretches of
//! small ranks.
//!
//! Two variants are provided:
//!
//! - [`forward`] / [`inverse`] record the row of the unrotated block (the
//!   *primary index*) and accept any byte content. The pipeline uses these.
//! - [`forward_with_sentinel`] / [`inverse_with_sentinel`] append a `0x00`
//!   sentinel instead of recording an index. They only work on blocks that
//!   never contain `0x00`.
//!
//! Both inverses use LF-mapping and run in linear time.

use bwtpack_core::error::{BwtPackError, Result};

/// Terminal byte appended by the sentinel variant.
pub const SENTINEL: u8 = 0x00;

/// Output of the explicit-index forward transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BwtBlock {
    /// Last column of the sorted rotation matrix.
    pub data: Vec<u8>,
    /// Row of the sorted matrix holding the original block.
    pub primary_index: u32,
}

/// Perform the Burrows-Wheeler Transform, recording the primary index.
pub fn forward(block: &[u8]) -> Result<BwtBlock> {
    if block.is_empty() {
        return Ok(BwtBlock {
            data: Vec::new(),
            primary_index: 0,
        });
    }

    let n = block.len();
    let order = sort_rotations(block)?;

    let mut data = try_alloc(n)?;
    let mut primary_index = 0u32;
    for (row, &start) in order.iter().enumerate() {
        let start = start as usize;
        if start == 0 {
            primary_index = row as u32;
        }
        data.push(block[(start + n - 1) % n]);
    }

    Ok(BwtBlock {
        data,
        primary_index,
    })
}

/// Invert [`forward`] from the last column and the primary index.
pub fn inverse(last_column: &[u8], primary_index: u32) -> Result<Vec<u8>> {
    let n = last_column.len();
    if n == 0 {
        if primary_index != 0 {
            return Err(BwtPackError::corrupt_block(format!(
                "primary index {primary_index} for an empty block"
            )));
        }
        return Ok(Vec::new());
    }
    if primary_index as usize >= n {
        return Err(BwtPackError::corrupt_block(format!(
            "primary index {primary_index} out of range for {n} bytes"
        )));
    }

    let lf = lf_mapping(last_column)?;
    Ok(walk_lf(last_column, &lf, primary_index as usize, n))
}

/// Perform the sentinel-terminated Burrows-Wheeler Transform.
///
/// The output is one byte longer than the block and contains exactly one
/// [`SENTINEL`]. Fails with [`BwtPackError::SentinelCollision`] if the block
/// already contains the sentinel byte.
pub fn forward_with_sentinel(block: &[u8]) -> Result<Vec<u8>> {
    if let Some(offset) = block.iter().position(|&b| b == SENTINEL) {
        return Err(BwtPackError::sentinel_collision(offset));
    }

    let mut terminated = try_alloc(block.len() + 1)?;
    terminated.extend_from_slice(block);
    terminated.push(SENTINEL);

    let n = terminated.len();
    let order = sort_rotations(&terminated)?;
    Ok(order
        .iter()
        .map(|&start| terminated[(start as usize + n - 1) % n])
        .collect())
}

/// Invert [`forward_with_sentinel`].
///
/// Fails with [`BwtPackError::CorruptBlock`] if the input is empty or does not
/// hold exactly one sentinel.
pub fn inverse_with_sentinel(transformed: &[u8]) -> Result<Vec<u8>> {
    if transformed.is_empty() {
        return Err(BwtPackError::corrupt_block("empty sentinel-terminated block"));
    }

    let mut sentinels = transformed
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == SENTINEL)
        .map(|(row, _)| row);
    let sentinel_row = match (sentinels.next(), sentinels.next()) {
        (Some(row), None) => row,
        (None, _) => return Err(BwtPackError::corrupt_block("sentinel missing")),
        (Some(_), Some(_)) => return Err(BwtPackError::corrupt_block("sentinel duplicated")),
    };

    let lf = lf_mapping(transformed)?;
    // The sentinel row holds the original text; one LF step back lands on the
    // rotation that starts with the sentinel, whose last byte ends the block.
    let start = lf[sentinel_row] as usize;
    Ok(walk_lf(transformed, &lf, start, transformed.len() - 1))
}

/// Row offsets and LF entries are stored as `u32`.
fn check_index_width(n: usize) -> Result<()> {
    if n > u32::MAX as usize {
        return Err(BwtPackError::resource_exhausted(n));
    }
    Ok(())
}

/// Sort the cyclic rotations of `data`, returning their start offsets in order.
///
/// Prefix doubling: after the round with step `k`, ranks order rotations by
/// their first `2k` bytes. Once `2k >= n` whole rotations are compared, and
/// rotations that still share a rank are identical.
fn sort_rotations(data: &[u8]) -> Result<Vec<u32>> {
    let n = data.len();
    check_index_width(n)?;

    let mut order = try_alloc(n)?;
    order.extend(0..n as u32);
    let mut rank = try_alloc(n)?;
    rank.extend(data.iter().map(|&b| b as u32));
    let mut next_rank = try_alloc(n)?;
    next_rank.resize(n, 0u32);

    let mut k = 1usize;
    loop {
        let key = |i: u32| {
            let i = i as usize;
            (rank[i], rank[(i + k) % n])
        };
        order.sort_unstable_by_key(|&i| key(i));

        next_rank[order[0] as usize] = 0;
        for w in 1..n {
            let bump = (key(order[w - 1]) != key(order[w])) as u32;
            next_rank[order[w] as usize] = next_rank[order[w - 1] as usize] + bump;
        }
        std::mem::swap(&mut rank, &mut next_rank);

        if rank[order[n - 1] as usize] as usize == n - 1 || 2 * k >= n {
            break;
        }
        k *= 2;
    }

    Ok(order)
}

/// Build the LF mapping of a last column.
///
/// `LF[i] = C[L[i]] + occ(L[i], i)`, where `C[c]` counts bytes smaller than
/// `c` and `occ` counts earlier occurrences of the same byte.
fn lf_mapping(last_column: &[u8]) -> Result<Vec<u32>> {
    check_index_width(last_column.len())?;

    let mut counts = [0u32; 256];
    for &byte in last_column {
        counts[byte as usize] += 1;
    }

    let mut next = [0u32; 256];
    let mut total = 0u32;
    for (slot, &count) in next.iter_mut().zip(counts.iter()) {
        *slot = total;
        total += count;
    }

    let mut lf = try_alloc(last_column.len())?;
    for &byte in last_column {
        lf.push(next[byte as usize]);
        next[byte as usize] += 1;
    }
    Ok(lf)
}

/// Emit `count` bytes walking LF backwards from `row`, then restore text order.
fn walk_lf(last_column: &[u8], lf: &[u32], mut row: usize, count: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(last_column[row]);
        row = lf[row] as usize;
    }
    out.reverse();
    out
}

fn try_alloc<T>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| BwtPackError::resource_exhausted(len))?;
    Ok(v)
}
