//! MSB-first bit-level I/O for the Huffman payload.
//!
//! Huffman codes are written as bit strings in reading order: the first bit of
//! a code lands in the most significant free bit of the current byte. The
//! final byte is padded with zero bits.
//!
//! # Example
//!
//! ```
//! use bwtpack_core::bitstream::{MsbBitReader, MsbBitWriter};
//!
//! let mut writer = MsbBitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_bits(0b1100, 4);
//! assert_eq!(writer.padding_bits(), 1);
//! let bytes = writer.into_bytes();
//! assert_eq!(bytes, vec![0b1011_1000]);
//!
//! let mut reader = MsbBitReader::with_bit_len(&bytes, 7);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! assert!(reader.is_exhausted());
//! ```

use crate::error::{BwtPackError, Result};

/// MSB-first bit reader over a byte slice.
///
/// The reader can be limited to a bit length shorter than the slice so that
/// trailing padding is never interpreted as data.
#[derive(Debug)]
pub struct MsbBitReader<'a> {
    /// Input data.
    data: &'a [u8],
    /// Number of readable bits.
    bit_len: u64,
    /// Next bit to read.
    position: u64,
}

impl<'a> MsbBitReader<'a> {
    /// Create a reader over every bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_bit_len(data, data.len() as u64 * 8)
    }

    /// Create a reader over the first `bit_len` bits of `data`.
    ///
    /// `bit_len` is clamped to the bits actually present.
    pub fn with_bit_len(data: &'a [u8], bit_len: u64) -> Self {
        Self {
            data,
            bit_len: bit_len.min(data.len() as u64 * 8),
            position: 0,
        }
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.position >= self.bit_len {
            return Err(BwtPackError::invalid_code(self.position));
        }
        let byte = self.data[(self.position / 8) as usize];
        let shift = 7 - (self.position % 8) as u8;
        self.position += 1;
        Ok((byte >> shift) & 1 == 1)
    }

    /// Read up to 32 bits, first bit read in the most significant position.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    /// Total bits read so far.
    pub fn bits_read(&self) -> u64 {
        self.position
    }

    /// Bits left before the limit.
    pub fn bits_remaining(&self) -> u64 {
        self.bit_len - self.position
    }

    /// Whether every readable bit has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.bit_len
    }
}

/// MSB-first bit writer that accumulates into a `Vec<u8>`.
#[derive(Debug, Default)]
pub struct MsbBitWriter {
    /// Output buffer.
    output: Vec<u8>,
    /// Bit buffer (MSB-first), fewer than 8 pending bits between calls.
    buffer: u64,
    /// Number of bits in buffer.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl MsbBitWriter {
    /// Create a new writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new writer with room for `bytes` output bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            output: Vec::with_capacity(bytes),
            ..Self::default()
        }
    }

    /// Write the low `count` bits of `value`, most significant first.
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        if count == 0 {
            return;
        }

        let mask = if count == 32 {
            u32::MAX
        } else {
            (1u32 << count) - 1
        };
        self.buffer = (self.buffer << count) | (value & mask) as u64;
        self.bits_in_buffer += count;
        self.total_bits_written += count as u64;

        while self.bits_in_buffer >= 8 {
            self.output
                .push((self.buffer >> (self.bits_in_buffer - 8)) as u8);
            self.bits_in_buffer -= 8;
        }
        self.buffer &= (1u64 << self.bits_in_buffer) - 1;
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u32, 1);
    }

    /// Write a code of up to 64 bits, most significant first.
    pub fn write_code(&mut self, bits: u64, len: u8) {
        debug_assert!(len <= 64, "Cannot write codes longer than 64 bits");

        if len > 32 {
            self.write_bits((bits >> 32) as u32, len - 32);
            self.write_bits(bits as u32, 32);
        } else {
            self.write_bits(bits as u32, len);
        }
    }

    /// Total bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Number of zero bits [`into_bytes`](Self::into_bytes) will append (0-7).
    pub fn padding_bits(&self) -> u8 {
        (8 - self.bits_in_buffer) % 8
    }

    /// Pad the final partial byte with zeros and return the output.
    pub fn into_bytes(mut self) -> Vec<u8> {
        if self.bits_in_buffer > 0 {
            let remaining = 8 - self.bits_in_buffer;
            self.output.push((self.buffer << remaining) as u8);
        }
        self.output
    }
}
