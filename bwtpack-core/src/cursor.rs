//! Bounds-checked big-endian reads over a byte slice.

use crate::error::{BwtPackError, Result};

/// A forward-only cursor over a byte slice.
///
/// Every read that would run past the end fails with
/// [`BwtPackError::TruncatedInput`] naming what was being read.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `len` bytes.
    pub fn take(&mut self, len: usize, context: &'static str) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(BwtPackError::truncated(context, len, self.remaining()));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Read one byte.
    pub fn read_u8(&mut self, context: &'static str) -> Result<u8> {
        Ok(self.take(1, context)?[0])
    }

    /// Read a big-endian `u16`.
    pub fn read_u16_be(&mut self, context: &'static str) -> Result<u16> {
        let bytes = self.take(2, context)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big-endian `u32`.
    pub fn read_u32_be(&mut self, context: &'static str) -> Result<u32> {
        let bytes = self.take(4, context)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_big_endian() {
        let data = [0x00, 0x01, 0x12, 0x34, 0x56, 0x78, 0xFF];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u16_be("a").unwrap(), 1);
        assert_eq!(cursor.read_u32_be("b").unwrap(), 0x1234_5678);
        assert_eq!(cursor.read_u8("c").unwrap(), 0xFF);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_truncated_read() {
        let data = [0x00, 0x01];
        let mut cursor = ByteCursor::new(&data);
        let err = cursor.read_u32_be("payload length").unwrap_err();
        match err {
            BwtPackError::TruncatedInput {
                context,
                needed,
                available,
            } => {
                assert_eq!(context, "payload length");
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        // A failed read does not advance the cursor.
        assert_eq!(cursor.position(), 0);
    }
}
