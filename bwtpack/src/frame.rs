//! Frame layout.
//!
//! A compressed stream is a plain sequence of frames, one per block, with no
//! stream header or trailer:
//!
//! ```text
//! frame := primaryIndex:u32(BE)
//!          codeTableLen:u32(BE) codeTable:bytes[codeTableLen]
//!          payloadLen:u32(BE)   payload:bytes[payloadLen]
//! ```
//!
//! [`FrameRef`] borrows a frame out of an in-memory stream; [`Frame`] owns
//! one read from an [`io::Read`](Read) source or produced by the encoder.

use bwtpack_core::{ByteCursor, Stage};
use bwtpack_core::error::{BwtPackError, Result};
use std::io::{ErrorKind, Read};

/// Bytes of fixed-size fields in every frame.
pub const FRAME_OVERHEAD: usize = 12;

/// Largest serialized code table: a 2-byte count plus 256 entries of
/// symbol, length and up to 8 code bytes.
pub const MAX_CODE_TABLE_LEN: usize = 2 + 256 * 10;

/// A frame with owned contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Row of the sorted rotation matrix holding the original block.
    pub primary_index: u32,
    /// Serialized Huffman code table.
    pub code_table: Vec<u8>,
    /// Padded Huffman payload.
    pub payload: Vec<u8>,
}

/// A frame borrowed from an in-memory stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRef<'a> {
    /// Row of the sorted rotation matrix holding the original block.
    pub primary_index: u32,
    /// Serialized Huffman code table.
    pub code_table: &'a [u8],
    /// Padded Huffman payload.
    pub payload: &'a [u8],
}

impl Frame {
    /// Borrow this frame.
    pub fn view(&self) -> FrameRef<'_> {
        FrameRef {
            primary_index: self.primary_index,
            code_table: &self.code_table,
            payload: &self.payload,
        }
    }

    /// Total serialized size in bytes.
    pub fn encoded_len(&self) -> usize {
        self.view().encoded_len()
    }

    /// Serialize this frame into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.view().write_to(&mut out)?;
        Ok(out)
    }

    /// Read the next frame from `reader`.
    ///
    /// Returns `Ok(None)` when the reader is at EOF on a frame boundary. EOF
    /// anywhere inside a frame is [`BwtPackError::TruncatedInput`].
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let mut word = [0u8; 4];
        let got = read_full(reader, &mut word)?;
        if got == 0 {
            return Ok(None);
        }
        if got < word.len() {
            return Err(BwtPackError::truncated("primary index", 4, got));
        }
        let primary_index = u32::from_be_bytes(word);

        let table_len = read_len(reader, "code table length")?;
        if table_len > MAX_CODE_TABLE_LEN {
            return Err(BwtPackError::malformed_table(format!(
                "declared length {table_len} exceeds {MAX_CODE_TABLE_LEN}"
            )));
        }
        let code_table = read_body(reader, table_len, "code table")?;

        let payload_len = read_len(reader, "payload length")?;
        let payload = read_body(reader, payload_len, "payload")?;

        Ok(Some(Self {
            primary_index,
            code_table,
            payload,
        }))
    }
}

impl<'a> FrameRef<'a> {
    /// Total serialized size in bytes.
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.code_table.len() + self.payload.len()
    }

    /// Append the serialized frame to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<()> {
        let table_len = length_field(self.code_table.len(), "code table")?;
        let payload_len = length_field(self.payload.len(), "payload")?;

        out.extend_from_slice(&self.primary_index.to_be_bytes());
        out.extend_from_slice(&table_len.to_be_bytes());
        out.extend_from_slice(self.code_table);
        out.extend_from_slice(&payload_len.to_be_bytes());
        out.extend_from_slice(self.payload);
        Ok(())
    }

    /// Parse one frame at the cursor position.
    pub fn parse(cursor: &mut ByteCursor<'a>) -> Result<Self> {
        let primary_index = cursor.read_u32_be("primary index")?;
        let table_len = cursor.read_u32_be("code table length")? as usize;
        let code_table = cursor.take(table_len, "code table")?;
        let payload_len = cursor.read_u32_be("payload length")? as usize;
        let payload = cursor.take(payload_len, "payload")?;

        Ok(Self {
            primary_index,
            code_table,
            payload,
        })
    }

    /// Copy into an owned [`Frame`].
    pub fn to_frame(&self) -> Frame {
        Frame {
            primary_index: self.primary_index,
            code_table: self.code_table.to_vec(),
            payload: self.payload.to_vec(),
        }
    }
}

fn length_field(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        BwtPackError::invalid_config(format!("{what} of {len} bytes does not fit a frame"))
    })
}

/// Read until `buf` is full or EOF, returning the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

fn read_len<R: Read>(reader: &mut R, context: &'static str) -> Result<usize> {
    let mut word = [0u8; 4];
    let got = read_full(reader, &mut word)?;
    if got < word.len() {
        return Err(BwtPackError::truncated(context, 4, got));
    }
    Ok(u32::from_be_bytes(word) as usize)
}

fn read_body<R: Read>(reader: &mut R, len: usize, context: &'static str) -> Result<Vec<u8>> {
    // Grow with the data actually present instead of trusting the length field.
    let mut body = Vec::with_capacity(len.min(64 * 1024));
    reader.by_ref().take(len as u64).read_to_end(&mut body)?;
    if body.len() < len {
        return Err(BwtPackError::truncated(context, len, body.len()));
    }
    Ok(body)
}

/// Iterator over the frames of an in-memory stream.
///
/// Stops after the first error.
#[derive(Debug)]
pub struct Frames<'a> {
    cursor: ByteCursor<'a>,
    failed: bool,
}

impl Frames<'_> {
    /// Byte offset of the next frame.
    pub fn offset(&self) -> usize {
        self.cursor.position()
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<FrameRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_empty() {
            return None;
        }
        let frame = FrameRef::parse(&mut self.cursor);
        self.failed = frame.is_err();
        Some(frame)
    }
}

/// Iterate over the frames of `data` without decoding them.
pub fn frames(data: &[u8]) -> Frames<'_> {
    Frames {
        cursor: ByteCursor::new(data),
        failed: false,
    }
}

/// Header summary of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Block index (0-based).
    pub index: usize,
    /// Byte offset of the frame within the stream.
    pub offset: usize,
    /// Primary index stored in the frame.
    pub primary_index: u32,
    /// Serialized code table size.
    pub code_table_len: usize,
    /// Payload size.
    pub payload_len: usize,
}

impl FrameInfo {
    /// Total serialized frame size.
    pub fn frame_len(&self) -> usize {
        FRAME_OVERHEAD + self.code_table_len + self.payload_len
    }
}

/// Describe every frame of `data`.
///
/// A frame that cannot be parsed is reported with its block index.
pub fn frame_infos(data: &[u8]) -> Result<Vec<FrameInfo>> {
    let mut iter = frames(data);
    let mut infos = Vec::new();

    loop {
        let offset = iter.offset();
        let Some(frame) = iter.next() else { break };
        let index = infos.len();
        let frame = frame.map_err(|e| e.in_block(index, Stage::Framed))?;
        infos.push(FrameInfo {
            index,
            offset,
            primary_index: frame.primary_index,
            code_table_len: frame.code_table.len(),
            payload_len: frame.payload.len(),
        });
    }

    Ok(infos)
}
