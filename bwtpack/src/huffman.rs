//! Huffman coding with a persisted code table.
//!
//! Each block gets its own prefix code, built from the block's byte
//! frequencies. The code table travels with the payload, so the decoder never
//! rebuilds the tree; it only needs the table to be prefix-free.
//!
//! Payload layout: one byte holding the number of zero padding bits (0-7),
//! followed by the MSB-first packed codes.

use bwtpack_core::bitstream::{MsbBitReader, MsbBitWriter};
use bwtpack_core::cursor::ByteCursor;
use bwtpack_core::error::{BwtPackError, Result};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

/// Maximum code length accepted in a serialized table.
///
/// A code of depth `d` needs a total frequency of at least `Fib(d + 2)`, so
/// blocks within the configured size limit stay far below this bound.
pub const MAX_CODE_LEN: u8 = 64;

/// Number of distinct symbols (byte values).
pub const NUM_SYMBOLS: usize = 256;

/// A variable-length code, most significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    /// Code bits, right-aligned.
    pub bits: u64,
    /// Number of significant bits (1-64).
    pub len: u8,
}

impl Code {
    /// Checked constructor: `len` must be 1 to [`MAX_CODE_LEN`] and `bits`
    /// must fit in `len` bits.
    pub fn new(bits: u64, len: u8) -> Result<Self> {
        let code = Self { bits, len };
        code.validate()?;
        Ok(code)
    }

    fn validate(&self) -> Result<()> {
        if self.len == 0 || self.len > MAX_CODE_LEN {
            return Err(BwtPackError::malformed_table(format!(
                "code length {} outside 1..={MAX_CODE_LEN}",
                self.len
            )));
        }
        if self.len < 64 && self.bits >> self.len != 0 {
            return Err(BwtPackError::malformed_table(format!(
                "code bits {:#x} wider than {} bits",
                self.bits, self.len
            )));
        }
        Ok(())
    }

    /// Bit `index` of the code, counting from the first bit written.
    ///
    /// Indices at or past `len` read as `false`.
    #[inline]
    pub fn bit(&self, index: u8) -> bool {
        if index >= self.len {
            return false;
        }
        (self.bits >> (self.len - 1 - index)) & 1 == 1
    }

    fn child(self, bit: bool) -> Self {
        Self {
            bits: (self.bits << 1) | bit as u64,
            len: self.len + 1,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.bit(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Mapping from byte value to its code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Option<Code>; NUM_SYMBOLS],
}

impl CodeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            codes: [None; NUM_SYMBOLS],
        }
    }

    /// Code assigned to `symbol`, if any.
    pub fn get(&self, symbol: u8) -> Option<Code> {
        self.codes[symbol as usize]
    }

    /// Assign `code` to `symbol`, replacing any previous code.
    ///
    /// Fails with [`BwtPackError::MalformedCodeTable`] if the code length is
    /// zero, exceeds [`MAX_CODE_LEN`], or the bits do not fit the length.
    pub fn insert(&mut self, symbol: u8, code: Code) -> Result<()> {
        code.validate()?;
        self.set(symbol, code);
        Ok(())
    }

    fn set(&mut self, symbol: u8, code: Code) {
        self.codes[symbol as usize] = Some(code);
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    /// Whether no symbol has a code.
    pub fn is_empty(&self) -> bool {
        self.codes.iter().all(|c| c.is_none())
    }

    /// Coded symbols in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.map(|c| (symbol as u8, c)))
    }

    /// Whether no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        DecodeTrie::from_table(self).is_ok()
    }

    /// Serialize as `count:u16 BE` then `(symbol, len, bits)` entries.
    ///
    /// Code bits are left-aligned in `ceil(len / 8)` bytes with zero padding.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.len() * 4);
        out.extend_from_slice(&(self.len() as u16).to_be_bytes());

        for (symbol, code) in self.iter() {
            out.push(symbol);
            out.push(code.len);
            let aligned = code.bits << (64 - code.len as u32);
            let num_bytes = (code.len as usize).div_ceil(8);
            out.extend_from_slice(&aligned.to_be_bytes()[..num_bytes]);
        }

        out
    }

    /// Parse a table written by [`serialize`](Self::serialize).
    ///
    /// Any inconsistency, including a code set that is not prefix-free, is
    /// reported as [`BwtPackError::MalformedCodeTable`].
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(bytes);
        let count = cursor.read_u16_be("code table count").map_err(as_malformed)? as usize;
        if count > NUM_SYMBOLS {
            return Err(BwtPackError::malformed_table(format!(
                "{count} entries exceed the {NUM_SYMBOLS}-symbol alphabet"
            )));
        }

        let mut table = Self::new();
        for _ in 0..count {
            let symbol = cursor.read_u8("code table symbol").map_err(as_malformed)?;
            let len = cursor.read_u8("code length").map_err(as_malformed)?;
            if len == 0 || len > MAX_CODE_LEN {
                return Err(BwtPackError::malformed_table(format!(
                    "symbol {symbol:#04x} has code length {len}"
                )));
            }
            if table.get(symbol).is_some() {
                return Err(BwtPackError::malformed_table(format!(
                    "duplicate symbol {symbol:#04x}"
                )));
            }

            let num_bytes = (len as usize).div_ceil(8);
            let raw = cursor.take(num_bytes, "code bits").map_err(as_malformed)?;
            let mut buf = [0u8; 8];
            buf[..num_bytes].copy_from_slice(raw);
            let aligned = u64::from_be_bytes(buf);
            if len < 64 && aligned << len != 0 {
                return Err(BwtPackError::malformed_table(format!(
                    "symbol {symbol:#04x} has nonzero padding bits"
                )));
            }

            table.set(
                symbol,
                Code {
                    bits: aligned >> (64 - len as u32),
                    len,
                },
            );
        }

        if !cursor.is_empty() {
            return Err(BwtPackError::malformed_table(format!(
                "{} trailing bytes after {count} entries",
                cursor.remaining()
            )));
        }

        DecodeTrie::from_table(&table)?;
        Ok(table)
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::new()
    }
}

fn as_malformed(err: BwtPackError) -> BwtPackError {
    BwtPackError::malformed_table(err.to_string())
}

/// Node of the Huffman tree arena.
#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(u8),
    Internal { left: usize, right: usize },
}

/// Build a code table from per-symbol frequencies.
///
/// Nodes wait in a min-heap keyed by `(frequency, sequence)`; leaves get
/// sequence numbers in ascending symbol order and merged nodes get the next
/// free number, so equal frequencies always merge in insertion order. The
/// first node popped becomes the left (`0`) child.
pub fn build_code_table(freqs: &[u64; NUM_SYMBOLS]) -> CodeTable {
    let mut table = CodeTable::new();
    let mut nodes: Vec<Node> = Vec::new();
    let mut heap = BinaryHeap::new();
    let mut sequence = 0u32;

    for (symbol, &freq) in freqs.iter().enumerate() {
        if freq > 0 {
            nodes.push(Node::Leaf(symbol as u8));
            heap.push(Reverse((freq, sequence, nodes.len() - 1)));
            sequence += 1;
        }
    }

    match heap.len() {
        0 => return table,
        1 => {
            // A lone symbol still needs one bit per occurrence.
            if let Some(Node::Leaf(symbol)) = nodes.first().copied() {
                table.set(symbol, Code { bits: 0, len: 1 });
            }
            return table;
        }
        _ => {}
    }

    while heap.len() > 1 {
        let (Some(Reverse((left_freq, _, left))), Some(Reverse((right_freq, _, right)))) =
            (heap.pop(), heap.pop())
        else {
            break;
        };
        nodes.push(Node::Internal { left, right });
        heap.push(Reverse((left_freq + right_freq, sequence, nodes.len() - 1)));
        sequence += 1;
    }

    let Some(Reverse((_, _, root))) = heap.pop() else {
        return table;
    };

    // Explicit stack instead of recursion; left children are visited first.
    let mut stack = vec![(root, Code { bits: 0, len: 0 })];
    while let Some((index, code)) = stack.pop() {
        match nodes[index] {
            Node::Leaf(symbol) => {
                debug_assert!(code.len <= MAX_CODE_LEN);
                table.set(symbol, code);
            }
            Node::Internal { left, right } => {
                stack.push((right, code.child(true)));
                stack.push((left, code.child(false)));
            }
        }
    }

    table
}

/// Count byte frequencies.
pub fn frequencies(data: &[u8]) -> [u64; NUM_SYMBOLS] {
    let mut freqs = [0u64; NUM_SYMBOLS];
    for &byte in data {
        freqs[byte as usize] += 1;
    }
    freqs
}

/// Shannon entropy of `data` in bits per byte (0.0 to 8.0).
///
/// This is the lower bound for any order-0 code over the same bytes.
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let total = data.len() as f64;
    frequencies(data)
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Huffman-encode `data`, returning the padded payload and its code table.
pub fn encode(data: &[u8]) -> (Vec<u8>, CodeTable) {
    let table = build_code_table(&frequencies(data));

    let mut writer = MsbBitWriter::with_capacity(data.len() / 2 + 1);
    for &byte in data {
        if let Some(code) = table.get(byte) {
            writer.write_code(code.bits, code.len);
        }
    }

    let pad = writer.padding_bits();
    let packed = writer.into_bytes();
    let mut payload = Vec::with_capacity(packed.len() + 1);
    payload.push(pad);
    payload.extend_from_slice(&packed);

    (payload, table)
}

/// Decode a payload produced by [`encode`] using its code table.
///
/// Fails with [`BwtPackError::InvalidCode`] when the bits leave the code trie
/// or end in the middle of a code, and with
/// [`BwtPackError::TruncatedInput`] when the pad byte is missing.
pub fn decode(payload: &[u8], table: &CodeTable) -> Result<Vec<u8>> {
    decode_with_limit(payload, table, usize::MAX)
}

/// Like [`decode`], but fails with [`BwtPackError::CorruptBlock`] once the
/// output would grow past `limit` symbols.
pub fn decode_with_limit(payload: &[u8], table: &CodeTable, limit: usize) -> Result<Vec<u8>> {
    let (&pad, packed) = payload
        .split_first()
        .ok_or_else(|| BwtPackError::truncated("Huffman pad byte", 1, 0))?;
    if pad > 7 || (packed.is_empty() && pad != 0) {
        return Err(BwtPackError::invalid_code(0));
    }

    let trie = DecodeTrie::from_table(table)?;
    let bit_len = packed.len() as u64 * 8 - pad as u64;
    let mut reader = MsbBitReader::with_bit_len(packed, bit_len);
    let mut output = Vec::with_capacity(packed.len().saturating_mul(2).min(limit));

    while !reader.is_exhausted() {
        let code_start = reader.bits_read();
        let mut node = DecodeTrie::ROOT;
        loop {
            let bit = reader
                .read_bit()
                .map_err(|_| BwtPackError::invalid_code(code_start))?;
            match trie.step(node, bit) {
                Slot::Leaf(symbol) => {
                    if output.len() == limit {
                        return Err(BwtPackError::corrupt_block(format!(
                            "payload decodes past {limit} symbols"
                        )));
                    }
                    output.push(symbol);
                    break;
                }
                Slot::Node(next) => node = next,
                Slot::Empty => {
                    return Err(BwtPackError::invalid_code(reader.bits_read() - 1));
                }
            }
        }
    }

    Ok(output)
}

/// Child slot of a decode trie node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Empty,
    Node(usize),
    Leaf(u8),
}

/// Binary trie mapping code bits to symbols.
#[derive(Debug)]
struct DecodeTrie {
    nodes: Vec<[Slot; 2]>,
}

impl DecodeTrie {
    const ROOT: usize = 0;

    /// Build the trie, rejecting tables that are not prefix-free.
    fn from_table(table: &CodeTable) -> Result<Self> {
        let mut nodes = vec![[Slot::Empty; 2]];

        for (symbol, code) in table.iter() {
            if code.len == 0 || code.len > MAX_CODE_LEN {
                return Err(BwtPackError::malformed_table(format!(
                    "symbol {symbol:#04x} has code length {}",
                    code.len
                )));
            }

            let mut node = Self::ROOT;
            for i in 0..code.len - 1 {
                let branch = code.bit(i) as usize;
                node = match nodes[node][branch] {
                    Slot::Empty => {
                        nodes.push([Slot::Empty; 2]);
                        let child = nodes.len() - 1;
                        nodes[node][branch] = Slot::Node(child);
                        child
                    }
                    Slot::Node(child) => child,
                    Slot::Leaf(other) => {
                        return Err(BwtPackError::malformed_table(format!(
                            "code of {other:#04x} is a prefix of the code of {symbol:#04x}"
                        )));
                    }
                };
            }

            let branch = code.bit(code.len - 1) as usize;
            match nodes[node][branch] {
                Slot::Empty => nodes[node][branch] = Slot::Leaf(symbol),
                Slot::Node(_) => {
                    return Err(BwtPackError::malformed_table(format!(
                        "code of {symbol:#04x} is a prefix of another code"
                    )));
                }
                Slot::Leaf(other) => {
                    return Err(BwtPackError::malformed_table(format!(
                        "symbols {other:#04x} and {symbol:#04x} share code {code}"
                    )));
                }
            }
        }

        Ok(Self { nodes })
    }

    #[inline]
    fn step(&self, node: usize, bit: bool) -> Slot {
        self.nodes[node][bit as usize]
    }
}
