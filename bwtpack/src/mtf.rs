//! Move-to-Front Transform.
//!
//! MTF replaces each byte with its position in a recency list and then moves
//! that byte to the front of the list. After the BWT, bytes that cluster
//! together turn into long runs of small ranks.
//!
//! The list lives in an [`MtfState`] owned by a single block. Encoder and
//! decoder mutate it through the same [`MtfState::move_to_front`] call, so
//! both sides stay in lock-step byte for byte.

/// Recency list over all 256 byte values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtfState {
    list: [u8; 256],
}

impl MtfState {
    /// Create a state holding the identity permutation `[0, 1, ..., 255]`.
    pub fn new() -> Self {
        let mut list = [0u8; 256];
        for (slot, value) in list.iter_mut().zip(0..=255u8) {
            *slot = value;
        }
        Self { list }
    }

    /// Current recency order, most recent first.
    pub fn alphabet(&self) -> &[u8; 256] {
        &self.list
    }

    /// Current rank of `byte`.
    pub fn rank_of(&self, byte: u8) -> u8 {
        // The list is always a permutation of 0..=255, so the byte is present.
        self.list.iter().position(|&b| b == byte).unwrap_or(0) as u8
    }

    /// Move the byte at `rank` to the front, shifting earlier bytes back by one.
    #[inline]
    pub fn move_to_front(&mut self, rank: u8) -> u8 {
        let rank = rank as usize;
        let byte = self.list[rank];
        if rank > 0 {
            self.list.copy_within(0..rank, 1);
            self.list[0] = byte;
        }
        byte
    }

    /// Encode bytes to ranks, advancing this state.
    pub fn encode(&mut self, data: &[u8]) -> Vec<u8> {
        let mut result = Vec::with_capacity(data.len());
        for &byte in data {
            let rank = self.rank_of(byte);
            result.push(rank);
            self.move_to_front(rank);
        }
        result
    }

    /// Decode ranks to bytes, advancing this state.
    pub fn decode(&mut self, ranks: &[u8]) -> Vec<u8> {
        let mut result = Vec::with_capacity(ranks.len());
        for &rank in ranks {
            result.push(self.move_to_front(rank));
        }
        result
    }
}

impl Default for MtfState {
    fn default() -> Self {
        Self::new()
    }
}

/// Perform the Move-to-Front transform with a fresh identity state.
pub fn encode(data: &[u8]) -> Vec<u8> {
    MtfState::new().encode(data)
}

/// Invert [`encode`] with a fresh identity state.
pub fn decode(ranks: &[u8]) -> Vec<u8> {
    MtfState::new().decode(ranks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mtf_empty() {
        assert!(encode(b"").is_empty());
        assert!(decode(b"").is_empty());
    }

    #[test]
    fn test_mtf_single() {
        assert_eq!(encode(b"a"), vec![b'a']); // 'a' starts at position 97
    }

    #[test]
    fn test_mtf_repeated() {
        assert_eq!(encode(b"aaaa"), vec![b'a', 0, 0, 0]);
    }

    #[test]
    fn test_mtf_known_sequence() {
        // b=98, a -> 98 (b moved ahead of it), n=110, then recency ranks
        assert_eq!(encode(b"banana"), vec![98, 98, 110, 1, 1, 1]);
    }

    #[test]
    fn test_mtf_roundtrip() {
        let test_cases = [
            b"hello".as_slice(),
            b"banana",
            b"abracadabra",
            b"the quick brown fox",
            &[0xFF, 0x00, 0xFF, 0x80, 0x00],
        ];

        for data in test_cases {
            let transformed = encode(data);
            let recovered = decode(&transformed);
            assert_eq!(recovered, data, "Failed for: {:?}", data);
        }
    }

    #[test]
    fn test_state_synchrony() {
        let data: Vec<u8> = (0..2048u32).map(|i| (i * 31 % 251) as u8).collect();

        let mut encoder = MtfState::new();
        let ranks = encoder.encode(&data);

        let mut decoder = MtfState::new();
        let recovered = decoder.decode(&ranks);

        assert_eq!(recovered, data);
        assert_eq!(encoder, decoder);
    }

    #[test]
    fn test_state_stays_permutation() {
        let mut state = MtfState::new();
        state.encode(b"zyxwvutsrqponmlkjihgfedcba\xFF\x00\x80");

        let mut seen = [false; 256];
        for &b in state.alphabet() {
            assert!(!seen[b as usize], "duplicate byte {b}");
            seen[b as usize] = true;
        }
        assert_eq!(state.alphabet()[0], 0x80);
    }

    #[test]
    fn test_mtf_produces_low_values() {
        let data = b"bbbbbaaaacccc";
        let transformed = encode(data);

        let zeros = transformed.iter().filter(|&&b| b == 0).count();
        assert!(
            zeros > data.len() / 2,
            "MTF should produce many zeros for runs"
        );
    }
}
