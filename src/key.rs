/*
    MIT License

    Copyright (c) 2020 Lars Krueger <lars_e_krueger@gmx.de>

    Permission is hereby granted, free of charge, to any person obtaining a copy
    of this software and associated documentation files (the "Software"), to deal
    in the Software without restriction, including without limitation the rights
    to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
    copies of the Software, and to permit persons to whom the Software is
    furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in all
    copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
    OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
    SOFTWARE.
*/

//! Symbol alphabet and the fixed-width key codec (Component A).
//!
//! Symbols share a single integer namespace: `[0, ALPHABET_SIZE)` are
//! terminal bytes, `[ALPHABET_SIZE, ..]` are rule ids, and `DUMMY_CODE`
//! marks end-of-rule in a flat expansion buffer.

/// A grammar symbol: either a terminal byte or a non-terminal rule id.
pub type Symbol = i32;

/// Number of terminal byte values.
pub const ALPHABET_SIZE: Symbol = 256;

/// Sentinel marking the end of a rule's expansion.
pub const DUMMY_CODE: Symbol = -1;

/// Width, in bytes, of the keys used by the positional index.
pub const KEY_LEN: usize = 6;

#[inline]
pub fn is_terminal(sym: Symbol) -> bool {
    sym < ALPHABET_SIZE
}

#[inline]
pub fn is_end_of_rule(sym: Symbol) -> bool {
    sym == DUMMY_CODE
}

/// Encoder/decoder capability for the fixed-width keys handed to the
/// positional index, expressed as a trait rather than free function
/// pointers so the succinct-set builder receives a capability value.
pub trait KeyCodec {
    fn encode(&self, value: u64) -> [u8; KEY_LEN];
    fn decode(&self, buf: &[u8]) -> u64;
}

/// The one codec this crate needs: 6-byte big-endian, good for offsets up
/// to 2^48 - 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct SixByteKey;

impl KeyCodec for SixByteKey {
    fn encode(&self, value: u64) -> [u8; KEY_LEN] {
        debug_assert!(value < (1u64 << 48), "offset does not fit in 48 bits");
        let b = value.to_be_bytes();
        // to_be_bytes() gives 8 bytes; keep the low 6.
        [b[2], b[3], b[4], b[5], b[6], b[7]]
    }

    fn decode(&self, buf: &[u8]) -> u64 {
        debug_assert_eq!(buf.len(), KEY_LEN);
        let mut b = [0u8; 8];
        b[2..8].copy_from_slice(&buf[..KEY_LEN]);
        u64::from_be_bytes(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_small_and_large_offsets() {
        let codec = SixByteKey;
        for value in [0u64, 1, 255, 256, 65535, 1 << 20, (1u64 << 48) - 1] {
            let key = codec.encode(value);
            assert_eq!(codec.decode(&key), value);
        }
    }

    #[test]
    fn encoding_is_lexicographically_ordered() {
        let codec = SixByteKey;
        let a = codec.encode(10);
        let b = codec.encode(11);
        let c = codec.encode(1_000_000);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn terminal_and_sentinel_classification() {
        assert!(is_terminal(0));
        assert!(is_terminal(255));
        assert!(!is_terminal(256));
        assert!(is_end_of_rule(DUMMY_CODE));
        assert!(!is_end_of_rule(0));
        assert!(!is_end_of_rule(256));
    }
}
