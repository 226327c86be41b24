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

//! The start-rule positional index (Component E): a rank-enabled ordered
//! set of fixed-width keys, treated by the rest of the crate as a black
//! box with a `{build, predecessor}` contract.
//!
//! The real Array-Mapped-Trie-backed `CompressedSumSet` this crate is
//! modeled after is out of scope; this module provides a correct
//! stand-in backed by [`fst`], an ordered map over byte-string keys
//! already present in this corner of the ecosystem.

use fst::{IntoStreamer, Streamer};

use crate::error::{malformed, Error, Result};
use crate::key::{KeyCodec, SixByteKey};

fn fst_err(context: &str, e: fst::Error) -> Error {
    malformed(format!("{}: {}", context, e))
}

/// Append-only builder for the positional index. Keys must be inserted in
/// strictly increasing order — true by construction here, since
/// `off[i]` is strictly increasing (every start-rule child has
/// `size >= 1`).
pub struct MutableSumSet {
    codec: SixByteKey,
    keys: Vec<(Vec<u8>, u64)>,
}

impl MutableSumSet {
    pub fn with_capacity(capacity_hint: usize) -> Self {
        Self {
            codec: SixByteKey,
            keys: Vec::with_capacity(capacity_hint),
        }
    }

    /// Insert the next offset. Its rank (0-based position among all
    /// inserted offsets) is recorded as the value the frozen set returns.
    pub fn insert(&mut self, offset: u64) {
        let rank = self.keys.len() as u64;
        let key = self.codec.encode(offset).to_vec();
        self.keys.push((key, rank));
    }

    /// Bulk-build the immutable, rank-enabled structure and discard the
    /// mutable set.
    pub fn freeze(self) -> Result<CompressedSumSet> {
        let mut builder = fst::MapBuilder::memory();
        for (key, rank) in &self.keys {
            builder
                .insert(key, *rank)
                .map_err(|e| fst_err("inserting key into positional index", e))?;
        }
        let bytes = builder
            .into_inner()
            .map_err(|e| fst_err("finishing positional index", e))?;
        let map =
            fst::Map::new(bytes).map_err(|e| fst_err("loading frozen positional index", e))?;
        Ok(CompressedSumSet {
            map,
            codec: SixByteKey,
        })
    }
}

/// Frozen, rank-enabled predecessor structure over the keys inserted into
/// a [`MutableSumSet`].
pub struct CompressedSumSet {
    map: fst::Map<Vec<u8>>,
    codec: SixByteKey,
}

impl CompressedSumSet {
    /// Largest `i` such that the `i`-th inserted key is `<= query`.
    ///
    /// `fst` only exposes streaming range queries, not a native rank
    /// operation, so this walks the bounded `<= query` sub-stream and
    /// keeps the last value seen. That's `O(i)`, not `O(log n)` — a real
    /// succinct structure would do better, but the structure itself is
    /// explicitly out of scope here.
    pub fn predecessor_index(&self, query: u64) -> u64 {
        let bound = self.codec.encode(query);
        let mut stream = self.map.range().le(bound).into_stream();
        let mut last = 0u64;
        while let Some((_, rank)) = stream.next() {
            last = rank;
        }
        last
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(offsets: &[u64]) -> CompressedSumSet {
        let mut mutable = MutableSumSet::with_capacity(offsets.len());
        for &off in offsets {
            mutable.insert(off);
        }
        mutable.freeze().expect("freeze should succeed")
    }

    #[test]
    fn predecessor_of_each_offset_is_its_own_rank() {
        let offsets = [0u64, 2, 2 + 1, 5, 9];
        let set = build(&offsets);
        for (i, &off) in offsets.iter().enumerate() {
            assert_eq!(set.predecessor_index(off), i as u64);
        }
    }

    #[test]
    fn predecessor_between_offsets_rounds_down() {
        let set = build(&[0, 5, 9]);
        assert_eq!(set.predecessor_index(0), 0);
        assert_eq!(set.predecessor_index(4), 0);
        assert_eq!(set.predecessor_index(5), 1);
        assert_eq!(set.predecessor_index(8), 1);
        assert_eq!(set.predecessor_index(9), 2);
        assert_eq!(set.predecessor_index(1_000), 2);
    }
}
