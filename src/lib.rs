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

//! Random access into text compressed by a straight-line grammar.
//!
//! Load a grammar produced by MR-Repair, Navarro's Re-Pair, or BigRePair,
//! then extract arbitrary substrings of the decompressed text without
//! ever materializing the whole thing.
//!
//! ```no_run
//! use cfg_amt::IndexedGrammar;
//!
//! # fn main() -> cfg_amt::Result<()> {
//! let grammar = IndexedGrammar::load_mr_repair("corpus.rp")?;
//! let mut out = Vec::new();
//! grammar.extract(&mut out, 100, 200)?;
//! # Ok(())
//! # }
//! ```

mod error;
mod extract;
mod key;
mod loader;
mod rules;
mod succinct;

use std::io::Write;
use std::path::Path;

use log::debug;

pub use error::{Error, Result};
pub use key::{Symbol, ALPHABET_SIZE, DUMMY_CODE};
pub use rules::RuleTable;

use loader::LoadedGrammar;
use succinct::CompressedSumSet;

/// A grammar-compressed text, indexed for random-access extraction.
///
/// Built by one of the `load_*` constructors; immutable afterwards. This
/// is the crate's only entry point — grammar loading, rule metadata, and
/// the positional index are all internal collaborators it owns.
pub struct IndexedGrammar {
    table: RuleTable,
    index: CompressedSumSet,
}

impl IndexedGrammar {
    fn from_loaded(loaded: LoadedGrammar, source: &str) -> Self {
        debug!(
            "loaded {} grammar: text length {}, depth {}",
            source,
            loaded.table.text_length(),
            loaded.table.depth_of_grammar(),
        );
        Self {
            table: loaded.table,
            index: loaded.index,
        }
    }

    /// Load a grammar in MR-Repair's text format.
    pub fn load_mr_repair(path: impl AsRef<Path>) -> Result<Self> {
        let loaded = loader::load_mr_repair_from_path(path)?;
        Ok(Self::from_loaded(loaded, "MR-Repair"))
    }

    /// Load a grammar in Navarro's Re-Pair binary format (`.C` sequence
    /// file plus `.R` rule/alphabet-map file).
    pub fn load_navarro(path_c: impl AsRef<Path>, path_r: impl AsRef<Path>) -> Result<Self> {
        let loaded = loader::load_navarro_from_paths(path_c, path_r)?;
        Ok(Self::from_loaded(loaded, "Navarro"))
    }

    /// Load a grammar in BigRePair's binary format (`.C` sequence file
    /// plus `.R` rule file, fixed 256-byte alphabet).
    pub fn load_big_repair(path_c: impl AsRef<Path>, path_r: impl AsRef<Path>) -> Result<Self> {
        let loaded = loader::load_big_repair_from_paths(path_c, path_r)?;
        Ok(Self::from_loaded(loaded, "BigRePair"))
    }

    /// Length, in bytes, of the decompressed text.
    pub fn text_length(&self) -> u64 {
        self.table.text_length()
    }

    /// Height of the grammar's parse tree; bounds the stack depth an
    /// `extract` call needs.
    pub fn depth(&self) -> u32 {
        self.table.depth_of_grammar()
    }

    /// Write `text[begin..end)` to `out` without decompressing the rest
    /// of the text.
    pub fn extract(&self, out: &mut impl Write, begin: u64, end: u64) -> Result<()> {
        extract::extract(&self.table, &self.index, self.depth(), out, begin, end)
    }
}
