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

//! Rule table (Component B) and rule metadata (Component C).
//!
//! Both are built together: computing `size`/`depth` for a rule requires
//! only the `size`/`depth` of rules that were registered before it (the DAG
//! invariant), so a single bottom-up pass over [`RuleTableBuilder::push_rule`]
//! calls produces both the flat symbol buffer and its metadata.

use crate::error::{malformed, Result};
use crate::key::{is_end_of_rule, is_terminal, Symbol, ALPHABET_SIZE};

/// Flat rule storage plus derived `size`/`depth` metadata.
///
/// Rule bodies are stored contiguously in `symbols`, each terminated by
/// `DUMMY_CODE`; `offsets[k]` is the start of rule `ALPHABET_SIZE + k`'s
/// body. This is a self-rolled jagged array rather than `Vec<Vec<Symbol>>`.
pub struct RuleTable {
    symbols: Vec<Symbol>,
    offsets: Vec<u32>,
    size: Vec<u64>,
    depth: Vec<u32>,
    start_rule: Symbol,
}

impl RuleTable {
    fn rule_index(&self, s: Symbol) -> usize {
        debug_assert!(s >= ALPHABET_SIZE);
        (s - ALPHABET_SIZE) as usize
    }

    /// Number of symbols in rule `s`'s expansion, not counting the
    /// trailing sentinel.
    pub fn body_len(&self, s: Symbol) -> usize {
        let k = self.rule_index(s);
        (self.offsets[k + 1] - self.offsets[k] - 1) as usize
    }

    /// The symbol at position `i` of rule `s`'s body; `DUMMY_CODE` at
    /// `i == body_len(s)`.
    pub fn child(&self, s: Symbol, i: usize) -> Symbol {
        let k = self.rule_index(s);
        self.symbols[self.offsets[k] as usize + i]
    }

    /// Id of the distinguished start rule.
    pub fn start_rule(&self) -> Symbol {
        self.start_rule
    }

    /// Number of terminals in the expansion of `s` (1 for a terminal).
    pub fn size(&self, s: Symbol) -> u64 {
        if is_terminal(s) {
            1
        } else {
            self.size[self.rule_index(s)]
        }
    }

    /// Height of `s`'s parse tree (1 for a terminal).
    pub fn depth(&self, s: Symbol) -> u32 {
        if is_terminal(s) {
            1
        } else {
            self.depth[self.rule_index(s)]
        }
    }

    /// Total length of the decompressed text: `size(start_rule)`.
    pub fn text_length(&self) -> u64 {
        self.size(self.start_rule)
    }

    /// `max depth(child) + 1` over the start rule's children: `depth(start_rule)`.
    pub fn depth_of_grammar(&self) -> u32 {
        self.depth(self.start_rule)
    }
}

/// Builds a [`RuleTable`] one rule at a time, in ascending id order.
pub struct RuleTableBuilder {
    symbols: Vec<Symbol>,
    offsets: Vec<u32>,
    size: Vec<u64>,
    depth: Vec<u32>,
}

impl RuleTableBuilder {
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            offsets: vec![0],
            size: Vec::new(),
            depth: Vec::new(),
        }
    }

    /// Id the next call to [`push_rule`](Self::push_rule) will assign.
    pub fn next_rule_id(&self) -> Symbol {
        ALPHABET_SIZE + (self.offsets.len() as Symbol - 1)
    }

    fn symbol_metadata(&self, sym: Symbol, defining_rule: Symbol) -> Result<(u64, u32)> {
        if is_terminal(sym) {
            return Ok((1, 1));
        }
        if is_end_of_rule(sym) {
            return Err(malformed("DUMMY_CODE used as a rule symbol"));
        }
        if sym < ALPHABET_SIZE || sym >= defining_rule {
            return Err(malformed(format!(
                "rule {} references undefined symbol {}",
                defining_rule, sym
            )));
        }
        let k = (sym - ALPHABET_SIZE) as usize;
        Ok((self.size[k], self.depth[k]))
    }

    /// Append a rule body (without the trailing sentinel) and compute its
    /// `size`/`depth` from already-registered children. Returns the id
    /// assigned to the new rule.
    pub fn push_rule(&mut self, body: &[Symbol]) -> Result<Symbol> {
        let id = self.next_rule_id();
        let mut total_size: u64 = 0;
        let mut max_child_depth: u32 = 0;
        for &sym in body {
            let (sz, dep) = self.symbol_metadata(sym, id)?;
            total_size = total_size
                .checked_add(sz)
                .ok_or_else(|| malformed("rule expansion size overflow"))?;
            max_child_depth = max_child_depth.max(dep);
        }
        self.symbols.extend_from_slice(body);
        self.symbols.push(crate::key::DUMMY_CODE);
        self.offsets.push(self.symbols.len() as u32);
        self.size.push(total_size);
        self.depth.push(max_child_depth + 1);
        Ok(id)
    }

    /// Finish the table. `start_rule` must be the id returned by the
    /// `push_rule` call that registered the start rule's body.
    pub fn finish(self, start_rule: Symbol) -> RuleTable {
        RuleTable {
            symbols: self.symbols,
            offsets: self.offsets,
            size: self.size,
            depth: self.depth,
            start_rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ALPHABET_SIZE;

    #[test]
    fn single_pair_rule_has_size_two_depth_two() {
        let mut b = RuleTableBuilder::new();
        let r = b
            .push_rule(&[b'a' as Symbol, b'b' as Symbol])
            .expect("rule should be valid");
        assert_eq!(r, ALPHABET_SIZE);
        let table = b.finish(r);
        assert_eq!(table.size(r), 2);
        assert_eq!(table.depth(r), 2);
        assert_eq!(table.body_len(r), 2);
        assert!(is_end_of_rule(table.child(r, 2)));
    }

    #[test]
    fn start_rule_aggregates_children() {
        let mut b = RuleTableBuilder::new();
        let r256 = b
            .push_rule(&[b'a' as Symbol, b'b' as Symbol])
            .expect("r256");
        let start = b
            .push_rule(&[r256, b'c' as Symbol, r256])
            .expect("start rule");
        let table = b.finish(start);
        assert_eq!(table.text_length(), 5);
        assert_eq!(table.depth_of_grammar(), 3);
    }

    #[test]
    fn forward_reference_is_rejected() {
        let mut b = RuleTableBuilder::new();
        let future_id = b.next_rule_id() + 1;
        let err = b.push_rule(&[future_id]).unwrap_err();
        assert!(matches!(err, crate::error::Error::MalformedGrammar { .. }));
    }
}
