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

//! The extraction engine (Component F): a DFS over an explicit stack,
//! guided by the positional index, streaming terminals into a sink.

use std::io::Write;

use log::trace;

use crate::error::{Error, Result};
use crate::key::{is_end_of_rule, is_terminal, Symbol};
use crate::rules::RuleTable;
use crate::succinct::CompressedSumSet;

/// Random-access substring extraction: writes `T[begin:end)` to `out`.
///
/// `begin` need not fall on a start-rule child boundary — see REDESIGN
/// FLAG 1 in SPEC_FULL.md: the predecessor lookup gives the start-rule
/// child covering `begin`, and the descent then skips `begin - off[i]`
/// terminals before it starts emitting.
pub(crate) fn extract<W: Write>(
    table: &RuleTable,
    index: &CompressedSumSet,
    depth: u32,
    out: &mut W,
    begin: u64,
    end: u64,
) -> Result<()> {
    let text_length = table.text_length();
    if begin > end || end > text_length {
        return Err(Error::RangeError {
            begin,
            end,
            text_length,
        });
    }
    trace!("extract({}, {})", begin, end);
    if begin == end {
        return Ok(());
    }

    let start_rule = table.start_rule();
    let i = index.predecessor_index(begin) as usize;
    let off_i = start_rule_child_offset(table, start_rule, i);
    debug_assert!(off_i <= begin);

    let mut skip = begin - off_i;
    let mut rule = start_rule;
    let mut position = i;
    let mut stack: Vec<(Symbol, u32)> = Vec::with_capacity(depth as usize);
    let want = end - begin;
    let mut produced: u64 = 0;

    while produced < want {
        let sym = table.child(rule, position);
        if is_end_of_rule(sym) {
            match stack.pop() {
                Some((parent_rule, parent_position)) => {
                    rule = parent_rule;
                    position = parent_position as usize;
                }
                None => break,
            }
        } else if is_terminal(sym) {
            if skip > 0 {
                skip -= 1;
            } else {
                out.write_all(&[sym as u8])?;
                produced += 1;
            }
            position += 1;
        } else {
            let child_size = table.size(sym);
            if skip >= child_size {
                skip -= child_size;
                position += 1;
            } else {
                stack.push((rule, (position + 1) as u32));
                rule = sym;
                position = 0;
            }
        }
    }
    debug_assert_eq!(produced, want);
    Ok(())
}

/// Absolute text offset of the `i`-th start-rule child, recomputed from
/// the rule table since the frozen index only preserves ranks.
fn start_rule_child_offset(table: &RuleTable, start_rule: Symbol, i: usize) -> u64 {
    let mut offset = 0u64;
    for k in 0..i {
        offset += table.size(table.child(start_rule, k));
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleTableBuilder;
    use crate::succinct::MutableSumSet;

    fn grammar_abcab() -> (RuleTable, CompressedSumSet, u32) {
        // R256 -> 'a' 'b' ; start -> R256 'c' R256  (matches spec scenario 1)
        let mut builder = RuleTableBuilder::new();
        let r256 = builder
            .push_rule(&[b'a' as Symbol, b'b' as Symbol])
            .unwrap();
        let start = builder
            .push_rule(&[r256, b'c' as Symbol, r256])
            .unwrap();
        let table = builder.finish(start);

        let mut mutable = MutableSumSet::with_capacity(3);
        let mut off = 0u64;
        for k in 0..3 {
            mutable.insert(off);
            off += table.size(table.child(start, k));
        }
        let index = mutable.freeze().unwrap();
        let depth = table.depth_of_grammar();
        (table, index, depth)
    }

    fn extract_to_string(table: &RuleTable, index: &CompressedSumSet, depth: u32, begin: u64, end: u64) -> String {
        let mut buf = Vec::new();
        extract(table, index, depth, &mut buf, begin, end).expect("extract should succeed");
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn full_range_matches_decompressed_text() {
        let (table, index, depth) = grammar_abcab();
        assert_eq!(extract_to_string(&table, &index, depth, 0, 5), "abcab");
    }

    #[test]
    fn cross_boundary_and_tail_ranges() {
        let (table, index, depth) = grammar_abcab();
        assert_eq!(extract_to_string(&table, &index, depth, 2, 4), "ca");
        assert_eq!(extract_to_string(&table, &index, depth, 4, 5), "b");
    }

    #[test]
    fn empty_range_emits_nothing() {
        let (table, index, depth) = grammar_abcab();
        assert_eq!(extract_to_string(&table, &index, depth, 0, 0), "");
        assert_eq!(extract_to_string(&table, &index, depth, 5, 5), "");
    }

    #[test]
    fn subrange_composition_law() {
        let (table, index, depth) = grammar_abcab();
        let ab = extract_to_string(&table, &index, depth, 0, 2);
        let cab = extract_to_string(&table, &index, depth, 2, 5);
        let whole = extract_to_string(&table, &index, depth, 0, 5);
        assert_eq!(format!("{}{}", ab, cab), whole);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let (table, index, depth) = grammar_abcab();
        let mut buf = Vec::new();
        let err = extract(&table, &index, depth, &mut buf, 0, 6).unwrap_err();
        assert!(matches!(err, Error::RangeError { .. }));
    }
}
