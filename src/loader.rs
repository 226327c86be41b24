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

//! Grammar loaders (Component D): MR-Repair text form and the Navarro /
//! BigRePair binary pair forms, expressed as pure functions over a byte
//! source per the Design Notes' re-architecture instruction, so tests can
//! hand them an in-memory `Cursor` instead of a file on disk.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use itertools::Itertools;
use log::debug;

use crate::error::{malformed, Error, Result};
use crate::key::{is_end_of_rule, Symbol, ALPHABET_SIZE};
use crate::rules::{RuleTable, RuleTableBuilder};
use crate::succinct::{CompressedSumSet, MutableSumSet};

/// Sanity bound on any single declared/derived count during load, well
/// past any real grammar; guards against a corrupt header driving an
/// unbounded allocation.
const MAX_REASONABLE_COUNT: u64 = 1 << 32;

pub(crate) struct LoadedGrammar {
    pub table: RuleTable,
    pub index: CompressedSumSet,
}

fn check_count(n: i64, what: &str) -> Result<usize> {
    if n < 0 {
        return Err(malformed(format!("negative {}: {}", what, n)));
    }
    let n = n as u64;
    if n > MAX_REASONABLE_COUNT {
        return Err(Error::ResourceExhausted { requested: n });
    }
    Ok(n as usize)
}

/// Build the positional index over a fully-loaded rule table's start
/// rule (Component E, shared by all three loaders).
fn build_positional_index(table: &RuleTable) -> Result<CompressedSumSet> {
    let start_rule = table.start_rule();
    let start_size = table.body_len(start_rule);
    let mut mutable = MutableSumSet::with_capacity(start_size);
    let mut offset = 0u64;
    for k in 0..start_size {
        mutable.insert(offset);
        offset += table.size(table.child(start_rule, k));
    }
    mutable.freeze()
}

// ---------------------------------------------------------------------
// MR-Repair (text)
// ---------------------------------------------------------------------

fn next_int<R: BufRead>(lines: &mut std::io::Lines<R>) -> Result<i32> {
    let line = lines
        .next()
        .ok_or_else(|| malformed("unexpected end of input"))??;
    line.trim()
        .parse::<i32>()
        .map_err(|_| malformed(format!("expected an integer, found {:?}", line)))
}

pub fn load_mr_repair_from_reader<R: BufRead>(reader: R) -> Result<LoadedGrammar> {
    let mut lines = reader.lines();
    let declared_text_length = next_int(&mut lines)?;
    let num_rules = check_count(next_int(&mut lines)? as i64, "rule count")?;
    let start_size = check_count(next_int(&mut lines)? as i64, "start size")?;

    let mut builder = RuleTableBuilder::new();
    for _ in 0..num_rules {
        let mut body = Vec::new();
        loop {
            let sym = next_int(&mut lines)? as Symbol;
            if is_end_of_rule(sym) {
                break;
            }
            body.push(sym);
        }
        if body.is_empty() {
            return Err(malformed("MR-Repair rule has an empty body"));
        }
        builder.push_rule(&body)?;
    }

    let mut start_body = Vec::with_capacity(start_size);
    for _ in 0..start_size {
        start_body.push(next_int(&mut lines)? as Symbol);
    }
    let start_rule = builder.push_rule(&start_body)?;
    let table = builder.finish(start_rule);

    debug!(
        "loaded MR-Repair grammar: {} rules, start size {}, depth {}, text length {} (header declared {})",
        num_rules,
        start_size,
        table.depth_of_grammar(),
        table.text_length(),
        declared_text_length
    );

    let index = build_positional_index(&table)?;
    Ok(LoadedGrammar { table, index })
}

pub(crate) fn load_mr_repair_from_path(path: impl AsRef<Path>) -> Result<LoadedGrammar> {
    let reader = BufReader::new(File::open(path)?);
    load_mr_repair_from_reader(reader)
}

// ---------------------------------------------------------------------
// Navarro / BigRePair (binary pair forms)
// ---------------------------------------------------------------------

/// Read a single native-endian `i32`. `Ok(None)` signals a clean EOF at a
/// record boundary; a partial read is a malformed-grammar error.
fn try_read_i32<R: Read>(reader: &mut R) -> Result<Option<i32>> {
    let mut buf = [0u8; 4];
    let mut filled = 0usize;
    loop {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(malformed("truncated integer in binary grammar file"));
        }
        filled += n;
        if filled == 4 {
            return Ok(Some(i32::from_ne_bytes(buf)));
        }
    }
}

fn read_i32(reader: &mut impl Read) -> Result<i32> {
    try_read_i32(reader)?.ok_or_else(|| malformed("unexpected end of input"))
}

/// Read every remaining `(left, right)` pair of native-endian `i32`s.
fn read_all_pairs<R: Read>(reader: &mut R) -> Result<Vec<(i32, i32)>> {
    let mut ints = Vec::new();
    while let Some(v) = try_read_i32(reader)? {
        ints.push(v);
        check_count(ints.len() as i64, "rule count")?;
    }
    if ints.len() % 2 != 0 {
        return Err(malformed("truncated pair record"));
    }
    Ok(ints.into_iter().tuples().collect())
}

/// Decode a raw on-disk symbol value shared by the Navarro and BigRePair
/// binary formats: below `alphabet_size` it's a terminal (via `map`, or
/// the raw byte itself when there is no map), at or above it, it's a
/// rule id offset by `alphabet_size`.
fn decode_pair_symbol(raw: i32, alphabet_size: i32, map: Option<&[u8]>) -> Result<Symbol> {
    if raw < 0 {
        return Err(malformed(format!("negative symbol id {}", raw)));
    }
    if raw < alphabet_size {
        match map {
            Some(m) => Ok(m[raw as usize] as Symbol),
            None => Ok(raw),
        }
    } else {
        Ok(raw - alphabet_size + ALPHABET_SIZE)
    }
}

fn load_pair_grammar<RC: Read, RR: Read>(
    mut reader_r: RR,
    mut reader_c: RC,
    alphabet_size: i32,
    map: Option<&[u8]>,
) -> Result<LoadedGrammar> {
    let pairs = read_all_pairs(&mut reader_r)?;

    let mut builder = RuleTableBuilder::new();
    for (left, right) in &pairs {
        let left = decode_pair_symbol(*left, alphabet_size, map)?;
        let right = decode_pair_symbol(*right, alphabet_size, map)?;
        builder.push_rule(&[left, right])?;
    }

    let mut start_body = Vec::new();
    loop {
        let raw = match try_read_i32(&mut reader_c)? {
            Some(v) => v,
            None => break,
        };
        start_body.push(decode_pair_symbol(raw, alphabet_size, map)?);
        check_count(start_body.len() as i64, "start size")?;
    }
    if start_body.is_empty() {
        return Err(malformed("start rule has an empty body"));
    }
    let start_rule = builder.push_rule(&start_body)?;
    let table = builder.finish(start_rule);

    debug!(
        "loaded pair grammar: {} rules, start size {}, depth {}, text length {}",
        pairs.len(),
        table.body_len(start_rule),
        table.depth_of_grammar(),
        table.text_length()
    );

    let index = build_positional_index(&table)?;
    Ok(LoadedGrammar { table, index })
}

pub fn load_navarro_from_readers<RC: Read, RR: Read>(
    reader_c: RC,
    mut reader_r: RR,
) -> Result<LoadedGrammar> {
    let alphabet_size = read_i32(&mut reader_r)?;
    let alphabet_size_usize = check_count(alphabet_size as i64, "alphabet size")?;
    let mut map = vec![0u8; alphabet_size_usize];
    reader_r.read_exact(&mut map)?;
    load_pair_grammar(reader_c, reader_r, alphabet_size, Some(&map))
}

pub(crate) fn load_navarro_from_paths(
    path_c: impl AsRef<Path>,
    path_r: impl AsRef<Path>,
) -> Result<LoadedGrammar> {
    let reader_c = BufReader::new(File::open(path_c)?);
    let reader_r = BufReader::new(File::open(path_r)?);
    load_navarro_from_readers(reader_c, reader_r)
}

pub fn load_big_repair_from_readers<RC: Read, RR: Read>(
    reader_c: RC,
    mut reader_r: RR,
) -> Result<LoadedGrammar> {
    let alphabet_size = read_i32(&mut reader_r)?;
    if alphabet_size != ALPHABET_SIZE {
        return Err(malformed(format!(
            "BigRePair alphabet size must be {}, found {}",
            ALPHABET_SIZE, alphabet_size
        )));
    }
    load_pair_grammar(reader_c, reader_r, alphabet_size, None)
}

pub(crate) fn load_big_repair_from_paths(
    path_c: impl AsRef<Path>,
    path_r: impl AsRef<Path>,
) -> Result<LoadedGrammar> {
    let reader_c = BufReader::new(File::open(path_c)?);
    let reader_r = BufReader::new(File::open(path_r)?);
    load_big_repair_from_readers(reader_c, reader_r)
}

/// Pair up a flat stream of native-endian ints two at a time; used by
/// tests below to build `.R`/`.C` fixtures without repeating byte-layout
/// boilerplate at every call site.
#[cfg(test)]
fn le_bytes_of_ints(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn extract_all(loaded: &LoadedGrammar) -> Vec<u8> {
        let mut buf = Vec::new();
        crate::extract::extract(
            &loaded.table,
            &loaded.index,
            loaded.table.depth_of_grammar(),
            &mut buf,
            0,
            loaded.table.text_length(),
        )
        .expect("extract should succeed");
        buf
    }

    #[test]
    fn mr_repair_scenario_from_spec() {
        let text = "5\n1\n3\n97\n98\n-1\n256\n99\n256\n";
        let loaded = load_mr_repair_from_reader(Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(loaded.table.text_length(), 5);
        assert_eq!(extract_all(&loaded), b"abcab");
    }

    #[test]
    fn mr_repair_rejects_empty_rule_body() {
        let text = "0\n1\n0\n-1\n";
        let err = load_mr_repair_from_reader(Cursor::new(text.as_bytes())).unwrap_err();
        assert!(matches!(err, Error::MalformedGrammar { .. }));
    }

    #[test]
    fn navarro_scenario_from_spec() {
        // .R: alphabetSize=2, map=['x','y'], one pair (0,1) -> rule 256 = "xy"
        let mut r_bytes = le_bytes_of_ints(&[2]);
        r_bytes.extend_from_slice(b"xy");
        r_bytes.extend(le_bytes_of_ints(&[0, 1]));
        // .C: [2, 2, 0] -> rule refs are alphabetSize + index, so this is
        // R256 R256 'x' (map[0]): start = "xy" + "xy" + "x"
        let c_bytes = le_bytes_of_ints(&[2, 2, 0]);

        let loaded =
            load_navarro_from_readers(Cursor::new(c_bytes), Cursor::new(r_bytes)).unwrap();
        assert_eq!(loaded.table.text_length(), 5);

        let mut buf = Vec::new();
        crate::extract::extract(
            &loaded.table,
            &loaded.index,
            loaded.table.depth_of_grammar(),
            &mut buf,
            1,
            4,
        )
        .unwrap();
        assert_eq!(buf, b"yxy");
    }

    #[test]
    fn big_repair_scenario_from_spec() {
        // .R: alphabetSize=256 (fixed), pair(65,66) -> R256="AB", pair(256,256) -> R257="ABAB"
        let mut r_bytes = le_bytes_of_ints(&[256]);
        r_bytes.extend(le_bytes_of_ints(&[65, 66, 256, 256]));
        // .C: [257, 67] -> start = R257 'C'
        let c_bytes = le_bytes_of_ints(&[257, 67]);

        let loaded =
            load_big_repair_from_readers(Cursor::new(c_bytes), Cursor::new(r_bytes)).unwrap();
        assert_eq!(loaded.table.text_length(), 5);
        assert_eq!(extract_all(&loaded), b"ABABC");

        let mut tail = Vec::new();
        crate::extract::extract(
            &loaded.table,
            &loaded.index,
            loaded.table.depth_of_grammar(),
            &mut tail,
            3,
            5,
        )
        .unwrap();
        assert_eq!(tail, b"BC");
    }

    #[test]
    fn big_repair_rejects_non_256_alphabet_size() {
        let r_bytes = le_bytes_of_ints(&[2]);
        let c_bytes: Vec<u8> = Vec::new();
        let err =
            load_big_repair_from_readers(Cursor::new(c_bytes), Cursor::new(r_bytes)).unwrap_err();
        assert!(matches!(err, Error::MalformedGrammar { .. }));
    }

    #[test]
    fn loader_equivalence_between_navarro_and_big_repair() {
        // Same text "ABABC" compressed into equivalent Navarro and BigRePair
        // grammars (Navarro's alphabet map is the identity on A,B,C here).
        let mut navarro_r = le_bytes_of_ints(&[3]);
        navarro_r.extend_from_slice(b"ABC");
        navarro_r.extend(le_bytes_of_ints(&[0, 1, 3, 3]));
        let navarro_c = le_bytes_of_ints(&[4, 2]);
        let navarro =
            load_navarro_from_readers(Cursor::new(navarro_c), Cursor::new(navarro_r)).unwrap();

        let mut big_r = le_bytes_of_ints(&[256]);
        big_r.extend(le_bytes_of_ints(&[65, 66, 256, 256]));
        let big_c = le_bytes_of_ints(&[257, 67]);
        let big_repair =
            load_big_repair_from_readers(Cursor::new(big_c), Cursor::new(big_r)).unwrap();

        assert_eq!(extract_all(&navarro), extract_all(&big_repair));
    }
}
