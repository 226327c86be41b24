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

//! Error types returned by loaders and the extraction engine.

use thiserror::Error;

/// Failure modes surfaced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading a grammar file or writing to an extraction sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The grammar on disk is internally inconsistent.
    #[error("malformed grammar: {reason}")]
    MalformedGrammar {
        /// Human-readable description of what was wrong.
        reason: String,
    },

    /// `extract` was called with an invalid range.
    #[error("invalid range [{begin}, {end}) for text of length {text_length}")]
    RangeError {
        begin: u64,
        end: u64,
        text_length: u64,
    },

    /// A declared grammar dimension is too large to allocate for safely.
    #[error("refusing to allocate for {requested} elements")]
    ResourceExhausted { requested: u64 },
}

/// Crate-local result alias, matching the teacher's own `Result<T>` idiom.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn malformed(reason: impl Into<String>) -> Error {
    Error::MalformedGrammar {
        reason: reason.into(),
    }
}
