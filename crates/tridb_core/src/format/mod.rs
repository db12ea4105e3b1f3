//! Row framings.
//!
//! A framing encodes and decodes one log row self-delimitingly. Two
//! interchangeable framings exist:
//!
//! - [`BinaryFraming`] - compact fixed-header layout, the default
//! - [`TextFraming`] - sentinel-delimited plain text, hand-editable
//!
//! The framing is selected at open time via [`Config`](crate::Config) and
//! is stable for the life of a file.

mod binary;
mod text;

pub use binary::BinaryFraming;
pub use text::TextFraming;

use crate::error::{Error, Result};
use crate::row::Row;
use std::io::{self, BufRead};

/// Encodes and decodes a single log row.
///
/// # Invariants
///
/// - `encode` validates the key and value length bounds before producing
///   any bytes
/// - `decode_from` reads exactly one framed row and reports the number of
///   bytes consumed
/// - a failed decode yields no partial row
pub trait Framing: Send + Sync {
    /// Encodes `row` into its on-disk bytes.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the key or value exceeds its length
    /// bound, or if a field contains a byte the framing reserves.
    fn encode(&self, row: &Row) -> Result<Vec<u8>>;

    /// Decodes one row from `r`, returning the row and the byte count
    /// consumed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShortRead`] when the input ends mid-row (with the
    /// bytes consumed so far; zero means the input ended at a row
    /// boundary), [`Error::UnknownOp`], [`Error::BadSuffix`] or
    /// [`Error::BadLength`] on malformed framing, or an I/O error from the
    /// underlying reader.
    fn decode_from(&self, r: &mut dyn BufRead) -> Result<(Row, usize)>;
}

/// Reads up to `buf.len()` bytes, returning the number actually read.
///
/// A count shorter than `buf.len()` means the reader hit end-of-input.
pub(crate) fn read_full(r: &mut dyn BufRead, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(filled)
}
