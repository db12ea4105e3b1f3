//! Error types for the TriDB storage engine.

use std::io;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in TriDB operations.
///
/// Conditions the engine cannot recover from in-process (a keydir that no
/// longer matches the file, a failed truncation, a failed fsync after bytes
/// reached the file) are deliberately *not* representable here: they panic,
/// so no ordinary error path can swallow them. See
/// [`Database::read_write`](crate::Database::read_write).
#[derive(Debug, Error)]
pub enum Error {
    /// Key length exceeds [`MAX_KEY_LEN`](crate::MAX_KEY_LEN).
    #[error("key too long: {len} bytes")]
    KeyTooLong {
        /// Length of the offending key.
        len: usize,
    },

    /// Value length exceeds [`MAX_VALUE_LEN`](crate::MAX_VALUE_LEN).
    #[error("value too long: {len} bytes")]
    ValueTooLong {
        /// Length of the offending value.
        len: usize,
    },

    /// The key contains a byte reserved as a text-framing sentinel.
    #[error("key contains sentinel byte {byte:#04x} at index {index}")]
    SentinelInKey {
        /// The reserved byte found in the key.
        byte: u8,
        /// Index of the first occurrence.
        index: usize,
    },

    /// The value contains a byte reserved as a text-framing sentinel.
    #[error("value contains sentinel byte {byte:#04x} at index {index}")]
    SentinelInValue {
        /// The reserved byte found in the value.
        byte: u8,
        /// Index of the first occurrence.
        index: usize,
    },

    /// Decoding ran out of input mid-row.
    ///
    /// `consumed` is the number of bytes read before the input ended. A
    /// short read with zero bytes consumed marks a clean end of the log
    /// during replay; anything else is a torn row.
    #[error("short read: row truncated after {consumed} bytes")]
    ShortRead {
        /// Bytes consumed before the input ended.
        consumed: usize,
    },

    /// The operation byte is neither a set nor a delete marker.
    #[error("unknown op byte {byte:#04x}")]
    UnknownOp {
        /// The unrecognized byte.
        byte: u8,
    },

    /// A text-framing suffix byte did not match the expected sentinel.
    #[error("bad suffix: expected {expected:#04x}, got {got:#04x}")]
    BadSuffix {
        /// The sentinel the framing expected.
        expected: u8,
        /// The byte actually read.
        got: u8,
    },

    /// A decoded length is inconsistent with the framed data.
    #[error("bad length: {message}")]
    BadLength {
        /// Description of the inconsistency.
        message: String,
    },

    /// Log replay failed: a row at `offset` could not be decoded.
    ///
    /// No partial repair is attempted; the open fails.
    #[error("log corrupt at offset {offset}: {source}")]
    LogCorrupt {
        /// Byte offset of the unreadable row.
        offset: u64,
        /// The decode failure.
        source: Box<Error>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Sentinel signalling "stop iterating".
    ///
    /// Returned by a walk visitor to end iteration early; the walk returns
    /// it unchanged. Check with [`Error::is_break`] before treating a
    /// returned error as a failure.
    #[error("break")]
    Break,
}

impl Error {
    /// Reports whether this error is the iteration-abort sentinel.
    #[must_use]
    pub fn is_break(&self) -> bool {
        matches!(self, Self::Break)
    }

    /// Creates a bad length error.
    pub fn bad_length(message: impl Into<String>) -> Self {
        Self::BadLength {
            message: message.into(),
        }
    }

    /// Wraps a decode failure encountered during log replay.
    pub(crate) fn log_corrupt(offset: u64, source: Error) -> Self {
        Self::LogCorrupt {
            offset,
            source: Box::new(source),
        }
    }
}
