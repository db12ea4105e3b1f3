//! In-memory key directory.
//!
//! The keydir maps every live key to the position of its most recent set
//! row in the log. It is the only index the engine keeps: values stay on
//! disk and are fetched through the recorded positions.
//!
//! The keydir has no internal synchronization; the engine lock protects it.

mod trie;

pub use trie::TrieKeydir;

use crate::error::Result;

/// Location of one encoded row in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset of the row's first byte.
    pub offset: u64,
    /// Encoded length of the row in bytes.
    pub len: u64,
}

/// Options restricting a keydir walk.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Only visit keys starting with this byte prefix.
    pub prefix: Vec<u8>,
    /// Visit keys in reverse lexicographic order.
    pub reverse: bool,
}

impl WalkOptions {
    /// Options selecting every key, forward.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the walk to keys starting with `prefix`.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<Vec<u8>>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets reverse lexicographic order.
    #[must_use]
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }
}

/// Index from live key to the position of its most recent set row.
///
/// Implementations must deliver [`walk`](Keydir::walk) in true byte-wise
/// lexicographic order (not insertion order) and report
/// [`len`](Keydir::len) in O(1).
///
/// The default implementation is [`TrieKeydir`]; an alternative can be
/// plugged in through [`Config::keydir_factory`](crate::Config::keydir_factory).
pub trait Keydir: Send + Sync {
    /// Inserts or overwrites a key. The live count grows only when the key
    /// was absent.
    fn set(&mut self, key: &[u8], position: Position);

    /// Removes a key if present; a no-op otherwise. The live count shrinks
    /// only when the key was present.
    fn delete(&mut self, key: &[u8]);

    /// Returns the position of the key's most recent set row, if any.
    fn get(&self, key: &[u8]) -> Option<Position>;

    /// Number of live keys, in O(1).
    fn len(&self) -> usize;

    /// Returns whether no keys are live.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visits every live key matching `opts` in byte-wise lexicographic
    /// order (reverse if requested), once each.
    ///
    /// Going forward an exact prefix match is visited before its
    /// descendants; in reverse, after them, so reversed output mirrors
    /// forward output exactly.
    ///
    /// An error returned by the visitor stops the walk and is returned
    /// unchanged; [`Error::Break`](crate::Error::Break) is the
    /// conventional stop sentinel.
    fn walk(
        &self,
        opts: &WalkOptions,
        visitor: &mut dyn FnMut(&[u8], Position) -> Result<()>,
    ) -> Result<()>;

    /// Number of live keys starting with `prefix`.
    fn count_prefix(&self, prefix: &[u8]) -> usize {
        let mut count = 0;
        let opts = WalkOptions::new().prefix(prefix.to_vec());
        // The visitor never fails, so neither can the walk.
        let _ = self.walk(&opts, &mut |_, _| {
            count += 1;
            Ok(())
        });
        count
    }
}
