//! Engine configuration.

use crate::format::{BinaryFraming, Framing};
use crate::keydir::{Keydir, TrieKeydir};
use std::fmt;
use std::sync::Arc;

/// Factory producing an empty keydir.
///
/// Invoked once at open (before replay) and once per compaction (for the
/// replacement index).
pub(crate) type KeydirFactory = Arc<dyn Fn() -> Box<dyn Keydir> + Send + Sync>;

/// Configuration for opening a database.
///
/// The defaults are the binary framing and the trie keydir:
///
/// ```
/// use tridb_core::{Config, TextFraming};
///
/// let config = Config::new().framing(TextFraming::default());
/// ```
#[derive(Clone)]
pub struct Config {
    pub(crate) framing: Arc<dyn Framing>,
    pub(crate) keydir_factory: KeydirFactory,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            framing: Arc::new(BinaryFraming),
            keydir_factory: Arc::new(|| Box::new(TrieKeydir::new()) as Box<dyn Keydir>),
        }
    }
}

impl Config {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the row framing.
    ///
    /// The framing must match the file being opened; it stays in force for
    /// the life of the file (compaction copies rows verbatim).
    #[must_use]
    pub fn framing(mut self, framing: impl Framing + 'static) -> Self {
        self.framing = Arc::new(framing);
        self
    }

    /// Replaces the keydir implementation.
    #[must_use]
    pub fn keydir_factory<K, F>(mut self, factory: F) -> Self
    where
        K: Keydir + 'static,
        F: Fn() -> K + Send + Sync + 'static,
    {
        self.keydir_factory = Arc::new(move || Box::new(factory()) as Box<dyn Keydir>);
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config").finish_non_exhaustive()
    }
}
