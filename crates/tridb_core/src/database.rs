//! Database engine: open-time recovery, transactions, and the public
//! read/write surface.

use crate::compact;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::Framing;
use crate::keydir::{Keydir, Position, WalkOptions};
use crate::log::{self, LogFile};
use crate::row::{Op, Row};
use parking_lot::RwLock;
use std::fs;
use std::io::Write;
use std::mem;
use std::path::{Path, PathBuf};

/// The in-memory state guarded by the engine lock.
pub(crate) struct State {
    pub(crate) log: LogFile,
    pub(crate) keydir: Box<dyn Keydir>,
}

/// An embedded key-value database backed by a single append-only log file.
///
/// Reads and writes run inside callback-scoped transactions: the engine
/// lock is held for the duration of the callback and the handles passed to
/// it cannot outlive the call. Read transactions share the lock; write
/// transactions and compaction hold it exclusively.
///
/// # Durability
///
/// A successful [`read_write`](Database::read_write) has appended every
/// buffered row and fsynced the file before it returns.
///
/// # Fatal conditions
///
/// When a write fails after some of its bytes already reached the file,
/// the engine truncates back to the pre-transaction tail and panics: the
/// keydir may have absorbed updates for rows that no longer exist, and
/// only a restart (which replays the log) restores a trustworthy state.
/// If the truncation itself fails, or fsync fails after the appends, the
/// panic reports file corruption instead. These panics are deliberate and
/// must not be caught and ignored.
pub struct Database {
    path: PathBuf,
    config: Config,
    state: RwLock<State>,
}

impl Database {
    /// Opens the database at `path` with default configuration, creating
    /// the file if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens the database at `path`.
    ///
    /// Removes any scratch file left by a compaction interrupted mid-way,
    /// then rebuilds the keydir by scanning the log from offset 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LogCorrupt`] if a row cannot be decoded during the
    /// scan (including a row torn by a partial write), or an I/O error if
    /// the file cannot be opened.
    pub fn open_with_config(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        log::remove_stale_compacting(&path)?;

        let log = LogFile::open(&path)?;
        let mut keydir = (config.keydir_factory)();
        replay(&log, config.framing.as_ref(), keydir.as_mut())?;

        Ok(Self {
            path,
            config,
            state: RwLock::new(State { log, keydir }),
        })
    }

    /// Path the database was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes and releases both file handles.
    pub fn close(self) -> Result<()> {
        self.state.into_inner().log.close()
    }

    /// Runs a read transaction under a shared hold.
    ///
    /// An error returned by the callback (including
    /// [`Error::Break`] escaping a walk) is passed through untouched.
    pub fn read<T>(&self, f: impl FnOnce(&ReadHandle<'_>) -> Result<T>) -> Result<T> {
        let state = self.state.read();
        f(&ReadHandle {
            state: &state,
            framing: self.config.framing.as_ref(),
        })
    }

    /// Runs a read-write transaction under an exclusive hold.
    ///
    /// The callback buffers operations on the write handle; nothing
    /// touches the file until it returns. Returning an error aborts the
    /// transaction: nothing is written and the error is passed through.
    /// On success the buffered rows are appended in submission order, the
    /// keydir is updated, and the file is fsynced before this method
    /// returns.
    ///
    /// # Errors
    ///
    /// An encode or write failure before any byte of this transaction
    /// reaches the file is returned as an ordinary error with the database
    /// untouched. Later failures are fatal; see the type-level
    /// documentation.
    pub fn read_write<T>(
        &self,
        f: impl FnOnce(&ReadHandle<'_>, &mut WriteBatch) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.write();

        let mut batch = WriteBatch::default();
        let out = f(
            &ReadHandle {
                state: &state,
                framing: self.config.framing.as_ref(),
            },
            &mut batch,
        )?;

        self.commit(&mut state, batch)?;
        Ok(out)
    }

    /// Rewrites the log to contain exactly one set row per live key, in
    /// key order, and swaps the new file in atomically.
    ///
    /// Any failure before the final rename leaves the database file
    /// untouched. A crash mid-compaction leaves a `.compacting` scratch
    /// file that the next open removes.
    pub fn compact(&self) -> Result<()> {
        let mut state = self.state.write();

        let replacement = compact::rewrite(&self.path, &state, &self.config)?;

        // The old handles are released before the scratch file is moved
        // into place; the rename is the commit point. The replacement
        // handles keep addressing the same inode after the rename.
        let old = mem::replace(&mut *state, replacement);
        old.log.close()?;
        fs::rename(log::compacting_path(&self.path), &self.path)?;
        Ok(())
    }

    /// Copies the log byte-for-byte to `dst` under an exclusive hold,
    /// returning the bytes copied. Suitable for backups.
    pub fn copy_to(&self, dst: &mut dyn Write) -> Result<u64> {
        let state = self.state.write();
        state.log.copy_to(dst)
    }

    fn commit(&self, state: &mut State, batch: WriteBatch) -> Result<()> {
        let start = state.log.len();

        for row in &batch.rows {
            let encoded = match self.config.framing.encode(row) {
                Ok(encoded) => encoded,
                Err(err) => {
                    if state.log.len() == start {
                        return Err(err);
                    }
                    truncate_and_die(state, start, &err);
                }
            };

            let offset = match state.log.append(&encoded) {
                Ok(offset) => offset,
                Err(err) => {
                    if state.log.len() == start {
                        return Err(err);
                    }
                    truncate_and_die(state, start, &err);
                }
            };

            match row.op {
                Op::Set => state.keydir.set(
                    &row.key,
                    Position {
                        offset,
                        len: encoded.len() as u64,
                    },
                ),
                Op::Delete => state.keydir.delete(&row.key),
            }
        }

        if let Err(err) = state.log.sync() {
            // Durability of the appended rows is unknowable; neither the
            // file nor the keydir can be trusted from here.
            panic!("file corruption: fsync failed after commit: {err}");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Handles a mid-transaction failure after bytes already reached the file.
///
/// Truncating back to `start` keeps the file intact, but the keydir has
/// already absorbed updates for the discarded rows, so the process must
/// restart either way.
fn truncate_and_die(state: &mut State, start: u64, cause: &Error) -> ! {
    match state.log.truncate(start) {
        Ok(()) => panic!("memory corruption: keydir out of sync with log, restart required: {cause}"),
        Err(trunc_err) => {
            panic!("file corruption: trailing garbage after offset {start}: {cause}: {trunc_err}")
        }
    }
}

/// Rebuilds `keydir` by scanning every row in the log from offset 0.
fn replay(log: &LogFile, framing: &dyn Framing, keydir: &mut dyn Keydir) -> Result<()> {
    let mut reader = log.sequential_reader()?;
    let mut offset = 0u64;
    loop {
        match framing.decode_from(&mut reader) {
            Ok((row, n)) => {
                match row.op {
                    Op::Set => keydir.set(
                        &row.key,
                        Position {
                            offset,
                            len: n as u64,
                        },
                    ),
                    Op::Delete => keydir.delete(&row.key),
                }
                offset += n as u64;
            }
            // The input ended exactly at a row boundary.
            Err(Error::ShortRead { consumed: 0 }) => return Ok(()),
            Err(err) => return Err(Error::log_corrupt(offset, err)),
        }
    }
}

/// Read access to the database inside a transaction callback.
///
/// The handle borrows the engine lock and cannot outlive the callback it
/// was passed to.
pub struct ReadHandle<'a> {
    state: &'a State,
    framing: &'a dyn Framing,
}

impl ReadHandle<'_> {
    /// Reports whether a key is live.
    #[must_use]
    pub fn has(&self, key: &[u8]) -> bool {
        self.state.keydir.get(key).is_some()
    }

    /// Returns the value associated with `key`, or `None` if the key is
    /// not live. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// An error here means the row's bytes could not be read back or
    /// decoded, which indicates file-level damage.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let Some(position) = self.state.keydir.get(key) else {
            return Ok(None);
        };
        let row = self.read_row(position)?;
        Ok(Some(row.value))
    }

    /// Number of live keys.
    #[must_use]
    pub fn count(&self) -> usize {
        self.state.keydir.len()
    }

    /// Number of live keys starting with `prefix`.
    #[must_use]
    pub fn count_prefix(&self, prefix: &[u8]) -> usize {
        self.state.keydir.count_prefix(prefix)
    }

    /// Visits every live key matching `opts` in byte-lex order.
    ///
    /// A visitor error stops the walk and is returned unchanged; use
    /// [`Error::Break`] to stop early without signalling a failure.
    pub fn walk(
        &self,
        opts: &WalkOptions,
        mut visitor: impl FnMut(&[u8]) -> Result<()>,
    ) -> Result<()> {
        self.state.keydir.walk(opts, &mut |key, _| visitor(key))
    }

    /// Like [`walk`](ReadHandle::walk), but also reads each key's current
    /// value.
    pub fn walk_with_value(
        &self,
        opts: &WalkOptions,
        mut visitor: impl FnMut(&[u8], &[u8]) -> Result<()>,
    ) -> Result<()> {
        self.state.keydir.walk(opts, &mut |key, position| {
            let row = self.read_row(position)?;
            visitor(key, &row.value)
        })
    }

    fn read_row(&self, position: Position) -> Result<Row> {
        let encoded = self.state.log.read_at(position.offset, position.len as usize)?;
        let mut slice = encoded.as_slice();
        let (row, n) = self.framing.decode_from(&mut slice)?;
        if n as u64 != position.len {
            return Err(Error::bad_length(format!(
                "row at offset {} decoded to {n} bytes, keydir recorded {}",
                position.offset, position.len
            )));
        }
        Ok(row)
    }
}

/// Write access to the database inside a read-write transaction callback.
///
/// Operations are buffered in submission order; no I/O happens until the
/// callback returns successfully.
#[derive(Debug, Default)]
pub struct WriteBatch {
    pub(crate) rows: Vec<Row>,
}

impl WriteBatch {
    /// Buffers a set of `key` to `value`.
    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.rows.push(Row::set(key, value));
    }

    /// Buffers a delete of `key`. Deleting an absent key has no effect on
    /// the database state.
    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.rows.push(Row::delete(key));
    }

    /// Number of buffered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether nothing has been buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
