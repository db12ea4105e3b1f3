//! # TriDB Core
//!
//! Embedded, single-process, log-structured key-value storage engine.
//!
//! A database is one regular file on disk: an append-only sequence of
//! encoded rows, each recording a single set or delete. An in-memory key
//! directory (the "keydir") maps every live key to the position of its most
//! recent row; values stay on disk and are fetched on demand with
//! positional reads.
//!
//! This crate provides:
//! - Row encoding in a binary or a hand-editable text framing
//! - The keydir index with ordered, prefix-scoped iteration
//! - Callback-scoped read and read-write transactions with fsync-on-commit
//! - Crash-safe compaction with an atomic file swap
//!
//! ## Example
//!
//! ```no_run
//! use tridb_core::Database;
//!
//! # fn main() -> tridb_core::Result<()> {
//! let db = Database::open("app.db")?;
//!
//! db.read_write(|_r, w| {
//!     w.set("name", "Ada");
//!     Ok(())
//! })?;
//!
//! db.read(|r| {
//!     assert_eq!(r.get(b"name")?, Some(b"Ada".to_vec()));
//!     Ok(())
//! })?;
//! db.close()?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod compact;
mod config;
mod database;
mod error;
mod format;
mod keydir;
mod log;
mod row;

pub use config::Config;
pub use database::{Database, ReadHandle, WriteBatch};
pub use error::{Error, Result};
pub use format::{BinaryFraming, Framing, TextFraming};
pub use keydir::{Keydir, Position, TrieKeydir, WalkOptions};
pub use log::COMPACTING_SUFFIX;
pub use row::{Op, Row, MAX_KEY_LEN, MAX_VALUE_LEN};
