//! Log compaction.
//!
//! Compaction rewrites the log so it contains exactly one set row per live
//! key, in keydir order, and no delete rows. The rows are written to a
//! sibling scratch file which is fsynced and then renamed over the
//! original; the rename is the commit point, so a crash at any earlier
//! point leaves the original file complete (plus a scratch file the next
//! open removes).

use crate::config::Config;
use crate::database::State;
use crate::error::Result;
use crate::keydir::{Keydir, Position, WalkOptions};
use crate::log::{self, LogFile};
use std::path::Path;

/// Builds the replacement state: a scratch log holding every live row
/// (copied verbatim, so the framing is preserved) and a fresh keydir
/// addressing it.
///
/// The caller holds the exclusive engine lock and performs the
/// close/rename/swap once this returns.
pub(crate) fn rewrite(path: &Path, state: &State, config: &Config) -> Result<State> {
    log::remove_stale_compacting(path)?;

    let mut new_log = LogFile::open(&log::compacting_path(path))?;
    let mut new_keydir = (config.keydir_factory)();

    state.keydir.walk(&WalkOptions::new(), &mut |key, position| {
        let encoded = state.log.read_at(position.offset, position.len as usize)?;
        let offset = new_log.append(&encoded)?;
        new_keydir.set(
            key,
            Position {
                offset,
                len: encoded.len() as u64,
            },
        );
        Ok(())
    })?;

    new_log.sync()?;

    Ok(State {
        log: new_log,
        keydir: new_keydir,
    })
}
