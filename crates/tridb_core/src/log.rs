//! Log file handles.
//!
//! A log is one regular file accessed through two OS handles on the same
//! path: a read-only handle used solely for positional reads, and a
//! write-only handle opened in append mode so every write lands at the end
//! of the file. A logical length counter tracks the bytes successfully
//! appended; it is the authoritative offset for the next row.

use crate::error::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File-name suffix of the scratch file a compaction writes before the
/// atomic swap.
pub const COMPACTING_SUFFIX: &str = ".compacting";

/// Returns the sibling scratch path reserved for compactions of `path`.
pub(crate) fn compacting_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(COMPACTING_SUFFIX);
    PathBuf::from(os)
}

/// Removes a scratch file left over from a compaction interrupted by a
/// crash. Absence is not an error.
pub(crate) fn remove_stale_compacting(path: &Path) -> Result<()> {
    match fs::remove_file(compacting_path(path)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// The on-disk log: paired read/append handles plus the logical length.
#[derive(Debug)]
pub(crate) struct LogFile {
    reader: File,
    writer: File,
    len: u64,
}

impl LogFile {
    /// Opens the log at `path`, creating it if absent.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let writer = OpenOptions::new().append(true).create(true).open(path)?;
        let reader = OpenOptions::new().read(true).open(path)?;
        let len = reader.metadata()?.len();
        Ok(Self {
            reader,
            writer,
            len,
        })
    }

    /// Logical end-of-file offset: where the next append will land.
    pub(crate) fn len(&self) -> u64 {
        self.len
    }

    /// Appends `data`, returning the offset where it landed.
    ///
    /// The logical length advances by the bytes actually written even when
    /// the write fails partway, so a failed transaction can compare the
    /// length against its starting tail.
    pub(crate) fn append(&mut self, data: &[u8]) -> Result<u64> {
        let offset = self.len;
        let mut written = 0;
        while written < data.len() {
            match self.writer.write(&data[written..]) {
                Ok(0) => {
                    self.len += written as u64;
                    return Err(Error::Io(io::ErrorKind::WriteZero.into()));
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.len += written as u64;
                    return Err(Error::Io(e));
                }
            }
        }
        self.len += written as u64;
        Ok(offset)
    }

    /// Reads exactly the byte range `[offset, offset + len)`.
    ///
    /// Positional reads do not move a seek cursor, so shared holders may
    /// read concurrently.
    pub(crate) fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        if offset.saturating_add(len as u64) > self.len {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "read past end of log: offset {offset}, len {len}, log length {}",
                    self.len
                ),
            )));
        }
        let mut buf = vec![0u8; len];
        read_exact_at(&self.reader, &mut buf, offset)?;
        Ok(buf)
    }

    /// Fsyncs the write handle.
    pub(crate) fn sync(&self) -> Result<()> {
        self.writer.sync_all()?;
        Ok(())
    }

    /// Truncates the file back to `len` bytes.
    pub(crate) fn truncate(&mut self, len: u64) -> Result<()> {
        self.writer.set_len(len)?;
        self.len = len;
        Ok(())
    }

    /// Buffered sequential reader over the whole file, for replay.
    pub(crate) fn sequential_reader(&self) -> Result<BufReader<&File>> {
        let mut reader = &self.reader;
        reader.seek(SeekFrom::Start(0))?;
        Ok(BufReader::new(reader))
    }

    /// Copies the whole file to `dst`, returning the bytes copied.
    pub(crate) fn copy_to(&self, dst: &mut dyn Write) -> Result<u64> {
        let mut reader = &self.reader;
        reader.seek(SeekFrom::Start(0))?;
        let copied = io::copy(&mut reader, dst)?;
        Ok(copied)
    }

    /// Flushes and releases both handles.
    pub(crate) fn close(self) -> Result<()> {
        self.writer.sync_all()?;
        Ok(())
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    let mut filled = 0;
    while filled < buf.len() {
        match file.seek_read(&mut buf[filled..], offset + filled as u64)? {
            0 => return Err(io::ErrorKind::UnexpectedEof.into()),
            n => filled += n,
        }
    }
    Ok(())
}
