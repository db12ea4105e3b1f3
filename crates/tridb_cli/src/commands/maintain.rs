//! Maintenance commands: compaction, backup, bulk fill.

use std::fs;
use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::info;
use tridb_core::Database;

/// Rewrites the log, dropping deleted and overwritten rows.
pub fn compact(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    info!("Compacting {:?}", db.path());

    let before = fs::metadata(db.path())?.len();
    let start = Instant::now();
    db.compact()?;
    let elapsed = start.elapsed();
    let after = fs::metadata(db.path())?.len();

    println!("✓ Compacted in {elapsed:.2?}");
    println!("  Size: {before} -> {after} bytes");
    Ok(())
}

/// Copies the log byte-for-byte to `output`.
pub fn backup(db: &Database, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Creating backup of {:?}", db.path());

    let mut file = fs::File::create(output)?;
    let copied = db.copy_to(&mut file)?;
    file.sync_all()?;

    println!("✓ Backup created successfully");
    println!("  Path: {output:?}");
    println!("  Size: {copied} bytes");
    Ok(())
}

/// Inserts `count` generated rows in a single transaction.
pub fn fill(db: &Database, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)?
        .as_secs()
        .to_string();

    let start = Instant::now();
    db.read_write(|_r, w| {
        for i in 0..count {
            w.set(i.to_string(), stamp.clone());
        }
        Ok(())
    })?;
    let elapsed = start.elapsed();

    println!(
        "added {count} rows in {elapsed:.2?} ({:.0} rows per second)",
        count as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}
