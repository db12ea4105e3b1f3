//! Ordered key scans.

use tridb_core::{Database, WalkOptions};

/// Counts unique keys, optionally restricted to a prefix.
pub fn count(db: &Database, prefix: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let count = db.read(|r| {
        Ok(match prefix {
            Some(prefix) => r.count_prefix(prefix.as_bytes()),
            None => r.count(),
        })
    })?;
    println!("{count}");
    Ok(())
}

/// Lists keys in lexicographic order, optionally with their values.
pub fn keys(
    db: &Database,
    prefix: Option<&str>,
    reverse: bool,
    values: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let opts = WalkOptions::new()
        .prefix(prefix.unwrap_or_default().as_bytes().to_vec())
        .reverse(reverse);

    db.read(|r| {
        if values {
            r.walk_with_value(&opts, |key, value| {
                println!(
                    "{} {}",
                    String::from_utf8_lossy(key),
                    String::from_utf8_lossy(value)
                );
                Ok(())
            })
        } else {
            r.walk(&opts, |key| {
                println!("{}", String::from_utf8_lossy(key));
                Ok(())
            })
        }
    })?;
    Ok(())
}
