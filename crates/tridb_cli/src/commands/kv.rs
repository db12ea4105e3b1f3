//! Point operations on single keys.

use tridb_core::Database;

/// Sets a key-value pair.
pub fn set(db: &Database, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    db.read_write(|_r, w| {
        w.set(key, value);
        Ok(())
    })?;
    println!("{key:?} is now {value:?}");
    Ok(())
}

/// Prints the value associated with a key.
pub fn get(db: &Database, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let value = db.read(|r| r.get(key.as_bytes()))?;
    match value {
        Some(value) => println!("{}", String::from_utf8_lossy(&value)),
        None => println!("{key:?} not found"),
    }
    Ok(())
}

/// Deletes a key-value pair.
pub fn delete(db: &Database, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    db.read_write(|_r, w| {
        w.delete(key);
        Ok(())
    })?;
    println!("deleted {key:?}");
    Ok(())
}

/// Reports whether a key exists.
pub fn has(db: &Database, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let found = db.read(|r| Ok(r.has(key.as_bytes())))?;
    println!("{found}");
    Ok(())
}
