//! Interactive shell.

use crate::commands::{kv, maintain, scan};
use std::io::{self, BufRead, Write};
use tridb_core::Database;

/// Runs an interactive session reading commands from stdin until EOF or
/// `exit`.
pub fn run(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Loaded {:?}. Type a command and press enter (`help` lists commands).",
        db.path()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("? ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        match dispatch(db, line?.trim()) {
            Ok(true) => {}
            Ok(false) => break,
            // A failed command ends neither the shell nor the process.
            Err(err) => eprintln!("{err}"),
        }
    }

    println!("goodbye!");
    Ok(())
}

/// Executes one shell line. Returns `false` when the session should end.
fn dispatch(db: &Database, line: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let mut parts = line.split_whitespace();
    let Some(keyword) = parts.next() else {
        return Ok(true);
    };
    let args: Vec<&str> = parts.collect();

    match (keyword, args.as_slice()) {
        ("set" | "+", [key, value]) => kv::set(db, key, value)?,
        ("get", [key]) => kv::get(db, key)?,
        ("delete" | "-", [key]) => kv::delete(db, key)?,
        ("has", [key]) => kv::has(db, key)?,
        ("count", []) => scan::count(db, None)?,
        ("count", [prefix]) => scan::count(db, Some(prefix))?,
        ("keys", []) => scan::keys(db, None, false, false)?,
        ("keys", [prefix]) => scan::keys(db, Some(prefix), false, false)?,
        ("compact", []) => maintain::compact(db)?,
        ("fill", [count]) => maintain::fill(db, count.parse()?)?,
        ("help", _) => print_help(),
        ("exit" | "quit", _) => return Ok(false),
        _ => {
            println!("command not found or wrong arguments: {line:?}");
            print_help();
        }
    }
    Ok(true)
}

fn print_help() {
    println!("Available commands:");
    for (usage, desc) in [
        ("set KEY VALUE", "set a key-value pair"),
        ("get KEY", "print the value associated with a key"),
        ("delete KEY", "delete a key-value pair"),
        ("has KEY", "report whether a key exists"),
        ("count [PREFIX]", "count unique keys"),
        ("keys [PREFIX]", "list keys in lexicographic order"),
        ("compact", "rewrite the log, dropping dead rows"),
        ("fill N", "insert N generated rows"),
        ("exit", "end the session"),
    ] {
        println!("> {usage:<15} {desc}");
    }
}
