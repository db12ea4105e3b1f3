//! TriDB CLI
//!
//! Command-line tools for TriDB database files.
//!
//! # Commands
//!
//! - `set` / `get` / `delete` / `has` - point operations on single keys
//! - `count` / `keys` - ordered, optionally prefix-scoped scans
//! - `compact` - rewrite the log, dropping dead rows
//! - `backup` - byte-for-byte copy of the log to another file
//! - `fill` - bulk-insert generated rows
//! - `shell` - interactive session reading commands from stdin

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tridb_core::Database;

/// TriDB command-line database tools.
#[derive(Parser)]
#[command(name = "tridb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set a key-value pair
    Set {
        /// Key to set
        key: String,
        /// Value to associate with the key
        value: String,
    },

    /// Print the value associated with a key
    Get {
        /// Key to look up
        key: String,
    },

    /// Delete a key-value pair
    Delete {
        /// Key to delete
        key: String,
    },

    /// Report whether a key exists
    Has {
        /// Key to test
        key: String,
    },

    /// Count unique keys
    Count {
        /// Only count keys with this prefix
        prefix: Option<String>,
    },

    /// List keys in lexicographic order
    Keys {
        /// Only list keys with this prefix
        prefix: Option<String>,

        /// Reverse the order
        #[arg(short, long)]
        reverse: bool,

        /// Also print each key's value
        #[arg(long)]
        values: bool,
    },

    /// Rewrite the log, dropping deleted and overwritten rows
    Compact,

    /// Copy the log byte-for-byte to a backup file
    Backup {
        /// File to write the backup to
        output: PathBuf,
    },

    /// Insert a number of generated rows
    Fill {
        /// How many rows to insert
        count: usize,
    },

    /// Interactive session reading commands from stdin
    Shell,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = cli.path.ok_or("database path required (use --path)")?;
    let db = Database::open(&path)?;

    match cli.command {
        Commands::Set { key, value } => commands::kv::set(&db, &key, &value)?,
        Commands::Get { key } => commands::kv::get(&db, &key)?,
        Commands::Delete { key } => commands::kv::delete(&db, &key)?,
        Commands::Has { key } => commands::kv::has(&db, &key)?,
        Commands::Count { prefix } => commands::scan::count(&db, prefix.as_deref())?,
        Commands::Keys {
            prefix,
            reverse,
            values,
        } => commands::scan::keys(&db, prefix.as_deref(), reverse, values)?,
        Commands::Compact => commands::maintain::compact(&db)?,
        Commands::Backup { output } => commands::maintain::backup(&db, &output)?,
        Commands::Fill { count } => commands::maintain::fill(&db, count)?,
        Commands::Shell => commands::shell::run(&db)?,
    }

    db.close()?;
    Ok(())
}
