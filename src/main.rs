//! lsadmin - admin CLI for the CouchDB behind Obsidian LiveSync.
//!
//! List, fetch, patch, delete and back up LiveSync documents, and compute
//! the path-to-id mapping the plugin uses. One command per process, all
//! network calls blocking. Any failure prints `ERROR: <message>` to stderr
//! and exits 1.

mod cli;
mod client;
mod ident;
mod patch;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::List {
            connect,
            doc_type,
            limit,
        } => cli::commands::list(&connect, doc_type.as_deref(), limit),
        Commands::Get { connect, id } => cli::commands::get(&connect, &id),
        Commands::BackupAll { connect, out } => cli::commands::backup_all(&connect, &out),
        Commands::Patch { connect, id, set } => cli::commands::patch(&connect, &id, &set),
        Commands::Delete { connect, id } => cli::commands::delete(&connect, &id),
        Commands::Path2id {
            path,
            case_insensitive,
            obfuscate_passphrase,
        } => cli::commands::path2id_cmd(&path, case_insensitive, obfuscate_passphrase.as_deref()),
    }
}

fn main() {
    // Silent unless RUST_LOG is set (e.g. RUST_LOG=debug for request traces).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("ERROR: {:#}", err);
        std::process::exit(1);
    }
}
