//! CLI definitions and command implementations for lsadmin.

pub mod commands;

use clap::{Args, Parser, Subcommand};

/// lsadmin - operate the Obsidian LiveSync CouchDB safely
#[derive(Parser)]
#[command(name = "lsadmin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Connection flags shared by every network command.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// CouchDB base URL, e.g. http://127.0.0.1:5984
    #[arg(long)]
    pub url: String,

    /// CouchDB user name
    #[arg(long)]
    pub user: String,

    /// CouchDB password
    #[arg(long)]
    pub password: String,

    /// Database name
    #[arg(long)]
    pub db: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List docs via _find
    List {
        #[command(flatten)]
        connect: ConnectArgs,

        /// Filter by type (plain/newnote/leaf/...)
        #[arg(long = "type")]
        doc_type: Option<String>,

        /// Maximum number of documents to return
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Get one doc by id
    Get {
        #[command(flatten)]
        connect: ConnectArgs,

        /// Document id
        #[arg(long)]
        id: String,
    },

    /// Backup all docs with include_docs=true
    BackupAll {
        #[command(flatten)]
        connect: ConnectArgs,

        /// Output JSON file path
        #[arg(long)]
        out: std::path::PathBuf,
    },

    /// Patch a doc with key=value fields
    Patch {
        #[command(flatten)]
        connect: ConnectArgs,

        /// Document id
        #[arg(long)]
        id: String,

        /// Dot path key=value; repeatable
        #[arg(long = "set", required = true)]
        set: Vec<String>,
    },

    /// Delete by id with latest _rev
    Delete {
        #[command(flatten)]
        connect: ConnectArgs,

        /// Document id
        #[arg(long)]
        id: String,
    },

    /// Compute the LiveSync _id for an Obsidian path (no network)
    Path2id {
        /// Vault path, e.g. notes/daily.md
        #[arg(long)]
        path: String,

        /// Lower-case the path first (vaults synced case-insensitively)
        #[arg(long)]
        case_insensitive: bool,

        /// Set when path obfuscation is enabled in the plugin
        #[arg(long)]
        obfuscate_passphrase: Option<String>,
    },
}
