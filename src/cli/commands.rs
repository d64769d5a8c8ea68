//! Command implementations for the lsadmin CLI.
//!
//! Each function takes parsed flags, drives the client, and renders the
//! result - pretty JSON on stdout, or a file for backup-all. Errors bubble
//! up to main untouched.

use crate::cli::ConnectArgs;
use crate::client::{Credentials, DocStoreClient};
use crate::ident::path2id;
use crate::patch::{coerce_value, parse_set_arg, set_dotted_path};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::{json, Value};
use std::path::Path;

/// Fields returned by `list`. Enough to identify a note and its sync
/// state without pulling chunk bodies.
const LIST_FIELDS: &[&str] = &["_id", "_rev", "type", "path", "mtime", "deleted"];

fn client_for(connect: &ConnectArgs) -> DocStoreClient {
    DocStoreClient::new(Credentials {
        base_url: connect.url.clone(),
        user: connect.user.clone(),
        password: connect.password.clone(),
        db: connect.db.clone(),
    })
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// List documents via `_find`, optionally filtered by `type`.
pub fn list(connect: &ConnectArgs, doc_type: Option<&str>, limit: usize) -> Result<()> {
    let selector = match doc_type {
        Some(t) => json!({ "type": t }),
        None => json!({}),
    };

    let docs = client_for(connect).find(&selector, limit, LIST_FIELDS)?;
    print_json(&Value::Array(docs.into_iter().map(Value::Object).collect()))
}

/// Fetch and print one document.
pub fn get(connect: &ConnectArgs, id: &str) -> Result<()> {
    let doc = client_for(connect).get(id)?;
    print_json(&doc)
}

/// Dump the whole database (full bodies) to a JSON file.
pub fn backup_all(connect: &ConnectArgs, out: &Path) -> Result<()> {
    let result = client_for(connect).all_docs()?;
    write_backup(&result, out)?;
    println!("{} {}", "Backup written:".green(), out.display());
    Ok(())
}

fn write_backup(result: &Value, out: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(out, json)
        .with_context(|| format!("Cannot write backup file: {}", out.display()))?;
    Ok(())
}

/// Fetch a document, apply `--set key=value` assignments, write it back.
///
/// Read-modify-write under CouchDB optimistic concurrency: the fetched
/// `_rev` rides along in the PUT, so a concurrent writer turns this into
/// a conflict error instead of a lost update.
pub fn patch(connect: &ConnectArgs, id: &str, sets: &[String]) -> Result<()> {
    let client = client_for(connect);
    let mut doc = client.get(id)?;

    for kv in sets {
        let (key, raw) = parse_set_arg(kv)?;
        set_dotted_path(&mut doc, key, coerce_value(raw));
    }

    let result = client.put(id, &doc)?;
    print_json(&result)
}

/// Delete a document at its latest revision.
pub fn delete(connect: &ConnectArgs, id: &str) -> Result<()> {
    let client = client_for(connect);
    let doc = client.get(id)?;

    let rev = match doc.get("_rev").and_then(Value::as_str) {
        Some(rev) => rev.to_string(),
        None => bail!("document {} has no _rev field", id),
    };

    let result = client.delete(id, &rev)?;
    print_json(&result)
}

/// Print the LiveSync document id for a vault path. Pure computation.
pub fn path2id_cmd(path: &str, case_insensitive: bool, passphrase: Option<&str>) -> Result<()> {
    println!("{}", path2id(path, case_insensitive, passphrase));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_backup_pretty_json() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let out = temp_dir.path().join("backup.json");

        let result = json!({
            "total_rows": 1,
            "rows": [{"id": "a", "doc": {"_id": "a", "_rev": "1-x"}}],
        });
        write_backup(&result, &out)?;

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&out)?)?;
        assert_eq!(written, result);

        Ok(())
    }

    #[test]
    fn test_write_backup_bad_path_is_error() {
        let result = json!({});
        let err = write_backup(&result, Path::new("/nonexistent-dir/backup.json"));
        assert!(err.is_err());
    }
}
