//! Path-to-document-id derivation matching Obsidian LiveSync.
//!
//! LiveSync addresses every note by a document id derived from its vault
//! path. With path obfuscation enabled the id is a salted SHA-256 digest
//! prefixed with `f:`, so ids on the server never leak file names. This
//! module reproduces that derivation bit-for-bit so `path2id` output can
//! be fed straight into `get`/`patch`/`delete`.

use sha2::{Digest, Sha256};

/// Hash a string the way LiveSync does.
///
/// The plugin hashes the UTF-8 bytes, then re-hashes the same bytes once
/// per character of the input, keeping only the last digest. Each round
/// starts from the original bytes (not the previous digest), so the result
/// equals a single SHA-256 - but the loop is part of the wire format and
/// must stay as-is for ids to match the plugin's.
fn hash_string(key: &str) -> String {
    let buff = key.as_bytes();
    let mut digest = Sha256::digest(buff);
    for _ in 0..key.chars().count() {
        digest = Sha256::digest(buff);
    }
    format!("{:x}", digest)
}

/// Compute the LiveSync document id for a vault path.
///
/// Without a passphrase the id is the path itself, with a leading `/`
/// inserted when the path starts with `_` (CouchDB reserves `_`-prefixed
/// ids for design documents). With a passphrase the path is hashed into
/// an `f:`-prefixed digest; inputs already in that form pass through
/// unchanged so the function never double-encodes.
pub fn path2id(path: &str, case_insensitive: bool, passphrase: Option<&str>) -> String {
    let normalized = if case_insensitive {
        path.to_lowercase()
    } else {
        path.to_string()
    };

    let source = if normalized.starts_with('_') {
        format!("/{}", normalized)
    } else {
        normalized.clone()
    };

    let passphrase = match passphrase {
        Some(p) if !p.is_empty() => p,
        _ => return source,
    };

    if source.starts_with("f:") {
        return source;
    }

    // An optional namespace prefix ("i:", "h:", ...) survives obfuscation.
    let (pref, body) = match source.split_once(':') {
        Some((maybe_prefix, body)) => (format!("{}:", maybe_prefix), body),
        None => (String::new(), source.as_str()),
    };
    if body.starts_with("f:") {
        return source;
    }

    let hashed_passphrase = hash_string(passphrase);
    // The digest covers the full normalized path, prefix included.
    let out = hash_string(&format!("{}:{}", hashed_passphrase, normalized));
    format!("{}f:{}", pref, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Expected values generated with the LiveSync plugin's own derivation.
    #[test]
    fn test_obfuscated_id_matches_plugin() {
        assert_eq!(
            path2id("notes/daily.md", false, Some("secret")),
            "f:11ea028c8053c28f5bdfbe682a6cf9023e25068321733aa0680d4d083071fccc"
        );
    }

    #[test]
    fn test_case_insensitive_folds_before_hashing() {
        assert_eq!(
            path2id("Notes/Daily.md", true, Some("secret")),
            path2id("notes/daily.md", false, Some("secret"))
        );
    }

    #[test]
    fn test_no_passphrase_returns_path() {
        assert_eq!(path2id("notes/daily.md", false, None), "notes/daily.md");
        assert_eq!(path2id("Notes/Daily.md", true, None), "notes/daily.md");
    }

    #[test]
    fn test_underscore_paths_are_escaped() {
        assert_eq!(path2id("_hidden/file.md", false, None), "/_hidden/file.md");
        // The hash input is the unescaped path, so the digest differs from
        // a path that genuinely starts with a slash.
        assert_eq!(
            path2id("_hidden/file.md", false, Some("secret")),
            "f:48b564c38f274f83fd07e4e20fdb12a57403c1bcb01477292e352ef02640e858"
        );
    }

    #[test]
    fn test_already_obfuscated_is_identity() {
        assert_eq!(path2id("f:abcdef", false, Some("secret")), "f:abcdef");
        assert_eq!(path2id("h:f:abcdef", false, Some("secret")), "h:f:abcdef");
    }

    #[test]
    fn test_namespace_prefix_survives() {
        assert_eq!(
            path2id("ns:notes/a.md", false, Some("pass phrase")),
            "ns:f:c0a194d898d1715387c7924c628fd2788a6d0223232936ddddb8ad27560a9acb"
        );
    }

    #[test]
    fn test_deterministic() {
        let a = path2id("some/file.md", true, Some("pw"));
        let b = path2id("some/file.md", true, Some("pw"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_passphrase_means_no_obfuscation() {
        assert_eq!(path2id("notes/a.md", false, Some("")), "notes/a.md");
    }
}
