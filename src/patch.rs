//! Dotted-path document patching helpers.
//!
//! `patch` takes `--set key=value` pairs on the command line, so values
//! arrive as strings and get coerced to JSON by best effort, and keys use
//! dots to address nested fields (`children.0.size=100` style paths are
//! object keys here, not array indices).

use anyhow::{bail, Result};
use serde_json::Value;

/// Split a `--set` argument into key and raw value.
pub fn parse_set_arg(kv: &str) -> Result<(&str, &str)> {
    match kv.split_once('=') {
        Some((k, v)) => Ok((k, v)),
        None => bail!("Invalid --set value: {}; expected key=value", kv),
    }
}

/// Coerce a raw CLI string into a JSON value.
///
/// Precedence: `null`, `true`/`false`, integer (all digits, optional
/// leading `-`), float, fallback string. Digit strings that overflow i64
/// and non-finite float parses fall through to the next branch.
pub fn coerce_value(raw: &str) -> Value {
    match raw {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::from(n);
        }
    }

    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }

    Value::String(raw.to_string())
}

/// Set `value` at a dotted path inside `doc`, creating intermediate
/// objects as needed.
///
/// An intermediate key holding a non-object value is silently replaced
/// with an empty object. Matches the reference tool; callers patching
/// scalar fields with nested keys will clobber them.
pub fn set_dotted_path(doc: &mut Value, key: &str, value: Value) {
    let mut parts = key.split('.').peekable();
    let mut cur = doc;

    while let Some(part) = parts.next() {
        let map = match cur.as_object_mut() {
            Some(map) => map,
            None => return,
        };
        if parts.peek().is_none() {
            map.insert(part.to_string(), value);
            return;
        }
        let entry = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
        if !entry.is_object() {
            *entry = Value::Object(Default::default());
        }
        cur = entry;
    }
}
