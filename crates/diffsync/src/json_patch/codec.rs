//! JSON codec for patch operations.
//!
//! Converts operations to and from `serde_json::Value` in RFC 6902 wire
//! format: `{"op": ..., "path": ..., "value"?: ..., "from"?: ...}` with
//! RFC 6901 pointer paths.

use serde_json::{json, Value};

use super::types::{Op, PatchError, Path};

// ── Pointer paths ─────────────────────────────────────────────────────────
//
// Paths live in memory as unescaped tokens (`Path = Vec<String>`) and on
// the wire as RFC 6901 pointers: tokens joined with `/`, where `~` inside
// a token is written `~0` and `/` is written `~1`. The empty pointer is
// the root path.

fn encode_path(path: &[String]) -> Value {
    let mut out = String::with_capacity(path.len() * 8);
    for token in path {
        out.push('/');
        for c in token.chars() {
            match c {
                '~' => out.push_str("~0"),
                '/' => out.push_str("~1"),
                _ => out.push(c),
            }
        }
    }
    Value::String(out)
}

fn decode_path(v: &Value) -> Result<Path, PatchError> {
    let pointer = v
        .as_str()
        .ok_or_else(|| PatchError::InvalidOp("path must be a string".into()))?;
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(PatchError::InvalidOp(format!(
            "malformed pointer: {pointer}"
        )));
    };
    rest.split('/').map(decode_token).collect()
}

/// Unescape one reference token; a `~` must be followed by `0` or `1`.
fn decode_token(raw: &str) -> Result<String, PatchError> {
    if !raw.contains('~') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => {
                return Err(PatchError::InvalidOp(format!(
                    "bad escape in pointer token: {raw}"
                )))
            }
        }
    }
    Ok(out)
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize an `Op` to its wire representation.
pub fn to_json(op: &Op) -> Value {
    match op {
        Op::Add { path, value } => json!({
            "op": "add",
            "path": encode_path(path),
            "value": value,
        }),
        Op::Remove { path } => json!({
            "op": "remove",
            "path": encode_path(path),
        }),
        Op::Replace { path, value } => json!({
            "op": "replace",
            "path": encode_path(path),
            "value": value,
        }),
        Op::Move { path, from } => json!({
            "op": "move",
            "path": encode_path(path),
            "from": encode_path(from),
        }),
        Op::Copy { path, from } => json!({
            "op": "copy",
            "path": encode_path(path),
            "from": encode_path(from),
        }),
        Op::Test { path, value } => json!({
            "op": "test",
            "path": encode_path(path),
            "value": value,
        }),
    }
}

/// Serialize a list of operations to a JSON array.
pub fn to_json_patch(ops: &[Op]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Deserialize a wire value into an `Op`.
///
/// Unknown operation names are rejected, including the `get` terminator
/// some JSON Patch libraries use internally; it has no business on the
/// wire.
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let name = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::InvalidOp("missing 'op' field".into()))?;
    let path = decode_path(
        obj.get("path")
            .ok_or_else(|| PatchError::InvalidOp("missing 'path' field".into()))?,
    )?;

    let value = |key: &str| -> Result<Value, PatchError> {
        obj.get(key)
            .cloned()
            .ok_or_else(|| PatchError::InvalidOp(format!("{name} requires '{key}'")))
    };
    let from = || -> Result<Path, PatchError> {
        decode_path(
            obj.get("from")
                .ok_or_else(|| PatchError::InvalidOp(format!("{name} requires 'from'")))?,
        )
    };

    match name {
        "add" => Ok(Op::Add { path, value: value("value")? }),
        "remove" => Ok(Op::Remove { path }),
        "replace" => Ok(Op::Replace { path, value: value("value")? }),
        "move" => Ok(Op::Move { path, from: from()? }),
        "copy" => Ok(Op::Copy { path, from: from()? }),
        "test" => Ok(Op::Test { path, value: value("value")? }),
        other => Err(PatchError::InvalidOp(format!("unknown op: {other}"))),
    }
}

/// Deserialize a JSON array into a list of operations.
pub fn from_json_patch(v: &Value) -> Result<Vec<Op>, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::InvalidOp("patch must be an array".into()))?;
    arr.iter().map(from_json).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────
