//! JSON Patch diff: generate a patch that transforms one value into
//! another.
//!
//! The differ walks both trees recursively. Keys present only in the
//! destination become `add`, keys present only in the source become
//! `remove`, and common keys recurse. When values of different shapes meet
//! at the same path the destination value wins as a single `replace`.
//! Arrays are compared positionally. On any one parent, `add`/`replace`
//! operations are emitted before `remove` operations.
//!
//! Contract with the apply side: `apply_ops(diff(a, b), a) == b`
//! structurally.

use serde_json::{Map, Value};

use crate::json_patch::types::Op;

/// Generate a JSON Patch transforming `src` into `dst`.
pub fn diff(src: &Value, dst: &Value) -> Vec<Op> {
    let mut ops = Vec::new();
    diff_at_path(&mut ops, &[], src, dst);
    ops
}

fn diff_at_path(ops: &mut Vec<Op>, path: &[String], src: &Value, dst: &Value) {
    if src == dst {
        return;
    }
    match (src, dst) {
        (Value::Object(s), Value::Object(d)) => diff_object(ops, path, s, d),
        (Value::Array(s), Value::Array(d)) => diff_array(ops, path, s, d),
        _ => ops.push(Op::Replace {
            path: path.to_vec(),
            value: dst.clone(),
        }),
    }
}

fn child(path: &[String], token: String) -> Vec<String> {
    let mut p = Vec::with_capacity(path.len() + 1);
    p.extend_from_slice(path);
    p.push(token);
    p
}

fn diff_object(
    ops: &mut Vec<Op>,
    path: &[String],
    src: &Map<String, Value>,
    dst: &Map<String, Value>,
) {
    // Adds and recursions first, removes after.
    for (key, dst_val) in dst {
        let p = child(path, key.clone());
        match src.get(key) {
            Some(src_val) => diff_at_path(ops, &p, src_val, dst_val),
            None => ops.push(Op::Add { path: p, value: dst_val.clone() }),
        }
    }
    for key in src.keys() {
        if !dst.contains_key(key) {
            ops.push(Op::Remove { path: child(path, key.clone()) });
        }
    }
}

fn diff_array(ops: &mut Vec<Op>, path: &[String], src: &[Value], dst: &[Value]) {
    let shared = src.len().min(dst.len());
    for i in 0..shared {
        diff_at_path(ops, &child(path, i.to_string()), &src[i], &dst[i]);
    }
    for (i, value) in dst.iter().enumerate().skip(shared) {
        ops.push(Op::Add {
            path: child(path, i.to_string()),
            value: value.clone(),
        });
    }
    // Remove surplus source elements back to front so indices stay valid.
    for i in (shared..src.len()).rev() {
        ops.push(Op::Remove { path: child(path, i.to_string()) });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
