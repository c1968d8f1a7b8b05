//! JSON Patch apply logic.
//!
//! Operations mutate the document in place; `apply_ops` consumes the
//! document and hands back the patched root, so callers never see a
//! half-applied value on error paths that matter to them.

use serde_json::Value;

use super::types::{Op, PatchError};

// ── Path navigation ───────────────────────────────────────────────────────

fn parse_index(token: &str) -> Result<usize, PatchError> {
    token.parse().map_err(|_| PatchError::InvalidIndex)
}

/// Immutable walk to the value at `path`.
fn resolve<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = doc;
    for token in path {
        current = match current {
            Value::Object(map) => map.get(token)?,
            Value::Array(arr) => arr.get(parse_index(token).ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable walk to the value at `path` (must exist).
fn resolve_mut<'a>(doc: &'a mut Value, path: &[String]) -> Result<&'a mut Value, PatchError> {
    let mut current = doc;
    for token in path {
        current = match current {
            Value::Object(map) => map.get_mut(token).ok_or(PatchError::NotFound)?,
            Value::Array(arr) => {
                let index = parse_index(token)?;
                arr.get_mut(index).ok_or(PatchError::NotFound)?
            }
            _ => return Err(PatchError::NotFound),
        };
    }
    Ok(current)
}

// ── Individual operation applicators ──────────────────────────────────────

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent_path, last) = path.split_at(path.len() - 1);
    let key = &last[0];
    let parent = resolve_mut(doc, parent_path)?;
    match parent {
        // Adding to an existing object key acts as replace.
        Value::Object(map) => {
            map.insert(key.clone(), value);
            Ok(())
        }
        Value::Array(arr) => {
            if key == "-" {
                arr.push(value);
                return Ok(());
            }
            let index = parse_index(key)?;
            if index > arr.len() {
                return Err(PatchError::InvalidIndex);
            }
            arr.insert(index, value);
            Ok(())
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_remove(doc: &mut Value, path: &[String]) -> Result<Value, PatchError> {
    if path.is_empty() {
        return Err(PatchError::InvalidTarget);
    }
    let (parent_path, last) = path.split_at(path.len() - 1);
    let key = &last[0];
    let parent = resolve_mut(doc, parent_path)?;
    match parent {
        Value::Object(map) => map.remove(key).ok_or(PatchError::NotFound),
        Value::Array(arr) => {
            let index = parse_index(key)?;
            if index >= arr.len() {
                return Err(PatchError::NotFound);
            }
            Ok(arr.remove(index))
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<(), PatchError> {
    let target = resolve_mut(doc, path)?;
    *target = value;
    Ok(())
}

fn apply_copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<(), PatchError> {
    let source = resolve(doc, from).ok_or(PatchError::NotFound)?.clone();
    apply_add(doc, path, source)
}

fn apply_move(doc: &mut Value, path: &[String], from: &[String]) -> Result<(), PatchError> {
    // A location cannot be moved into one of its own children.
    if path.len() > from.len() && path[..from.len()] == from[..] {
        return Err(PatchError::InvalidTarget);
    }
    let value = apply_remove(doc, from)?;
    apply_add(doc, path, value)
}

fn apply_test(doc: &Value, path: &[String], value: &Value) -> Result<(), PatchError> {
    let actual = resolve(doc, path).ok_or(PatchError::NotFound)?;
    if actual == value {
        Ok(())
    } else {
        Err(PatchError::TestFailed)
    }
}

// ── Main apply functions ──────────────────────────────────────────────────

/// Apply a single operation to the document in place.
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<(), PatchError> {
    match op {
        Op::Add { path, value } => apply_add(doc, path, value.clone()),
        Op::Remove { path } => apply_remove(doc, path).map(|_| ()),
        Op::Replace { path, value } => apply_replace(doc, path, value.clone()),
        Op::Move { path, from } => apply_move(doc, path, from),
        Op::Copy { path, from } => apply_copy(doc, path, from),
        Op::Test { path, value } => apply_test(doc, path, value),
    }
}

/// Apply a sequence of operations, returning the patched root value.
pub fn apply_ops(mut doc: Value, ops: &[Op]) -> Result<Value, PatchError> {
    for op in ops {
        apply_op(&mut doc, op)?;
    }
    Ok(doc)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> Vec<String> {
        if s.is_empty() {
            return vec![];
        }
        s[1..].split('/').map(str::to_string).collect()
    }

    #[test]
    fn add_to_object() {
        let mut doc = json!({"a": 1});
        apply_op(&mut doc, &Op::Add { path: path("/b"), value: json!(2) }).unwrap();
        assert_eq!(doc, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn add_existing_key_replaces() {
        let mut doc = json!({"a": 1});
        apply_op(&mut doc, &Op::Add { path: path("/a"), value: json!(9) }).unwrap();
        assert_eq!(doc, json!({"a": 9}));
    }

    #[test]
    fn add_to_array() {
        let mut doc = json!([1, 2, 3]);
        apply_op(&mut doc, &Op::Add { path: path("/1"), value: json!(99) }).unwrap();
        assert_eq!(doc, json!([1, 99, 2, 3]));
    }

    #[test]
    fn add_append_array() {
        let mut doc = json!([1, 2]);
        apply_op(&mut doc, &Op::Add { path: path("/-"), value: json!(3) }).unwrap();
        assert_eq!(doc, json!([1, 2, 3]));
    }

    #[test]
    fn add_past_end_is_invalid() {
        let mut doc = json!([1]);
        let result = apply_op(&mut doc, &Op::Add { path: path("/5"), value: json!(0) });
        assert_eq!(result, Err(PatchError::InvalidIndex));
    }

    #[test]
    fn add_at_root_replaces_document() {
        let mut doc = json!({"a": 1});
        apply_op(&mut doc, &Op::Add { path: path(""), value: json!([1, 2]) }).unwrap();
        assert_eq!(doc, json!([1, 2]));
    }

    #[test]
    fn remove_from_object() {
        let mut doc = json!({"a": 1, "b": 2});
        apply_op(&mut doc, &Op::Remove { path: path("/a") }).unwrap();
        assert_eq!(doc, json!({"b": 2}));
    }

    #[test]
    fn remove_from_array() {
        let mut doc = json!([1, 2, 3]);
        apply_op(&mut doc, &Op::Remove { path: path("/1") }).unwrap();
        assert_eq!(doc, json!([1, 3]));
    }

    #[test]
    fn remove_missing_key_fails() {
        let mut doc = json!({"a": 1});
        let result = apply_op(&mut doc, &Op::Remove { path: path("/z") });
        assert_eq!(result, Err(PatchError::NotFound));
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn replace_value() {
        let mut doc = json!({"a": 1});
        apply_op(&mut doc, &Op::Replace { path: path("/a"), value: json!(99) }).unwrap();
        assert_eq!(doc, json!({"a": 99}));
    }

    #[test]
    fn replace_missing_key_fails() {
        let mut doc = json!({"a": 1});
        let result = apply_op(&mut doc, &Op::Replace { path: path("/b"), value: json!(0) });
        assert_eq!(result, Err(PatchError::NotFound));
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn replace_nested() {
        let mut doc = json!({"a": {"b": [1, 2]}});
        apply_op(&mut doc, &Op::Replace { path: path("/a/b/1"), value: json!(9) }).unwrap();
        assert_eq!(doc, json!({"a": {"b": [1, 9]}}));
    }

    #[test]
    fn copy_op() {
        let mut doc = json!({"a": {"x": 1}, "b": {}});
        apply_op(&mut doc, &Op::Copy { path: path("/b/x"), from: path("/a/x") }).unwrap();
        assert_eq!(doc["b"]["x"], json!(1));
    }

    #[test]
    fn move_op() {
        let mut doc = json!({"a": 1, "b": 2});
        apply_op(&mut doc, &Op::Move { path: path("/c"), from: path("/a") }).unwrap();
        assert_eq!(doc, json!({"b": 2, "c": 1}));
    }

    #[test]
    fn move_into_own_child_fails() {
        let mut doc = json!({"a": {"b": {}}});
        let result = apply_op(&mut doc, &Op::Move { path: path("/a/b/c"), from: path("/a") });
        assert_eq!(result, Err(PatchError::InvalidTarget));
    }

    #[test]
    fn test_pass() {
        let mut doc = json!({"a": 42});
        apply_op(&mut doc, &Op::Test { path: path("/a"), value: json!(42) }).unwrap();
    }

    #[test]
    fn test_fail() {
        let mut doc = json!({"a": 42});
        let result = apply_op(&mut doc, &Op::Test { path: path("/a"), value: json!(99) });
        assert_eq!(result, Err(PatchError::TestFailed));
    }

    #[test]
    fn test_ignores_object_key_order() {
        let mut doc = serde_json::from_str::<Value>(r#"{"b": 2, "a": 1}"#).unwrap();
        apply_op(&mut doc, &Op::Test { path: path(""), value: json!({"a": 1, "b": 2}) }).unwrap();
    }

    #[test]
    fn apply_ops_sequence() {
        let doc = json!({"a": 1});
        let ops = vec![
            Op::Add { path: path("/b"), value: json!(2) },
            Op::Replace { path: path("/a"), value: json!(10) },
        ];
        let result = apply_ops(doc, &ops).unwrap();
        assert_eq!(result, json!({"a": 10, "b": 2}));
    }

    #[test]
    fn tokens_with_separator_chars_address_keys_literally() {
        let mut doc = json!({"a/b": 1, "m~n": 2});
        apply_op(&mut doc, &Op::Replace { path: vec!["a/b".to_string()], value: json!(3) })
            .unwrap();
        apply_op(&mut doc, &Op::Remove { path: vec!["m~n".to_string()] }).unwrap();
        assert_eq!(doc, json!({"a/b": 3}));
    }
}
