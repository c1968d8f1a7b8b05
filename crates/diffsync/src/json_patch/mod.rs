//! JSON Patch (RFC 6902) operations over `serde_json::Value`.
//!
//! Covers the six standard operations: `add`, `remove`, `replace`, `move`,
//! `copy`, `test`. Applying a patch returns the patched root value
//! directly.

pub mod apply;
pub mod codec;
pub mod types;

pub use apply::{apply_op, apply_ops};
pub use codec::{from_json, from_json_patch, to_json, to_json_patch};
pub use types::{Op, PatchError, Path};
