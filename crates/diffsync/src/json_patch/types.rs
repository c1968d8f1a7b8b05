//! Core types for the JSON Patch module.

use serde_json::Value;
use thiserror::Error;

/// A parsed JSON Pointer: the unescaped reference tokens from root to the
/// target location. Empty means the root value itself.
pub type Path = Vec<String>;

#[derive(Debug, Error, PartialEq)]
pub enum PatchError {
    #[error("path not found")]
    NotFound,
    #[error("test operation failed")]
    TestFailed,
    #[error("invalid array index")]
    InvalidIndex,
    #[error("target is not a container")]
    InvalidTarget,
    #[error("invalid operation: {0}")]
    InvalidOp(String),
}

/// A single RFC 6902 operation.
///
/// `PartialEq` is derived because pending-edit queues compare whole edits,
/// diffs included, to identify acknowledged copies.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Move { path: Path, from: Path },
    Copy { path: Path, from: Path },
    Test { path: Path, value: Value },
}

impl Op {
    /// The operation name as it appears on the wire.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Move { .. } => "move",
            Op::Copy { .. } => "copy",
            Op::Test { .. } => "test",
        }
    }

    /// The target path of the operation.
    pub fn path(&self) -> &Path {
        match self {
            Op::Add { path, .. } => path,
            Op::Remove { path } => path,
            Op::Replace { path, .. } => path,
            Op::Move { path, .. } => path,
            Op::Copy { path, .. } => path,
            Op::Test { path, .. } => path,
        }
    }
}
