//! diffsync — client-side Differential Synchronization engine.
//!
//! Implements the client half of Neil Fraser's differential-sync protocol
//! for structured documents: each side keeps a *shadow* of the peer's last
//! known state and exchanges compact edits diffed against it. The engine
//! tolerates duplicated, dropped, and reordered patch messages through
//! version-stamped edits, a pending-edit queue with full retransmission,
//! and a backup shadow to recover from divergence.
//!
//! Two synchronizer flavors ship with the engine: JSON documents with
//! RFC 6902 edits, and plain text with character-level diff runs.

// Leaf primitives
pub mod json_patch;
pub mod json_patch_diff;
pub mod util_diff;

// Protocol records and persistence
pub mod document;
pub mod store;

// Strategies and the engine on top
pub mod engine;
pub mod sync;

pub use document::{BackupShadowDocument, ClientDocument, Edit, PatchMessage, ShadowDocument};
pub use engine::{ClientSyncEngine, EngineError};
pub use store::{DataStore, InMemoryDataStore};
pub use sync::{JsonSynchronizer, Synchronizer, TextSynchronizer};
