//! Document records exchanged and stored by the sync engine.
//!
//! All records are plain value types; "mutating" one means saving a
//! replacement record in the data store.

/// Version number carried by a seed edit, used by the server to re-anchor a
/// client whose shadow is unrecoverable.
pub const SEED_VERSION: i64 = -1;

/// The working copy of a document as the application sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDocument<T> {
    pub id: String,
    pub client_id: String,
    pub content: T,
}

impl<T> ClientDocument<T> {
    pub fn new(id: impl Into<String>, client_id: impl Into<String>, content: T) -> Self {
        ClientDocument {
            id: id.into(),
            client_id: client_id.into(),
            content,
        }
    }
}

/// The last state agreed between this client and its peer, together with the
/// two monotonic version counters of the differential-sync protocol.
///
/// `client_version` counts edits produced locally, `server_version` counts
/// edits received from the peer.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowDocument<T> {
    pub client_version: i64,
    pub server_version: i64,
    pub client_document: ClientDocument<T>,
}

/// Snapshot of the shadow taken at the last known-good synchronization
/// point. `version` mirrors the shadow's `client_version` at snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupShadowDocument<T> {
    pub version: i64,
    pub shadow_document: ShadowDocument<T>,
}

/// An ordered list of diffs stamped with the shadow versions at diff time.
///
/// An edit may be re-sent any number of times before the peer acknowledges
/// it; equality over all fields is what the pending-edit queue uses to drop
/// acknowledged copies.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit<D> {
    pub client_id: String,
    pub document_id: String,
    pub client_version: i64,
    pub server_version: i64,
    pub checksum: String,
    pub diffs: Vec<D>,
}

impl<D> Edit<D> {
    /// Builds an edit carrying `diffs`, stamped with the shadow's current
    /// version pair and an empty checksum.
    pub fn stamped<T>(
        document: &ClientDocument<T>,
        shadow: &ShadowDocument<T>,
        diffs: Vec<D>,
    ) -> Self {
        Edit {
            client_id: document.client_id.clone(),
            document_id: document.id.clone(),
            client_version: shadow.client_version,
            server_version: shadow.server_version,
            checksum: String::new(),
            diffs,
        }
    }

    /// True when this edit re-anchors the conversation.
    pub fn is_seed(&self) -> bool {
        self.client_version == SEED_VERSION
    }
}

/// A batch of edits for one document, as carried by a `"patch"` wire
/// message.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchMessage<D> {
    pub document_id: String,
    pub client_id: String,
    pub edits: Vec<Edit<D>>,
}
