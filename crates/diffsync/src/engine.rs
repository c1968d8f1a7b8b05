//! The client sync engine.
//!
//! Drives the differential-synchronization protocol for any synchronizer
//! flavor: producing outbound edits with `diff`, applying inbound patch
//! messages through the version-gated state machine, and keeping the
//! shadow/backup pair consistent across packet loss and replays.
//!
//! The engine is single-threaded per document. All operations for one
//! `(document_id, client_id)` pair must be serialized by the caller; the
//! engine itself holds no locks, and callbacks run synchronously before
//! `patch` returns. Callbacks must not re-enter the engine for the same
//! document.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::document::{BackupShadowDocument, ClientDocument, PatchMessage, ShadowDocument};
use crate::store::DataStore;
use crate::sync::Synchronizer;

#[derive(Debug, Error)]
pub enum EngineError<E> {
    /// A patch arrived for a document that was never registered with
    /// [`ClientSyncEngine::add`]. The update was applied to the stored
    /// state but nobody was there to observe it.
    #[error("no callback registered for document {0}")]
    MissingCallback(String),
    /// A diff operation could not be applied. The shadow and backup are
    /// left untouched for the offending edit.
    #[error("failed to apply patch edit: {0}")]
    PatchApplication(E),
}

pub type PatchCallback<T> = Box<dyn FnMut(&ClientDocument<T>)>;

pub struct ClientSyncEngine<S, St>
where
    S: Synchronizer,
{
    synchronizer: S,
    store: St,
    callbacks: HashMap<String, PatchCallback<S::Content>>,
}

impl<S, St> ClientSyncEngine<S, St>
where
    S: Synchronizer,
    S::Content: Clone,
    S::Diff: Clone,
    St: DataStore<S::Content, S::Diff>,
{
    pub fn new(synchronizer: S, store: St) -> Self {
        ClientSyncEngine {
            synchronizer,
            store,
            callbacks: HashMap::new(),
        }
    }

    /// Read access to the backing store, for inspecting the persisted
    /// document/shadow/backup records.
    pub fn store(&self) -> &St {
        &self.store
    }

    /// Register a document for synchronization.
    ///
    /// Stores the working document, a shadow at versions `(0, 0)` with the
    /// same content, and a backup of that shadow at version `0`. The
    /// callback fires whenever an inbound patch produces a new working
    /// document for this id.
    pub fn add<F>(&mut self, document: ClientDocument<S::Content>, callback: F)
    where
        F: FnMut(&ClientDocument<S::Content>) + 'static,
    {
        let shadow = ShadowDocument {
            client_version: 0,
            server_version: 0,
            client_document: document.clone(),
        };
        self.callbacks
            .insert(document.id.clone(), Box::new(callback));
        self.store.save_client_document(document);
        self.store.save_backup(BackupShadowDocument {
            version: 0,
            shadow_document: shadow.clone(),
        });
        self.store.save_shadow(shadow);
    }

    /// Produce a patch message describing local changes to `document`.
    ///
    /// The new edit is appended to the pending queue and the shadow
    /// advances one client version. The returned message carries the
    /// entire queue, not just the fresh edit, so earlier unacknowledged
    /// edits are retransmitted until the peer confirms them.
    ///
    /// Returns `None` when no shadow exists for the document, i.e. it was
    /// never registered.
    pub fn diff(
        &mut self,
        document: &ClientDocument<S::Content>,
    ) -> Option<PatchMessage<S::Diff>> {
        let shadow = self.store.get_shadow(&document.id, &document.client_id)?;
        let edit = self.synchronizer.server_diff(document, &shadow);
        self.store.save_edit(edit.clone());

        let mut patched = match self.synchronizer.patch_shadow(&edit, &shadow) {
            Ok(patched) => patched,
            Err(_) => {
                warn!(
                    document_id = %document.id,
                    "freshly produced edit failed to apply to its own shadow"
                );
                return None;
            }
        };
        patched.client_version += 1;
        self.store.save_shadow(patched);

        let edits = self
            .store
            .get_edits(&document.id, &document.client_id)
            .unwrap_or_default();
        Some(
            self.synchronizer
                .create_patch_message(&document.id, &document.client_id, edits),
        )
    }

    /// Apply an inbound patch message.
    ///
    /// Edits are processed in message order; stale, mismatched, and
    /// backup-restorable edits are handled per edit without aborting the
    /// call. If any edit advanced the shadow, the working document is
    /// reconciled, a fresh backup is snapshotted, and the registered
    /// callback is invoked exactly once with the new document.
    pub fn patch(
        &mut self,
        message: &PatchMessage<S::Diff>,
    ) -> Result<(), EngineError<S::Error>> {
        let document_id = &message.document_id;
        let client_id = &message.client_id;
        let Some(mut shadow) = self.store.get_shadow(document_id, client_id) else {
            return Ok(());
        };
        let mut advanced = false;

        for edit in &message.edits {
            // A re-sent edit we have already applied; drop our queued copy.
            if edit.server_version < shadow.server_version {
                debug!(
                    document_id = %document_id,
                    edit_server_version = edit.server_version,
                    shadow_server_version = shadow.server_version,
                    "discarding stale edit"
                );
                self.store.remove_edit(edit);
                continue;
            }

            if edit.is_seed() {
                // The peer re-anchors the conversation: adopt the patched
                // state and restart client versioning at zero.
                let mut patched = self
                    .synchronizer
                    .patch_shadow(edit, &shadow)
                    .map_err(EngineError::PatchApplication)?;
                self.store.remove_edit(edit);
                patched.client_version = 0;
                self.store.save_shadow(patched.clone());
                shadow = patched;
                advanced = true;
                continue;
            }

            if edit.client_version < shadow.client_version {
                // The peer never saw our recent edits. If the backup still
                // matches the version the edit was made against, roll back
                // to it and drop the whole pending queue.
                match self.store.get_backup(document_id, client_id) {
                    Some(backup) if backup.version == edit.client_version => {
                        let base = ShadowDocument {
                            client_version: shadow.client_version,
                            server_version: shadow.server_version,
                            client_document: backup.shadow_document.client_document.clone(),
                        };
                        let restored = self
                            .synchronizer
                            .patch_shadow(edit, &base)
                            .map_err(EngineError::PatchApplication)?;
                        self.store.remove_edits(document_id, client_id);
                        self.store.save_shadow(restored.clone());
                        shadow = restored;
                        advanced = true;
                    }
                    Some(backup) => {
                        warn!(
                            document_id = %document_id,
                            backup_version = backup.version,
                            edit_client_version = edit.client_version,
                            "backup does not match diverged edit, skipping"
                        );
                    }
                    None => {
                        warn!(
                            document_id = %document_id,
                            "no backup available for diverged edit, skipping"
                        );
                    }
                }
                continue;
            }

            if edit.server_version == shadow.server_version
                && edit.client_version == shadow.client_version
            {
                let mut patched = self
                    .synchronizer
                    .patch_shadow(edit, &shadow)
                    .map_err(EngineError::PatchApplication)?;
                self.store.remove_edit(edit);
                patched.server_version += 1;
                self.store.save_shadow(patched.clone());
                shadow = patched;
                advanced = true;
                continue;
            }

            warn!(
                document_id = %document_id,
                edit_versions = ?(edit.client_version, edit.server_version),
                shadow_versions = ?(shadow.client_version, shadow.server_version),
                "edit matches neither shadow nor backup, skipping"
            );
        }

        if !advanced {
            return Ok(());
        }

        let Some(document) = self.store.get_client_document(document_id, client_id) else {
            return Ok(());
        };
        let reconcile = self.synchronizer.client_diff(&document, &shadow);
        let patched_document = self
            .synchronizer
            .patch_document(&reconcile, &document)
            .map_err(EngineError::PatchApplication)?;
        self.store.save_client_document(patched_document.clone());
        self.store.save_backup(BackupShadowDocument {
            version: shadow.client_version,
            shadow_document: shadow,
        });

        match self.callbacks.get_mut(document_id) {
            Some(callback) => {
                callback(&patched_document);
                Ok(())
            }
            None => Err(EngineError::MissingCallback(document_id.clone())),
        }
    }

    /// Parse a raw patch-message string via the synchronizer's codec.
    pub fn patch_message_from_json(&self, raw: &str) -> Option<PatchMessage<S::Diff>> {
        self.synchronizer.patch_message_from_json(raw)
    }

    /// Serialize a patch message for the transport.
    pub fn patch_message_to_json(&self, message: &PatchMessage<S::Diff>) -> String {
        self.synchronizer.patch_message_to_json(message)
    }

    /// Build the initial `"add"` handshake message for a document.
    pub fn document_to_json(&self, document: &ClientDocument<S::Content>) -> String {
        let mut out = String::from("{\"msgType\":\"add\",\"id\":");
        out.push_str(&json_string(&document.id));
        out.push_str(",\"clientId\":");
        out.push_str(&json_string(&document.client_id));
        out.push(',');
        self.synchronizer.add_content(document, "content", &mut out);
        out.push('}');
        out
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
