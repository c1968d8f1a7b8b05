//! JSON-document synchronizer.
//!
//! Content is any `serde_json::Value`; edits carry RFC 6902 operations
//! produced by the recursive differ and applied by the patch module.

use serde_json::Value;

use crate::document::{ClientDocument, Edit, PatchMessage, ShadowDocument};
use crate::json_patch::{self, Op, PatchError};
use crate::json_patch_diff;

use super::{decode_envelope, encode_envelope, Synchronizer};

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSynchronizer;

impl JsonSynchronizer {
    pub fn new() -> Self {
        JsonSynchronizer
    }
}

impl Synchronizer for JsonSynchronizer {
    type Content = Value;
    type Diff = Op;
    type Error = PatchError;

    fn client_diff(
        &self,
        document: &ClientDocument<Value>,
        shadow: &ShadowDocument<Value>,
    ) -> Edit<Op> {
        let diffs = json_patch_diff::diff(&document.content, &shadow.client_document.content);
        Edit::stamped(document, shadow, diffs)
    }

    fn server_diff(
        &self,
        document: &ClientDocument<Value>,
        shadow: &ShadowDocument<Value>,
    ) -> Edit<Op> {
        let diffs = json_patch_diff::diff(&shadow.client_document.content, &document.content);
        Edit::stamped(document, shadow, diffs)
    }

    fn patch_shadow(
        &self,
        edit: &Edit<Op>,
        shadow: &ShadowDocument<Value>,
    ) -> Result<ShadowDocument<Value>, PatchError> {
        let content =
            json_patch::apply_ops(shadow.client_document.content.clone(), &edit.diffs)?;
        Ok(ShadowDocument {
            client_version: edit.client_version,
            server_version: shadow.server_version,
            client_document: ClientDocument {
                id: shadow.client_document.id.clone(),
                client_id: shadow.client_document.client_id.clone(),
                content,
            },
        })
    }

    fn patch_document(
        &self,
        edit: &Edit<Op>,
        document: &ClientDocument<Value>,
    ) -> Result<ClientDocument<Value>, PatchError> {
        let content = json_patch::apply_ops(document.content.clone(), &edit.diffs)?;
        Ok(ClientDocument {
            id: document.id.clone(),
            client_id: document.client_id.clone(),
            content,
        })
    }

    fn patch_message_from_json(&self, raw: &str) -> Option<PatchMessage<Op>> {
        decode_envelope(raw, |diff| json_patch::from_json(diff).ok())
    }

    fn patch_message_to_json(&self, message: &PatchMessage<Op>) -> String {
        serde_json::to_string(&encode_envelope(message, json_patch::to_json)).unwrap_or_default()
    }

    fn create_patch_message(
        &self,
        document_id: &str,
        client_id: &str,
        edits: Vec<Edit<Op>>,
    ) -> PatchMessage<Op> {
        PatchMessage {
            document_id: document_id.to_string(),
            client_id: client_id.to_string(),
            edits,
        }
    }

    fn add_content(&self, document: &ClientDocument<Value>, field_name: &str, out: &mut String) {
        out.push('"');
        out.push_str(field_name);
        out.push_str("\":");
        out.push_str(&serde_json::to_string(&document.content).unwrap_or_default());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
