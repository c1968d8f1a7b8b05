//! Synchronizer strategies.
//!
//! A synchronizer turns document pairs into edits and applies edits back to
//! documents and shadows; it also owns the wire codec for its patch
//! messages. The engine is generic over this trait, so an engine instance
//! is statically tied to one content type and one diff type.

pub mod json;
pub mod text;

pub use json::JsonSynchronizer;
pub use text::{TextDiff, TextOperation, TextPatchError, TextSynchronizer};

use serde_json::{json, Value};

use crate::document::{ClientDocument, Edit, PatchMessage, ShadowDocument};

pub trait Synchronizer {
    /// Document content type.
    type Content;
    /// Element type of an edit's diff list.
    type Diff;
    /// Error produced when a diff cannot be applied.
    type Error;

    /// Diff in the document → shadow direction, stamped with the shadow's
    /// versions. The engine uses this to reconcile the working document
    /// after an inbound patch advanced the shadow.
    fn client_diff(
        &self,
        document: &ClientDocument<Self::Content>,
        shadow: &ShadowDocument<Self::Content>,
    ) -> Edit<Self::Diff>;

    /// Diff in the shadow → document direction, stamped with the shadow's
    /// versions. The engine uses this to build outbound edits: what the
    /// peer must apply to its shadow to reach our document.
    fn server_diff(
        &self,
        document: &ClientDocument<Self::Content>,
        shadow: &ShadowDocument<Self::Content>,
    ) -> Edit<Self::Diff>;

    /// Apply an edit to a shadow. The result takes the edit's client
    /// version, keeps the shadow's server version, and carries the patched
    /// content.
    fn patch_shadow(
        &self,
        edit: &Edit<Self::Diff>,
        shadow: &ShadowDocument<Self::Content>,
    ) -> Result<ShadowDocument<Self::Content>, Self::Error>;

    /// Apply an edit to a working document, preserving its identity.
    fn patch_document(
        &self,
        edit: &Edit<Self::Diff>,
        document: &ClientDocument<Self::Content>,
    ) -> Result<ClientDocument<Self::Content>, Self::Error>;

    /// Parse a patch-message string. Malformed input yields `None`.
    fn patch_message_from_json(&self, raw: &str) -> Option<PatchMessage<Self::Diff>>;

    /// Serialize a patch message for the transport.
    fn patch_message_to_json(&self, message: &PatchMessage<Self::Diff>) -> String;

    /// Construct a patch message value.
    fn create_patch_message(
        &self,
        document_id: &str,
        client_id: &str,
        edits: Vec<Edit<Self::Diff>>,
    ) -> PatchMessage<Self::Diff>;

    /// Append the document's content, serialized as JSON under
    /// `field_name`, to a growing message buffer.
    fn add_content(
        &self,
        document: &ClientDocument<Self::Content>,
        field_name: &str,
        out: &mut String,
    );
}

// ── Shared patch-message envelope codec ───────────────────────────────────
//
// Both flavors use the same envelope; only the diff entries differ:
//
//   {"msgType":"patch","id":...,"clientId":...,"edits":[
//     {"clientVersion":...,"serverVersion":...,"checksum":...,"diffs":[...]}]}

pub(crate) fn encode_envelope<D>(
    message: &PatchMessage<D>,
    encode_diff: impl Fn(&D) -> Value,
) -> Value {
    let edits: Vec<Value> = message
        .edits
        .iter()
        .map(|edit| {
            json!({
                "clientVersion": edit.client_version,
                "serverVersion": edit.server_version,
                "checksum": edit.checksum,
                "diffs": edit.diffs.iter().map(&encode_diff).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({
        "msgType": "patch",
        "id": message.document_id,
        "clientId": message.client_id,
        "edits": edits,
    })
}

pub(crate) fn decode_envelope<D>(
    raw: &str,
    decode_diff: impl Fn(&Value) -> Option<D>,
) -> Option<PatchMessage<D>> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let obj = value.as_object()?;
    if obj.get("msgType")?.as_str()? != "patch" {
        return None;
    }
    let document_id = obj.get("id")?.as_str()?.to_string();
    let client_id = obj.get("clientId")?.as_str()?.to_string();

    let mut edits = Vec::new();
    for entry in obj.get("edits")?.as_array()? {
        let edit = entry.as_object()?;
        let client_version = edit.get("clientVersion")?.as_i64()?;
        let server_version = edit.get("serverVersion")?.as_i64()?;
        // Checksums round-trip as-is and are never validated.
        let checksum = edit
            .get("checksum")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let mut diffs = Vec::new();
        for diff in edit.get("diffs")?.as_array()? {
            diffs.push(decode_diff(diff)?);
        }
        edits.push(Edit {
            client_id: client_id.clone(),
            document_id: document_id.clone(),
            client_version,
            server_version,
            checksum,
            diffs,
        });
    }
    Some(PatchMessage {
        document_id,
        client_id,
        edits,
    })
}
