//! Plain-text synchronizer.
//!
//! Structurally identical to the JSON flavor; the primitive is the
//! character-level string diff instead of JSON Patch. Wire diffs have the
//! shape `{"operation":"ADD"|"DELETE"|"UNCHANGED","text":...}` and the
//! document content is a JSON string.

use serde_json::{json, Value};
use thiserror::Error;

use crate::document::{ClientDocument, Edit, PatchMessage, ShadowDocument};
use crate::util_diff::{self, ChangeKind};

use super::{decode_envelope, encode_envelope, Synchronizer};

// ── Types ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOperation {
    Add,
    Delete,
    Unchanged,
}

impl TextOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextOperation::Add => "ADD",
            TextOperation::Delete => "DELETE",
            TextOperation::Unchanged => "UNCHANGED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ADD" => Some(TextOperation::Add),
            "DELETE" => Some(TextOperation::Delete),
            "UNCHANGED" => Some(TextOperation::Unchanged),
            _ => None,
        }
    }
}

/// One run of a text edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDiff {
    pub operation: TextOperation,
    pub text: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextPatchError {
    #[error("text edit does not align with the document content")]
    SourceMismatch,
}

// ── Diff / apply primitives ───────────────────────────────────────────────

fn text_diffs(src: &str, dst: &str) -> Vec<TextDiff> {
    util_diff::diff(src, dst)
        .into_iter()
        .map(|(kind, text)| TextDiff {
            operation: match kind {
                ChangeKind::Insert => TextOperation::Add,
                ChangeKind::Delete => TextOperation::Delete,
                ChangeKind::Equal => TextOperation::Unchanged,
            },
            text,
        })
        .collect()
}

/// Replay a diff against `content`, verifying that every unchanged and
/// deleted run matches the text it claims to cover.
fn apply_text_diffs(diffs: &[TextDiff], content: &str) -> Result<String, TextPatchError> {
    let mut remaining = content;
    let mut out = String::with_capacity(content.len());
    for diff in diffs {
        match diff.operation {
            TextOperation::Unchanged => {
                remaining = remaining
                    .strip_prefix(diff.text.as_str())
                    .ok_or(TextPatchError::SourceMismatch)?;
                out.push_str(&diff.text);
            }
            TextOperation::Delete => {
                remaining = remaining
                    .strip_prefix(diff.text.as_str())
                    .ok_or(TextPatchError::SourceMismatch)?;
            }
            TextOperation::Add => out.push_str(&diff.text),
        }
    }
    if !remaining.is_empty() {
        return Err(TextPatchError::SourceMismatch);
    }
    Ok(out)
}

// ── Synchronizer impl ─────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct TextSynchronizer;

impl TextSynchronizer {
    pub fn new() -> Self {
        TextSynchronizer
    }
}

impl Synchronizer for TextSynchronizer {
    type Content = String;
    type Diff = TextDiff;
    type Error = TextPatchError;

    fn client_diff(
        &self,
        document: &ClientDocument<String>,
        shadow: &ShadowDocument<String>,
    ) -> Edit<TextDiff> {
        let diffs = text_diffs(&document.content, &shadow.client_document.content);
        Edit::stamped(document, shadow, diffs)
    }

    fn server_diff(
        &self,
        document: &ClientDocument<String>,
        shadow: &ShadowDocument<String>,
    ) -> Edit<TextDiff> {
        let diffs = text_diffs(&shadow.client_document.content, &document.content);
        Edit::stamped(document, shadow, diffs)
    }

    fn patch_shadow(
        &self,
        edit: &Edit<TextDiff>,
        shadow: &ShadowDocument<String>,
    ) -> Result<ShadowDocument<String>, TextPatchError> {
        let content = apply_text_diffs(&edit.diffs, &shadow.client_document.content)?;
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
        edit: &Edit<TextDiff>,
        document: &ClientDocument<String>,
    ) -> Result<ClientDocument<String>, TextPatchError> {
        let content = apply_text_diffs(&edit.diffs, &document.content)?;
        Ok(ClientDocument {
            id: document.id.clone(),
            client_id: document.client_id.clone(),
            content,
        })
    }

    fn patch_message_from_json(&self, raw: &str) -> Option<PatchMessage<TextDiff>> {
        decode_envelope(raw, |diff| {
            let obj = diff.as_object()?;
            let operation = TextOperation::from_str(obj.get("operation")?.as_str()?)?;
            let text = obj.get("text")?.as_str()?.to_string();
            Some(TextDiff { operation, text })
        })
    }

    fn patch_message_to_json(&self, message: &PatchMessage<TextDiff>) -> String {
        let encoded = encode_envelope(message, |diff| {
            json!({
                "operation": diff.operation.as_str(),
                "text": diff.text,
            })
        });
        serde_json::to_string(&encoded).unwrap_or_default()
    }

    fn create_patch_message(
        &self,
        document_id: &str,
        client_id: &str,
        edits: Vec<Edit<TextDiff>>,
    ) -> PatchMessage<TextDiff> {
        PatchMessage {
            document_id: document_id.to_string(),
            client_id: client_id.to_string(),
            edits,
        }
    }

    fn add_content(&self, document: &ClientDocument<String>, field_name: &str, out: &mut String) {
        out.push('"');
        out.push_str(field_name);
        out.push_str("\":");
        // Standard JSON string escaping covers embedded quotes.
        out.push_str(&Value::String(document.content.clone()).to_string());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
