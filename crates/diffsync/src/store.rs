//! Keyed persistence for documents, shadows, backups, and the pending-edit
//! queue.
//!
//! Everything is keyed by the `(document_id, client_id)` pair. The engine
//! only needs this small synchronous contract; persistence beyond process
//! lifetime is a backend concern, and the in-memory implementation below is
//! what every test runs against.

use std::collections::{HashMap, VecDeque};

use crate::document::{BackupShadowDocument, ClientDocument, Edit, ShadowDocument};

pub trait DataStore<T, D> {
    fn save_client_document(&mut self, document: ClientDocument<T>);
    fn get_client_document(&self, document_id: &str, client_id: &str)
        -> Option<ClientDocument<T>>;

    fn save_shadow(&mut self, shadow: ShadowDocument<T>);
    fn get_shadow(&self, document_id: &str, client_id: &str) -> Option<ShadowDocument<T>>;

    fn save_backup(&mut self, backup: BackupShadowDocument<T>);
    fn get_backup(&self, document_id: &str, client_id: &str)
        -> Option<BackupShadowDocument<T>>;

    /// Append an edit to the pending queue for its document/client pair.
    fn save_edit(&mut self, edit: Edit<D>);
    /// The pending queue in production order, or `None` when nothing was
    /// ever queued for the pair.
    fn get_edits(&self, document_id: &str, client_id: &str) -> Option<Vec<Edit<D>>>;
    /// Remove the first queued edit equal to `edit`; silent when absent.
    fn remove_edit(&mut self, edit: &Edit<D>);
    /// Drop the whole pending queue for the pair.
    fn remove_edits(&mut self, document_id: &str, client_id: &str);
}

type Key = (String, String);

fn key(document_id: &str, client_id: &str) -> Key {
    (document_id.to_string(), client_id.to_string())
}

pub struct InMemoryDataStore<T, D> {
    documents: HashMap<Key, ClientDocument<T>>,
    shadows: HashMap<Key, ShadowDocument<T>>,
    backups: HashMap<Key, BackupShadowDocument<T>>,
    edits: HashMap<Key, VecDeque<Edit<D>>>,
}

impl<T, D> InMemoryDataStore<T, D> {
    pub fn new() -> Self {
        InMemoryDataStore {
            documents: HashMap::new(),
            shadows: HashMap::new(),
            backups: HashMap::new(),
            edits: HashMap::new(),
        }
    }
}

impl<T, D> Default for InMemoryDataStore<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D> DataStore<T, D> for InMemoryDataStore<T, D>
where
    T: Clone,
    D: Clone + PartialEq,
{
    fn save_client_document(&mut self, document: ClientDocument<T>) {
        self.documents
            .insert(key(&document.id, &document.client_id), document);
    }

    fn get_client_document(
        &self,
        document_id: &str,
        client_id: &str,
    ) -> Option<ClientDocument<T>> {
        self.documents.get(&key(document_id, client_id)).cloned()
    }

    fn save_shadow(&mut self, shadow: ShadowDocument<T>) {
        let doc = &shadow.client_document;
        self.shadows.insert(key(&doc.id, &doc.client_id), shadow);
    }

    fn get_shadow(&self, document_id: &str, client_id: &str) -> Option<ShadowDocument<T>> {
        self.shadows.get(&key(document_id, client_id)).cloned()
    }

    fn save_backup(&mut self, backup: BackupShadowDocument<T>) {
        let doc = &backup.shadow_document.client_document;
        self.backups.insert(key(&doc.id, &doc.client_id), backup);
    }

    fn get_backup(
        &self,
        document_id: &str,
        client_id: &str,
    ) -> Option<BackupShadowDocument<T>> {
        self.backups.get(&key(document_id, client_id)).cloned()
    }

    fn save_edit(&mut self, edit: Edit<D>) {
        self.edits
            .entry(key(&edit.document_id, &edit.client_id))
            .or_default()
            .push_back(edit);
    }

    fn get_edits(&self, document_id: &str, client_id: &str) -> Option<Vec<Edit<D>>> {
        self.edits
            .get(&key(document_id, client_id))
            .map(|queue| queue.iter().cloned().collect())
    }

    fn remove_edit(&mut self, edit: &Edit<D>) {
        if let Some(queue) = self.edits.get_mut(&key(&edit.document_id, &edit.client_id)) {
            if let Some(position) = queue.iter().position(|queued| queued == edit) {
                queue.remove(position);
            }
        }
    }

    fn remove_edits(&mut self, document_id: &str, client_id: &str) {
        if let Some(queue) = self.edits.get_mut(&key(document_id, client_id)) {
            queue.clear();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
