//! Note document store.
//!
//! # Responsibility
//! - Load, persist, create and delete note documents as one JSON collection.
//! - Allocate document ids.
//!
//! # Invariants
//! - The collection returned by any operation is never empty.
//! - New documents are prepended (newest first).
//! - Ids come from `IdAllocator`, so two creations within one clock tick
//!   never collide.
//! - Persisting replaces the whole collection in one key-value write.

use crate::clock::{Clock, SystemClock};
use crate::kv::KeyValueStore;
use crate::model::document::{Document, DocumentId};
use crate::repo::id_alloc::IdAllocator;
use crate::repo::StoreResult;
use log::{info, warn};

/// Key under which the note collection is persisted.
pub const NOTES_KEY: &str = "flowsynapse-notes";

/// Sole writer of the persisted note collection.
pub struct DocumentStore<K: KeyValueStore> {
    kv: K,
    ids: IdAllocator,
}

impl<K: KeyValueStore> DocumentStore<K> {
    /// Creates a store using wall-clock time for ids.
    pub fn new(kv: K) -> Self {
        Self::with_clock(kv, SystemClock)
    }

    pub fn with_clock(kv: K, clock: impl Clock + 'static) -> Self {
        Self {
            kv,
            ids: IdAllocator::new(clock),
        }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Current time from the store's clock, in epoch milliseconds.
    pub fn now_ms(&self) -> i64 {
        self.ids.now_ms()
    }

    /// Reads the persisted collection.
    ///
    /// Absent, unreadable, malformed or empty state yields one default
    /// document. Never fails; the recovery is logged and not persisted until
    /// the next mutating call.
    pub fn load(&mut self) -> Vec<Document> {
        let raw = match self.kv.get(NOTES_KEY) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("event=notes_load module=store status=fallback reason=read_failed error={err}");
                None
            }
        };

        let parsed = raw.and_then(|raw| match serde_json::from_str::<Vec<Document>>(&raw) {
            Ok(documents) => Some(documents),
            Err(err) => {
                warn!("event=notes_load module=store status=fallback reason=parse_failed error={err}");
                None
            }
        });

        match parsed {
            Some(documents) if !documents.is_empty() => {
                info!(
                    "event=notes_load module=store status=ok count={}",
                    documents.len()
                );
                documents
            }
            _ => {
                let fallback = Document::with_default_skeleton(self.allocate_id(&[]));
                info!(
                    "event=notes_load module=store status=default id={}",
                    fallback.id
                );
                vec![fallback]
            }
        }
    }

    /// Overwrites the persisted collection with `documents`.
    pub fn persist(&mut self, documents: &[Document]) -> StoreResult<()> {
        let payload = serde_json::to_string(documents)?;
        if let Err(err) = self.kv.set(NOTES_KEY, &payload) {
            warn!("event=notes_persist module=store status=error error={err}");
            return Err(err.into());
        }
        Ok(())
    }

    /// Prepends a default-skeleton document and persists the result.
    pub fn create(&mut self, documents: &[Document]) -> StoreResult<(Document, Vec<Document>)> {
        let created = Document::with_default_skeleton(self.allocate_id(documents));
        let mut updated = Vec::with_capacity(documents.len() + 1);
        updated.push(created.clone());
        updated.extend_from_slice(documents);

        self.persist(&updated)?;
        info!(
            "event=notes_create module=store status=ok id={} count={}",
            created.id,
            updated.len()
        );
        Ok((created, updated))
    }

    /// Removes `id` and persists; synthesizes a fresh default document when
    /// the collection would become empty.
    pub fn delete(&mut self, documents: &[Document], id: DocumentId) -> StoreResult<Vec<Document>> {
        let mut updated: Vec<Document> = documents
            .iter()
            .filter(|document| document.id != id)
            .cloned()
            .collect();
        let removed = updated.len() != documents.len();

        if updated.is_empty() {
            // The deleted id is still in `documents`, so the allocator skips it.
            updated.push(Document::with_default_skeleton(self.allocate_id(documents)));
        }

        self.persist(&updated)?;
        info!(
            "event=notes_delete module=store status=ok id={} removed={} count={}",
            id,
            removed,
            updated.len()
        );
        Ok(updated)
    }

    fn allocate_id(&mut self, existing: &[Document]) -> DocumentId {
        DocumentId(self.ids.next(existing.iter().map(|document| document.id.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentStore, NOTES_KEY};
    use crate::clock::FixedClock;
    use crate::kv::{KeyValueStore, MemoryKvStore};
    use crate::model::document::DocumentId;

    #[test]
    fn ids_stay_unique_within_one_clock_tick() {
        let mut store = DocumentStore::with_clock(MemoryKvStore::new(), FixedClock(1_000));
        let documents = store.load();
        let (first, documents) = store.create(&documents).unwrap();
        let (second, documents) = store.create(&documents).unwrap();

        assert_eq!(documents.len(), 3);
        assert_ne!(first.id, second.id);
        assert!(second.id > first.id);
    }

    #[test]
    fn allocator_skips_ids_already_in_collection() {
        let mut kv = MemoryKvStore::new();
        kv.set(
            NOTES_KEY,
            r#"[{"id":5000,"title":"t","date":"d","preview":"p","blocks":[]}]"#,
        )
        .unwrap();
        let mut store = DocumentStore::with_clock(kv, FixedClock(10));
        let documents = store.load();
        let (created, _) = store.create(&documents).unwrap();
        assert_eq!(created.id, DocumentId(5001));
    }

    #[test]
    fn empty_persisted_array_loads_default_document() {
        let mut kv = MemoryKvStore::new();
        kv.set(NOTES_KEY, "[]").unwrap();
        let mut store = DocumentStore::with_clock(kv, FixedClock(7));
        let documents = store.load();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, DocumentId(7));
    }
}
