//! Editor session controller.
//!
//! # Responsibility
//! - Own the note collection snapshot and the single live editing surface.
//! - Enforce flush-before-transition on switch, bind, create and close.
//!
//! # Invariants
//! - At most one surface is live, and it is bound to `active_document_id`.
//! - Binding to the id that is already bound never rebuilds the surface.
//! - Flush completes before the surface is torn down.
//! - `documents` always mirrors the last successfully persisted collection.

use crate::kv::KeyValueStore;
use crate::model::block::Block;
use crate::model::document::{Document, DocumentId, JUST_NOW_LABEL};
use crate::repo::document_store::DocumentStore;
use crate::repo::StoreResult;
use crate::service::extract::extract;
use crate::session::surface::{EditingSurface, SurfaceFactory};
use log::{debug, info, warn};
use std::fmt::{Display, Formatter};

/// Result of flushing the live surface into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// Content was extracted, summarized and persisted.
    Saved,
    /// No surface is bound; nothing to save.
    NotBound,
    /// The bound document is no longer in the collection.
    StaleTarget(DocumentId),
    /// The surface failed to produce content; snapshot unchanged.
    SurfaceFailed(String),
    /// Persisting failed; snapshot unchanged.
    PersistFailed(String),
}

impl SaveStatus {
    /// True when the flush tried to save and did not persist.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::SurfaceFailed(_) | Self::PersistFailed(_))
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::NotBound => "not_bound",
            Self::StaleTarget(_) => "stale_target",
            Self::SurfaceFailed(_) => "surface_failed",
            Self::PersistFailed(_) => "persist_failed",
        }
    }
}

impl Display for SaveStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SurfaceFailed(message) | Self::PersistFailed(message) => {
                write!(f, "{}: {message}", self.label())
            }
            Self::StaleTarget(id) => write!(f, "{} ({id})", self.label()),
            _ => f.write_str(self.label()),
        }
    }
}

/// Result of `switch_to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    AlreadyActive,
    StaleTarget(DocumentId),
    Switched { flush: SaveStatus },
}

/// Result of `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub document: Document,
    pub flush: SaveStatus,
}

/// Snapshot of the session binding exposed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub active_document_id: DocumentId,
    pub editing_surface_bound: bool,
}

enum Binding<S> {
    Unbound,
    Bound { id: DocumentId, surface: S },
}

/// Mediates one live editing surface against the persisted collection.
pub struct SessionController<K: KeyValueStore, F: SurfaceFactory> {
    store: DocumentStore<K>,
    factory: F,
    documents: Vec<Document>,
    active_id: DocumentId,
    binding: Binding<F::Surface>,
}

impl<K: KeyValueStore, F: SurfaceFactory> SessionController<K, F> {
    /// Loads the collection and binds a surface to the most recent document.
    pub fn open(mut store: DocumentStore<K>, factory: F) -> Self {
        let documents = store.load();
        let active_id = documents.first().map_or(DocumentId(0), |document| document.id);
        let mut controller = Self {
            store,
            factory,
            documents,
            active_id,
            binding: Binding::Unbound,
        };
        controller.rebind_active();
        info!(
            "event=session_open module=session status=ok active_id={} count={}",
            controller.active_id,
            controller.documents.len()
        );
        controller
    }

    /// Current collection snapshot, newest first.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn active_document_id(&self) -> DocumentId {
        self.active_id
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.find(self.active_id)
    }

    /// Most recently created document, shown by the dashboard card.
    pub fn recent_document(&self) -> Option<&Document> {
        self.documents.first()
    }

    pub fn session(&self) -> Session {
        Session {
            active_document_id: self.active_id,
            editing_surface_bound: self.bound_document_id().is_some(),
        }
    }

    pub fn bound_document_id(&self) -> Option<DocumentId> {
        match &self.binding {
            Binding::Unbound => None,
            Binding::Bound { id, .. } => Some(*id),
        }
    }

    /// Live surface, for forwarding user input.
    pub fn surface_mut(&mut self) -> Option<&mut F::Surface> {
        match &mut self.binding {
            Binding::Unbound => None,
            Binding::Bound { surface, .. } => Some(surface),
        }
    }

    pub fn store(&self) -> &DocumentStore<K> {
        &self.store
    }

    /// Flushes the live surface into the store.
    ///
    /// Unbound or stale bindings are a no-op. Surface and persist failures
    /// are logged and leave the snapshot unchanged.
    pub fn save(&mut self) -> SaveStatus {
        let status = self.flush();
        match &status {
            SaveStatus::Saved => debug!(
                "event=session_save module=session status=ok id={}",
                self.active_id
            ),
            SaveStatus::NotBound | SaveStatus::StaleTarget(_) => debug!(
                "event=session_save module=session status=skipped reason={}",
                status.label()
            ),
            SaveStatus::SurfaceFailed(_) | SaveStatus::PersistFailed(_) => warn!(
                "event=session_save module=session status=error id={} reason={}",
                self.active_id,
                status.label()
            ),
        }
        status
    }

    /// Flushes, then rebinds the surface to `target`.
    ///
    /// A flush failure does not block the switch; it is reported in the
    /// outcome.
    pub fn switch_to(&mut self, target: DocumentId) -> SwitchOutcome {
        if target == self.active_id {
            return SwitchOutcome::AlreadyActive;
        }
        if self.find(target).is_none() {
            debug!("event=session_switch module=session status=skipped reason=stale_target id={target}");
            return SwitchOutcome::StaleTarget(target);
        }

        let flush = self.save();
        let from = self.active_id;
        self.active_id = target;
        self.rebind_active();
        info!(
            "event=session_switch module=session status=ok from={} to={} flush={}",
            from,
            target,
            flush.label()
        );
        SwitchOutcome::Switched { flush }
    }

    /// Binds a surface to `document`.
    ///
    /// Returns `false` without touching the surface when it is already bound
    /// to `document.id`. Otherwise flushes the live surface, tears it down and
    /// builds a new one, preferring the snapshot's copy of `document` so a
    /// caller holding an older clone never reloads pre-flush content.
    pub fn bind_surface(&mut self, document: &Document) -> bool {
        if self.bound_document_id() == Some(document.id) {
            return false;
        }
        let flush = self.save();
        let blocks = self
            .find(document.id)
            .map_or_else(|| document.blocks.clone(), |current| current.blocks.clone());
        self.active_id = document.id;
        self.rebuild(document.id, &blocks);
        debug!(
            "event=session_bind module=session status=ok id={} flush={}",
            document.id,
            flush.label()
        );
        true
    }

    /// Installs a collection changed out of band and rebinds unconditionally.
    ///
    /// Keeps the active id when it survived, else activates the first
    /// document. An empty collection is rejected and `false` returned.
    pub fn rebuild_on_external_change(&mut self, documents: Vec<Document>) -> bool {
        let Some(head) = documents.first().map(|document| document.id) else {
            warn!("event=session_external_change module=session status=rejected reason=empty_collection");
            return false;
        };
        if !documents.iter().any(|document| document.id == self.active_id) {
            self.active_id = head;
        }
        self.documents = documents;
        self.teardown();
        self.rebind_active();
        info!(
            "event=session_external_change module=session status=ok active_id={} count={}",
            self.active_id,
            self.documents.len()
        );
        true
    }

    /// Re-reads the store and applies it as an external change.
    pub fn reload(&mut self) {
        let documents = self.store.load();
        self.rebuild_on_external_change(documents);
    }

    /// Flushes, creates a default document and binds to it.
    pub fn create(&mut self) -> StoreResult<CreateOutcome> {
        let flush = self.save();
        let (document, updated) = self.store.create(&self.documents)?;
        self.documents = updated;
        self.active_id = document.id;
        self.rebind_active();
        Ok(CreateOutcome { document, flush })
    }

    /// Deletes `id`; rebinds to the new head when the active document went
    /// away. Edits on a deleted active document are discarded with it.
    pub fn delete(&mut self, id: DocumentId) -> StoreResult<()> {
        let updated = self.store.delete(&self.documents, id)?;
        self.documents = updated;

        if self.find(self.active_id).is_none() {
            self.active_id = self
                .documents
                .first()
                .map_or(self.active_id, |document| document.id);
            self.teardown();
            self.rebind_active();
        }
        Ok(())
    }

    /// Flushes and destroys the live surface. No-op when unbound.
    pub fn close(&mut self) -> SaveStatus {
        if self.bound_document_id().is_none() {
            return SaveStatus::NotBound;
        }
        let flush = self.save();
        self.teardown();
        info!(
            "event=session_close module=session status=ok flush={}",
            flush.label()
        );
        flush
    }

    fn flush(&mut self) -> SaveStatus {
        let bound_id = match &self.binding {
            Binding::Unbound => return SaveStatus::NotBound,
            Binding::Bound { id, .. } => *id,
        };
        let Some(index) = self.documents.iter().position(|d| d.id == bound_id) else {
            return SaveStatus::StaleTarget(bound_id);
        };

        let blocks = match &mut self.binding {
            Binding::Bound { surface, .. } => match surface.save() {
                Ok(blocks) => blocks,
                Err(err) => return SaveStatus::SurfaceFailed(err.to_string()),
            },
            Binding::Unbound => return SaveStatus::NotBound,
        };

        let mut updated = self.documents.clone();
        apply_blocks(&mut updated[index], blocks, self.store.now_ms());
        match self.store.persist(&updated) {
            Ok(()) => {
                self.documents = updated;
                SaveStatus::Saved
            }
            Err(err) => SaveStatus::PersistFailed(err.to_string()),
        }
    }

    fn rebind_active(&mut self) {
        let Some(blocks) = self.find(self.active_id).map(|d| d.blocks.clone()) else {
            self.teardown();
            return;
        };
        if self.bound_document_id() != Some(self.active_id) {
            self.rebuild(self.active_id, &blocks);
        }
    }

    fn rebuild(&mut self, id: DocumentId, blocks: &[Block]) {
        self.teardown();
        let mut surface = self.factory.create_surface(id);
        surface.initialize(blocks);
        self.binding = Binding::Bound { id, surface };
        debug!("event=surface_bind module=session status=ok id={id}");
    }

    fn teardown(&mut self) {
        if let Binding::Bound { id, mut surface } =
            std::mem::replace(&mut self.binding, Binding::Unbound)
        {
            surface.destroy();
            debug!("event=surface_destroy module=session status=ok id={id}");
        }
    }

    fn find(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|document| document.id == id)
    }
}

fn apply_blocks(document: &mut Document, blocks: Vec<Block>, now_ms: i64) {
    let summary = extract(&blocks, Some(document.title.as_str()));
    document.title = summary.title;
    document.preview = summary.preview;
    document.blocks = blocks;
    document.date = JUST_NOW_LABEL.to_string();
    document.updated_at = Some(now_ms);
}
