use flowsynapse_core::{
    Block, Document, DocumentId, DocumentStore, EditingSurface, FixedClock, HeaderLevel,
    KeyValueStore, KvError, KvResult, MemoryKvStore, SaveStatus, SessionController,
    SurfaceError, SurfaceFactory, SwitchOutcome, NOTES_KEY,
};
use std::cell::RefCell;
use std::rc::Rc;

type EventLog = Rc<RefCell<Vec<String>>>;

struct FakeSurface {
    id: DocumentId,
    blocks: Vec<Block>,
    fail_save: bool,
    log: EventLog,
}

impl FakeSurface {
    fn set_paragraph(&mut self, text: &str) {
        for block in &mut self.blocks {
            if let Block::Paragraph { text: current } = block {
                *current = text.to_string();
                return;
            }
        }
        self.blocks.push(Block::paragraph(text));
    }
}

impl EditingSurface for FakeSurface {
    fn initialize(&mut self, blocks: &[Block]) {
        self.blocks = blocks.to_vec();
        self.log.borrow_mut().push(format!("init:{}", self.id));
    }

    fn save(&mut self) -> Result<Vec<Block>, SurfaceError> {
        self.log.borrow_mut().push(format!("save:{}", self.id));
        if self.fail_save {
            return Err(SurfaceError::SaveFailed("editor crashed".to_string()));
        }
        Ok(self.blocks.clone())
    }

    fn destroy(&mut self) {
        self.log.borrow_mut().push(format!("destroy:{}", self.id));
    }
}

#[derive(Default)]
struct FakeFactory {
    log: EventLog,
    created: Rc<RefCell<usize>>,
}

impl SurfaceFactory for FakeFactory {
    type Surface = FakeSurface;

    fn create_surface(&mut self, document_id: DocumentId) -> FakeSurface {
        *self.created.borrow_mut() += 1;
        self.log.borrow_mut().push(format!("create:{document_id}"));
        FakeSurface {
            id: document_id,
            blocks: Vec::new(),
            fail_save: false,
            log: Rc::clone(&self.log),
        }
    }
}

/// Key-value store whose writes can be switched off.
struct FlakyKv {
    inner: MemoryKvStore,
    fail_writes: Rc<RefCell<bool>>,
}

impl KeyValueStore for FlakyKv {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        if *self.fail_writes.borrow() {
            return Err(KvError::Backend("disk full".to_string()));
        }
        self.inner.set(key, value)
    }
}

fn doc(id: i64, title: &str, body: &str) -> Document {
    let mut document = Document::with_default_skeleton(DocumentId(id));
    document.title = title.to_string();
    document.blocks = vec![
        Block::header(title, HeaderLevel::H1),
        Block::paragraph(body),
    ];
    document
}

fn seeded_kv(documents: &[Document]) -> MemoryKvStore {
    let mut kv = MemoryKvStore::new();
    kv.set(NOTES_KEY, &serde_json::to_string(documents).unwrap())
        .unwrap();
    kv
}

fn open_with(
    documents: &[Document],
) -> (
    SessionController<MemoryKvStore, FakeFactory>,
    EventLog,
    Rc<RefCell<usize>>,
) {
    let factory = FakeFactory::default();
    let log = Rc::clone(&factory.log);
    let created = Rc::clone(&factory.created);
    let store = DocumentStore::with_clock(seeded_kv(documents), FixedClock(10_000));
    (SessionController::open(store, factory), log, created)
}

fn paragraph_of(document: &Document) -> Option<&str> {
    document.blocks.iter().find_map(|block| match block {
        Block::Paragraph { text } => Some(text.as_str()),
        _ => None,
    })
}

#[test]
fn open_binds_most_recent_document() {
    let (controller, _, created) = open_with(&[doc(2, "B", "b"), doc(1, "A", "a")]);
    let session = controller.session();
    assert_eq!(session.active_document_id, DocumentId(2));
    assert!(session.editing_surface_bound);
    assert_eq!(*created.borrow(), 1);
    assert_eq!(controller.recent_document().unwrap().id, DocumentId(2));
}

#[test]
fn scenario_edit_then_save_updates_preview() {
    let (mut controller, _, _) = open_with(&[doc(1, "Untitled Note", "Start typing here...")]);

    assert_eq!(
        controller.switch_to(DocumentId(1)),
        SwitchOutcome::AlreadyActive
    );
    controller.surface_mut().unwrap().set_paragraph("Hello");
    assert_eq!(controller.save(), SaveStatus::Saved);

    let saved = controller.active_document().unwrap();
    assert!(saved.preview.starts_with("Hello"));
    assert_eq!(saved.title, "Untitled Note");
    assert_eq!(saved.date, "Just now");
    assert_eq!(saved.updated_at, Some(10_000));

    let persisted = controller.store().kv().get(NOTES_KEY).unwrap().unwrap();
    let persisted: Vec<Document> = serde_json::from_str(&persisted).unwrap();
    assert_eq!(persisted, controller.documents());
}

#[test]
fn switching_away_and_back_keeps_unsaved_edits() {
    let (mut controller, log, _) = open_with(&[doc(2, "B", "b"), doc(1, "A", "a")]);

    controller.surface_mut().unwrap().set_paragraph("edited b");
    let outcome = controller.switch_to(DocumentId(1));
    assert_eq!(
        outcome,
        SwitchOutcome::Switched {
            flush: SaveStatus::Saved
        }
    );
    controller.switch_to(DocumentId(2));

    let active = controller.active_document().unwrap().clone();
    assert_eq!(paragraph_of(&active), Some("edited b"));
    assert_eq!(
        controller.surface_mut().unwrap().blocks,
        active.blocks,
        "rebound surface must load the flushed content"
    );

    let events = log.borrow();
    let save = events.iter().position(|e| e == "save:2").unwrap();
    let destroy = events.iter().position(|e| e == "destroy:2").unwrap();
    let create = events.iter().position(|e| e == "create:1").unwrap();
    assert!(save < destroy && destroy < create, "events: {events:?}");
}

#[test]
fn binding_same_document_twice_rebuilds_once() {
    let (mut controller, _, created) = open_with(&[doc(2, "B", "b"), doc(1, "A", "a")]);
    let target = controller.documents()[1].clone();

    assert!(controller.bind_surface(&target));
    assert!(!controller.bind_surface(&target));
    assert_eq!(controller.save(), SaveStatus::Saved);
    let saved = controller.documents()[1].clone();
    assert!(!controller.bind_surface(&saved));

    assert_eq!(*created.borrow(), 2);
    assert_eq!(controller.active_document_id(), DocumentId(1));
}

#[test]
fn binding_elsewhere_and_back_keeps_unsaved_edits() {
    let (mut controller, log, _) = open_with(&[doc(2, "B", "b"), doc(1, "A", "a")]);
    let first = controller.documents()[1].clone();
    let second = controller.documents()[0].clone();

    controller.surface_mut().unwrap().set_paragraph("EDITED");
    assert!(controller.bind_surface(&first));
    assert!(controller.bind_surface(&second));

    let active = controller.active_document().unwrap().clone();
    assert_eq!(paragraph_of(&active), Some("EDITED"));
    assert_eq!(controller.surface_mut().unwrap().blocks, active.blocks);

    let events = log.borrow();
    let save = events.iter().position(|e| e == "save:2").unwrap();
    let destroy = events.iter().position(|e| e == "destroy:2").unwrap();
    assert!(save < destroy, "events: {events:?}");
}

#[test]
fn save_does_not_rebuild_surface() {
    let (mut controller, log, created) = open_with(&[doc(1, "A", "a")]);
    for text in ["one", "two", "three"] {
        controller.surface_mut().unwrap().set_paragraph(text);
        assert_eq!(controller.save(), SaveStatus::Saved);
    }
    assert_eq!(*created.borrow(), 1);
    assert!(!log.borrow().iter().any(|event| event.starts_with("destroy")));
}

#[test]
fn surface_failure_still_switches_and_keeps_snapshot() {
    let (mut controller, _, _) = open_with(&[doc(2, "B", "b"), doc(1, "A", "a")]);
    let before = controller.documents().to_vec();

    let surface = controller.surface_mut().unwrap();
    surface.set_paragraph("lost");
    surface.fail_save = true;

    match controller.switch_to(DocumentId(1)) {
        SwitchOutcome::Switched { flush } => assert!(flush.is_failure()),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(controller.active_document_id(), DocumentId(1));
    assert_eq!(controller.documents(), before.as_slice());
}

#[test]
fn persist_failure_reports_and_keeps_snapshot() {
    let fail_writes = Rc::new(RefCell::new(false));
    let kv = FlakyKv {
        inner: seeded_kv(&[doc(1, "A", "a")]),
        fail_writes: Rc::clone(&fail_writes),
    };
    let mut controller =
        SessionController::open(DocumentStore::new(kv), FakeFactory::default());

    controller.surface_mut().unwrap().set_paragraph("unsaved");
    *fail_writes.borrow_mut() = true;
    assert!(matches!(controller.save(), SaveStatus::PersistFailed(_)));
    assert_eq!(paragraph_of(&controller.documents()[0]), Some("a"));

    *fail_writes.borrow_mut() = false;
    assert_eq!(controller.save(), SaveStatus::Saved);
    assert_eq!(paragraph_of(&controller.documents()[0]), Some("unsaved"));
}

#[test]
fn switch_to_missing_document_is_noop() {
    let (mut controller, log, _) = open_with(&[doc(1, "A", "a")]);
    let events_before = log.borrow().len();
    assert_eq!(
        controller.switch_to(DocumentId(99)),
        SwitchOutcome::StaleTarget(DocumentId(99))
    );
    assert_eq!(log.borrow().len(), events_before);
    assert_eq!(controller.active_document_id(), DocumentId(1));
}

#[test]
fn external_change_without_active_document_activates_head() {
    let (mut controller, _, _) = open_with(&[doc(1, "A", "a")]);
    let replacement = doc(5, "Other", "x");

    assert!(controller.rebuild_on_external_change(vec![replacement.clone()]));
    assert_eq!(controller.active_document_id(), DocumentId(5));
    assert_eq!(controller.bound_document_id(), Some(DocumentId(5)));
    assert_eq!(controller.documents(), [replacement].as_slice());
}

#[test]
fn create_flushes_then_binds_new_document_first() {
    let (mut controller, _, _) = open_with(&[doc(2, "B", "b"), doc(1, "A", "a")]);
    controller.surface_mut().unwrap().set_paragraph("draft");

    let outcome = controller.create().unwrap();
    assert_eq!(outcome.flush, SaveStatus::Saved);
    assert_eq!(controller.documents().len(), 3);
    assert_eq!(controller.documents()[0].id, outcome.document.id);
    assert_eq!(controller.documents()[0].title, "Untitled Note");
    assert_eq!(controller.active_document_id(), outcome.document.id);
    assert_eq!(controller.bound_document_id(), Some(outcome.document.id));
    assert_eq!(paragraph_of(&controller.documents()[1]), Some("draft"));
}

#[test]
fn deleting_active_document_rebinds_to_head() {
    let (mut controller, _, created) = open_with(&[doc(2, "B", "b"), doc(1, "A", "a")]);
    controller.delete(DocumentId(2)).unwrap();

    assert_eq!(controller.documents().len(), 1);
    assert_eq!(controller.active_document_id(), DocumentId(1));
    assert_eq!(controller.bound_document_id(), Some(DocumentId(1)));
    assert_eq!(*created.borrow(), 2);
}

#[test]
fn deleting_other_document_keeps_live_surface() {
    let (mut controller, _, created) = open_with(&[doc(2, "B", "b"), doc(1, "A", "a")]);
    controller.surface_mut().unwrap().set_paragraph("keep me");
    controller.delete(DocumentId(1)).unwrap();

    assert_eq!(*created.borrow(), 1);
    assert_eq!(controller.save(), SaveStatus::Saved);
    assert_eq!(paragraph_of(&controller.documents()[0]), Some("keep me"));
}

#[test]
fn deleting_last_document_binds_fresh_default() {
    let (mut controller, _, _) = open_with(&[doc(1, "A", "a")]);
    controller.delete(DocumentId(1)).unwrap();

    let documents = controller.documents();
    assert_eq!(documents.len(), 1);
    assert_ne!(documents[0].id, DocumentId(1));
    assert_eq!(controller.bound_document_id(), Some(documents[0].id));
}

#[test]
fn external_change_rebuilds_even_for_same_active_id() {
    let (mut controller, _, created) = open_with(&[doc(1, "A", "a")]);
    let replaced = doc(1, "A", "changed elsewhere");

    assert!(controller.rebuild_on_external_change(vec![replaced.clone()]));
    assert_eq!(*created.borrow(), 2);
    assert_eq!(controller.surface_mut().unwrap().blocks, replaced.blocks);
    assert!(!controller.rebuild_on_external_change(Vec::new()));
}

#[test]
fn reload_picks_up_persisted_state() {
    let (mut controller, _, _) = open_with(&[doc(1, "A", "a")]);
    controller.surface_mut().unwrap().set_paragraph("saved text");
    controller.save();
    controller.surface_mut().unwrap().set_paragraph("discarded");

    controller.reload();
    assert_eq!(
        paragraph_of(controller.active_document().unwrap()),
        Some("saved text")
    );
}

#[test]
fn close_flushes_then_destroys_and_is_idempotent() {
    let (mut controller, log, _) = open_with(&[doc(1, "A", "a")]);
    controller.surface_mut().unwrap().set_paragraph("final");

    assert_eq!(controller.close(), SaveStatus::Saved);
    assert!(!controller.session().editing_surface_bound);
    assert_eq!(paragraph_of(&controller.documents()[0]), Some("final"));
    assert_eq!(controller.close(), SaveStatus::NotBound);
    assert_eq!(controller.save(), SaveStatus::NotBound);

    let events = log.borrow();
    assert_eq!(events.iter().filter(|e| e.starts_with("destroy")).count(), 1);
}
