//! Core domain logic for FlowSynapse.
//! Owns note documents, the editor session, tasks and the focus timer;
//! view layers only render snapshots and forward intents.

pub mod clock;
pub mod config;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
pub mod timer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use kv::{KeyValueStore, KvError, KvResult, MemoryKvStore, SqliteKvStore};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::block::{Block, BlockValidationError, HeaderLevel, ListStyle};
pub use model::document::{Document, DocumentId};
pub use model::todo::{Todo, TodoFilter};
pub use repo::document_store::{DocumentStore, NOTES_KEY};
pub use repo::todo_store::{TodoStore, TODOS_KEY};
pub use repo::{StoreError, StoreResult};
pub use service::extract::{extract, Summary};
pub use session::controller::{
    CreateOutcome, SaveStatus, Session, SessionController, SwitchOutcome,
};
pub use session::surface::{EditingSurface, SurfaceError, SurfaceFactory};
pub use timer::focus::{
    format_clock, BannerHandle, FocusTimer, FocusTimerConfig, TickHandle, TickOutcome,
    TimerPhase, TimerState,
};
pub use timer::notify::{NoopNotifier, Notifier, NotifyError};

/// Minimal health-check API for shell integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
