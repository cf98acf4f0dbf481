//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `flowsynapse_core` linkage.
//! - Print a snapshot of the persisted notes and todos
//!   (`flowsynapse_cli [CONFIG_JSON]`). The store is opened from the config's
//!   `databasePath`; with no config, or no path in it, storage is in-memory.

use flowsynapse_core::model::document::relative_age_label;
use flowsynapse_core::repo::todo_store::pending_count;
use flowsynapse_core::{
    init_logging_from_config, Clock, CoreConfig, DocumentStore, KeyValueStore, SqliteKvStore,
    SystemClock, TodoStore,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("flowsynapse_core ping={}", flowsynapse_core::ping());
    println!("flowsynapse_core version={}", flowsynapse_core::core_version());

    let config = match load_config(std::env::args().nth(1).as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let mut kv = match SqliteKvStore::open_configured(&config) {
        Ok(kv) => kv,
        Err(err) => {
            eprintln!("failed to open store: {err}");
            return ExitCode::FAILURE;
        }
    };

    print_snapshot(&mut kv);
    ExitCode::SUCCESS
}

fn load_config(path: Option<&str>) -> Result<CoreConfig, String> {
    let Some(path) = path else {
        return Ok(CoreConfig::default());
    };
    let raw = std::fs::read_to_string(path).map_err(|err| format!("{path}: {err}"))?;
    CoreConfig::from_json_str(&raw).map_err(|err| format!("{path}: {err}"))
}

fn print_snapshot(kv: &mut impl KeyValueStore) {
    let now_ms = SystemClock.now_ms();
    let documents = DocumentStore::new(&mut *kv).load();
    for document in documents {
        let age = document
            .updated_at
            .map(|updated_at| relative_age_label(updated_at, now_ms))
            .unwrap_or(document.date);
        println!(
            "note id={} title={:?} preview={:?} age={}",
            document.id, document.title, document.preview, age
        );
    }

    let todos = TodoStore::new(&mut *kv).load();
    println!("todos total={} pending={}", todos.len(), pending_count(&todos));
}
