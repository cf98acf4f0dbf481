//! Todo list store.
//!
//! # Responsibility
//! - Persist the task list under its own key, independent of notes.
//! - Provide add/toggle/remove plus category projections.
//!
//! # Invariants
//! - Blank task text is never persisted.
//! - Unknown ids are a no-op for toggle/remove.

use crate::clock::{Clock, SystemClock};
use crate::kv::KeyValueStore;
use crate::model::todo::{Todo, TodoFilter};
use crate::repo::id_alloc::IdAllocator;
use crate::repo::StoreResult;
use log::{info, warn};

/// Key under which the task list is persisted.
pub const TODOS_KEY: &str = "flowsynapse-todos";

/// Sole writer of the persisted task list.
pub struct TodoStore<K: KeyValueStore> {
    kv: K,
    ids: IdAllocator,
}

impl<K: KeyValueStore> TodoStore<K> {
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

    /// Reads the persisted list, falling back to the seed list when absent
    /// or malformed.
    pub fn load(&self) -> Vec<Todo> {
        match self.kv.get(TODOS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Todo>>(&raw) {
                Ok(todos) => todos,
                Err(err) => {
                    warn!("event=todos_load module=store status=fallback reason=parse_failed error={err}");
                    seed_todos()
                }
            },
            Ok(None) => seed_todos(),
            Err(err) => {
                warn!("event=todos_load module=store status=fallback reason=read_failed error={err}");
                seed_todos()
            }
        }
    }

    pub fn persist(&mut self, todos: &[Todo]) -> StoreResult<()> {
        let payload = serde_json::to_string(todos)?;
        self.kv.set(TODOS_KEY, &payload)?;
        Ok(())
    }

    /// Appends a task; the category follows the active filter.
    ///
    /// Returns `None` without persisting when `text` is blank.
    pub fn add(
        &mut self,
        todos: &[Todo],
        text: &str,
        filter: &TodoFilter,
    ) -> StoreResult<Option<(Todo, Vec<Todo>)>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let id = self.ids.next(todos.iter().map(|todo| todo.id));

        let created = Todo {
            id,
            text: text.to_string(),
            completed: false,
            category: filter.category_for_new().to_string(),
        };
        let mut updated = todos.to_vec();
        updated.push(created.clone());
        self.persist(&updated)?;
        info!(
            "event=todos_add module=store status=ok id={} count={}",
            id,
            updated.len()
        );
        Ok(Some((created, updated)))
    }

    /// Flips the completion flag of `id`.
    pub fn toggle(&mut self, todos: &[Todo], id: i64) -> StoreResult<Vec<Todo>> {
        let updated: Vec<Todo> = todos
            .iter()
            .map(|todo| {
                let mut todo = todo.clone();
                if todo.id == id {
                    todo.completed = !todo.completed;
                }
                todo
            })
            .collect();
        self.persist(&updated)?;
        Ok(updated)
    }

    pub fn remove(&mut self, todos: &[Todo], id: i64) -> StoreResult<Vec<Todo>> {
        let updated: Vec<Todo> = todos.iter().filter(|todo| todo.id != id).cloned().collect();
        self.persist(&updated)?;
        info!(
            "event=todos_remove module=store status=ok id={} count={}",
            id,
            updated.len()
        );
        Ok(updated)
    }
}

/// Tasks visible under `filter`, in stored order.
pub fn filter_todos<'a>(todos: &'a [Todo], filter: &TodoFilter) -> Vec<&'a Todo> {
    todos.iter().filter(|todo| filter.matches(todo)).collect()
}

/// Number of tasks not yet completed.
pub fn pending_count(todos: &[Todo]) -> usize {
    todos.iter().filter(|todo| !todo.completed).count()
}

/// Badge count for one filter entry.
pub fn category_count(todos: &[Todo], filter: &TodoFilter) -> usize {
    todos.iter().filter(|todo| filter.matches(todo)).count()
}

fn seed_todos() -> Vec<Todo> {
    vec![
        Todo {
            id: 1,
            text: "Review Physics Chapter 4".to_string(),
            completed: false,
            category: "School".to_string(),
        },
        Todo {
            id: 2,
            text: "Buy groceries".to_string(),
            completed: true,
            category: "Personal".to_string(),
        },
    ]
}
