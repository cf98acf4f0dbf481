//! Stores persisting domain collections through a `KeyValueStore`.
//!
//! # Responsibility
//! - Own serialization and whole-collection writes for notes and todos.
//! - Recover from absent or malformed persisted state with defaults.
//!
//! # Invariants
//! - Every mutating call persists before returning.
//! - Each store is the only writer of its key.

use crate::kv::KvError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod document_store;
pub mod id_alloc;
pub mod todo_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure while persisting a collection.
#[derive(Debug)]
pub enum StoreError {
    Kv(KvError),
    Serialize(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kv(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize collection: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}
