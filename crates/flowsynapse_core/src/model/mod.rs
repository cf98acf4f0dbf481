//! Domain model for notes and tasks.
//!
//! # Responsibility
//! - Define the persisted shapes shared by stores, session and collaborators.
//!
//! # Invariants
//! - Every document is identified by a stable `DocumentId`.
//! - Display fields on `Document` are projections of its blocks.

pub mod block;
pub mod document;
pub mod todo;
