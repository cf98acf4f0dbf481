//! Editor session: one live editing surface mediated against the note store.
//!
//! # State machine
//! - `Unbound` → `Bound(id)` on first bind.
//! - `Bound(id)` → `Bound(id)` is a no-op (surface kept, cursor preserved).
//! - `Bound(id)` → `Bound(id')` tears down and rebuilds.
//! - `save` is a self-transition.

pub mod controller;
pub mod surface;
