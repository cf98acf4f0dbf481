//! Focus timer and its notification seam.

pub mod focus;
pub mod notify;
