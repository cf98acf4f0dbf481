//! Editing surface contracts.
//!
//! An editing surface is the live rich-text widget. It is stateful (cursor,
//! selection), so the controller creates one per binding and destroys it
//! only when the binding changes.

use crate::model::block::Block;
use crate::model::document::DocumentId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure reported by a live editing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface could not serialize its content.
    SaveFailed(String),
}

impl Display for SurfaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SaveFailed(message) => write!(f, "editing surface save failed: {message}"),
        }
    }
}

impl Error for SurfaceError {}

/// Live rich-text editor bound to one document.
pub trait EditingSurface {
    /// Loads `blocks` as the initial content.
    fn initialize(&mut self, blocks: &[Block]);
    /// Returns the current block sequence.
    fn save(&mut self) -> Result<Vec<Block>, SurfaceError>;
    /// Releases the widget; the surface is not used afterwards.
    fn destroy(&mut self);
}

/// Produces fresh editing surfaces for the session controller.
pub trait SurfaceFactory {
    type Surface: EditingSurface;

    fn create_surface(&mut self, document_id: DocumentId) -> Self::Surface;
}
