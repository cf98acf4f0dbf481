//! Pure derivations shared by stores and the editor session.

pub mod extract;
