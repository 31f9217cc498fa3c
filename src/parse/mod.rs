//! The import boundary.
//!
//! Reading a notation back into a graph is left to an outside library behind [`NotationImporter`].
//! This module screens input before it gets there and ships a small table of common structures.

pub mod check;
pub mod template;

pub use check::{
    check_notation, sanitize_notation, NotationError, NotationErrorKind, MAX_NOTATION_LEN,
};
pub use template::TemplateImporter;

use crate::molecule::Molecule;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    #[error(transparent)]
    Notation(#[from] NotationError),
    #[error("no structure known for {0:?}")]
    Unrecognized(String),
    /// The outside importer failed for its own reasons
    #[error("import failed: {0}")]
    Backend(String),
}

/// Something that turns a notation string into a graph
pub trait NotationImporter {
    fn import(&self, notation: &str) -> Result<Molecule, ImportError>;
}
impl<F: Fn(&str) -> Result<Molecule, ImportError>> NotationImporter for F {
    fn import(&self, notation: &str) -> Result<Molecule, ImportError> {
        self(notation)
    }
}
