#[rustfmt::skip]
pub mod atom_info;
pub mod core;
pub mod disp;
pub mod edit;
pub mod hydro;
pub mod molecule;
pub mod naming;
pub mod parse;
pub mod utils;
pub mod validate;
pub mod valence;

pub mod prelude {
    pub use crate::core::*;
    pub use crate::disp::{generate_smiles, Formula, SmilesConfig};
    pub use crate::edit::{Edit, EditConfig, EditError, Editor, PointerEvent, Tool};
    pub use crate::hydro::{HydroConfig, HydrogenEngine};
    pub use crate::molecule::{BondChange, Molecule};
    pub use crate::parse::{ImportError, NotationImporter, TemplateImporter};
    pub use crate::utils::Symbol;
    pub use crate::validate::{validate, ValidateConfig, Warning};
    pub use crate::valence::{admit, Admission};
}

#[cfg(test)]
mod tests;
