pub mod formula;
pub mod smiles;

pub use formula::Formula;
pub use smiles::{generate_smiles, SmilesConfig};
