//! Structural warnings. These are recomputed from scratch and never block an edit.

use crate::core::*;
use crate::molecule::Molecule;
use crate::valence::is_allowed_valence;
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

/// Tuning for the checks that need a length scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidateConfig {
    /// Atoms closer than this are reported as overlapping
    pub overlap_distance: f64,
    /// Charges with a larger magnitude than this are reported
    pub max_usual_charge: i8,
}
impl ValidateConfig {
    pub const fn new() -> Self {
        Self {
            overlap_distance: 10.0,
            max_usual_charge: 2,
        }
    }
    pub const fn with_overlap_distance(mut self, distance: f64) -> Self {
        self.overlap_distance = distance;
        self
    }
}
impl Default for ValidateConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// The atom's total bond order isn't one of its element's valences
    ValenceMismatch {
        atom: AtomId,
        bonds: u16,
        allowed: &'static [u8],
    },
    /// The element isn't in the valence table, so its hydrogens aren't managed
    UnknownElement { atom: AtomId },
    /// A heavy atom with no heavy neighbors, in a sketch that has other heavy atoms
    IsolatedAtom { atom: AtomId },
    UnusualCharge { atom: AtomId, charge: i8 },
    /// Two atoms sit on top of each other
    Overlap { a: AtomId, b: AtomId },
    /// A hydrogen with other than one single bond to a heavy atom
    HydrogenNotLeaf { atom: AtomId },
}
impl Warning {
    /// The atom the warning should be drawn on
    pub fn atom(&self) -> AtomId {
        match *self {
            Self::ValenceMismatch { atom, .. }
            | Self::UnknownElement { atom }
            | Self::IsolatedAtom { atom }
            | Self::UnusualCharge { atom, .. }
            | Self::HydrogenNotLeaf { atom } => atom,
            Self::Overlap { a, .. } => a,
        }
    }
}
impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValenceMismatch {
                atom,
                bonds,
                allowed,
            } => write!(
                f,
                "atom {} has a total bond order of {bonds}, expected one of {}",
                atom.index(),
                allowed.iter().join(", ")
            ),
            Self::UnknownElement { atom } => {
                write!(f, "atom {} is an unknown element", atom.index())
            }
            Self::IsolatedAtom { atom } => {
                write!(f, "atom {} isn't bonded to another heavy atom", atom.index())
            }
            Self::UnusualCharge { atom, charge } => {
                write!(f, "atom {} has an unusual charge of {charge:+}", atom.index())
            }
            Self::Overlap { a, b } => {
                write!(f, "atoms {} and {} overlap", a.index(), b.index())
            }
            Self::HydrogenNotLeaf { atom } => write!(
                f,
                "hydrogen {} should have exactly one single bond to a heavy atom",
                atom.index()
            ),
        }
    }
}

/// Run every check against the molecule
pub fn validate(mol: &Molecule, cfg: &ValidateConfig) -> Vec<Warning> {
    let mut out = Vec::new();
    let heavy = mol.heavy_atom_count();
    for (id, atom) in mol.atoms() {
        if atom.charge.unsigned_abs() > cfg.max_usual_charge.unsigned_abs() {
            out.push(Warning::UnusualCharge {
                atom: id,
                charge: atom.charge,
            });
        }
        if atom.is_hydrogen() {
            let incident = mol.incident(id);
            let leaf = incident.len() == 1
                && incident[0].2.order() == 1
                && mol.atom(incident[0].1).is_some_and(|n| !n.is_hydrogen());
            // a lone explicit hydrogen is just an unfinished sketch
            if !leaf && !(incident.is_empty() && !atom.implicit) {
                out.push(Warning::HydrogenNotLeaf { atom: id });
            }
            continue;
        }
        if atom.info().is_none() {
            out.push(Warning::UnknownElement { atom: id });
        }
        if heavy > 1 && mol.neighbors(id, false).is_empty() {
            out.push(Warning::IsolatedAtom { atom: id });
        }
        let allowed = atom.valences();
        if !allowed.is_empty() {
            let bonds = mol.bond_sum(id, true);
            if !is_allowed_valence(allowed, bonds) {
                out.push(Warning::ValenceMismatch {
                    atom: id,
                    bonds,
                    allowed,
                });
            }
        }
    }
    let limit = cfg.overlap_distance * cfg.overlap_distance;
    let atoms = mol.atoms().collect::<Vec<_>>();
    for ((a, x), (b, y)) in atoms.into_iter().tuple_combinations() {
        if (x.pos - y.pos).norm_squared() < limit {
            out.push(Warning::Overlap { a, b });
        }
    }
    out
}
