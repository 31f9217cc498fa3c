//! Valence arithmetic and the admission check run before a bond is made or escalated

use crate::core::*;
use crate::molecule::Molecule;
use std::fmt::{self, Display, Formatter};
use tracing::*;

/// The valence an atom should be completed to: the smallest allowed value that's at least
/// `current`, or the largest allowed value if the atom is already over every option.
///
/// Returns `None` when nothing is allowed (unknown elements).
pub fn target_valence(valences: &[u8], current: u16) -> Option<u8> {
    valences
        .iter()
        .copied()
        .filter(|&v| u16::from(v) >= current)
        .min()
        .or_else(|| valences.iter().copied().max())
}

/// How many hydrogens it takes to bring `current` up to the target valence
pub fn hydrogens_needed(valences: &[u8], current: u16) -> u16 {
    target_valence(valences, current).map_or(0, |t| u16::from(t).saturating_sub(current))
}

/// True iff some allowed valence can hold `current + additional`
pub fn can_accept_more_bonds(valences: &[u8], current: u16, additional: u8) -> bool {
    let wanted = current.saturating_add(additional.into());
    valences.iter().any(|&v| u16::from(v) >= wanted)
}

/// True iff `bonds` is exactly one of the allowed valences
pub fn is_allowed_valence(valences: &[u8], bonds: u16) -> bool {
    valences.iter().any(|&v| u16::from(v) == bonds)
}

/// Verdict from the admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// `atom` already carries `bonds` and can't take `additional` more under any valence
    Rejected { atom: AtomId, bonds: u16, additional: u8 },
}
impl Admission {
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}
impl Display for Admission {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("bond accepted"),
            Self::Rejected {
                atom,
                bonds,
                additional,
            } => write!(
                f,
                "atom {} has {bonds} bond order and can't take {additional} more",
                atom.index()
            ),
        }
    }
}

/// Ask whether both `a` and `b` can take `additional` more bond order.
///
/// Implicit hydrogens don't count toward an atom's current bonds since reconciliation drops them
/// anyway. Atoms without any valence data aren't constrained.
pub fn admit(mol: &Molecule, a: AtomId, b: AtomId, additional: u8) -> Admission {
    for id in [a, b] {
        let Some(atom) = mol.atom(id) else {
            continue;
        };
        let valences = atom.valences();
        if valences.is_empty() {
            continue;
        }
        let bonds = mol.bond_sum(id, false);
        if !can_accept_more_bonds(valences, bonds, additional) {
            debug!(atom = id.index(), bonds, additional, "bond rejected by valence");
            return Admission::Rejected {
                atom: id,
                bonds,
                additional,
            };
        }
    }
    Admission::Accepted
}
