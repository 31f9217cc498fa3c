//! A fixed lookup of common small molecules, with 2-D layouts.
//!
//! Layouts are in bond lengths, with chains drawn as a zigzag and rings as a regular hexagon.
//! Only heavy atoms are listed; the editor fills in hydrogens after import.

use super::{check_notation, ImportError, NotationImporter};
use crate::core::*;
use crate::molecule::Molecule;
use crate::utils::Symbol;
use tracing::*;

const C: Symbol = CARBON;
const N: Symbol = Symbol::from_static("N");
const O: Symbol = Symbol::from_static("O");

/// sin(60°), the horizontal step of a zigzag
const S: f64 = 0.8660254037844386;

const HEXAGON: [(f64, f64); 6] = [
    (0.0, -1.0),
    (S, -0.5),
    (S, 0.5),
    (0.0, 1.0),
    (-S, 0.5),
    (-S, -0.5),
];

struct TemplateAtom {
    elem: Symbol,
    at: (f64, f64),
    charge: i8,
    hydrogens: Option<u8>,
}
const fn atom(elem: Symbol, x: f64, y: f64) -> TemplateAtom {
    TemplateAtom {
        elem,
        at: (x, y),
        charge: 0,
        hydrogens: None,
    }
}
const fn ring_atom(i: usize) -> TemplateAtom {
    atom(C, HEXAGON[i].0, HEXAGON[i].1)
}

struct Template {
    name: &'static str,
    notations: &'static [&'static str],
    atoms: &'static [TemplateAtom],
    bonds: &'static [(usize, usize, BondKind)],
}

const RING: [TemplateAtom; 6] = [
    ring_atom(0),
    ring_atom(1),
    ring_atom(2),
    ring_atom(3),
    ring_atom(4),
    ring_atom(5),
];

static TEMPLATES: &[Template] = &[
    Template {
        name: "methane",
        notations: &["C"],
        atoms: &[atom(C, 0.0, 0.0)],
        bonds: &[],
    },
    Template {
        name: "ethane",
        notations: &["CC"],
        atoms: &[atom(C, 0.0, 0.0), atom(C, S, -0.5)],
        bonds: &[(0, 1, BondKind::Single)],
    },
    Template {
        name: "ethene",
        notations: &["C=C"],
        atoms: &[atom(C, 0.0, 0.0), atom(C, S, -0.5)],
        bonds: &[(0, 1, BondKind::Double)],
    },
    Template {
        name: "ethyne",
        notations: &["C#C"],
        atoms: &[atom(C, 0.0, 0.0), atom(C, 1.0, 0.0)],
        bonds: &[(0, 1, BondKind::Triple)],
    },
    Template {
        name: "ethanol",
        notations: &["CCO", "OCC"],
        atoms: &[atom(C, 0.0, 0.0), atom(C, S, -0.5), atom(O, 2.0 * S, 0.0)],
        bonds: &[(0, 1, BondKind::Single), (1, 2, BondKind::Single)],
    },
    Template {
        name: "acetic acid",
        notations: &["CC(=O)O", "CC(O)=O", "OC(=O)C"],
        atoms: &[
            atom(C, 0.0, 0.0),
            atom(C, S, -0.5),
            atom(O, S, -1.5),
            atom(O, 2.0 * S, 0.0),
        ],
        bonds: &[
            (0, 1, BondKind::Single),
            (1, 2, BondKind::Double),
            (1, 3, BondKind::Single),
        ],
    },
    Template {
        name: "benzene",
        notations: &["c1ccccc1", "C1=CC=CC=C1"],
        atoms: &RING,
        bonds: &[
            (0, 1, BondKind::Double),
            (1, 2, BondKind::Single),
            (2, 3, BondKind::Double),
            (3, 4, BondKind::Single),
            (4, 5, BondKind::Double),
            (5, 0, BondKind::Single),
        ],
    },
    Template {
        name: "cyclohexane",
        notations: &["C1CCCCC1"],
        atoms: &RING,
        bonds: &[
            (0, 1, BondKind::Single),
            (1, 2, BondKind::Single),
            (2, 3, BondKind::Single),
            (3, 4, BondKind::Single),
            (4, 5, BondKind::Single),
            (5, 0, BondKind::Single),
        ],
    },
    Template {
        name: "water",
        notations: &["O"],
        atoms: &[atom(O, 0.0, 0.0)],
        bonds: &[],
    },
    Template {
        name: "ammonia",
        notations: &["N"],
        atoms: &[atom(N, 0.0, 0.0)],
        bonds: &[],
    },
    Template {
        name: "ammonium",
        notations: &["[NH4+]"],
        atoms: &[TemplateAtom {
            elem: N,
            at: (0.0, 0.0),
            charge: 1,
            hydrogens: Some(4),
        }],
        bonds: &[],
    },
];

/// Imports a handful of common molecules by notation or by name
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateImporter {
    pub bond_length: f64,
}
impl TemplateImporter {
    pub const fn new() -> Self {
        Self { bond_length: 40.0 }
    }
    pub const fn with_bond_length(mut self, bond_length: f64) -> Self {
        self.bond_length = bond_length;
        self
    }
    /// Names of everything in the table
    pub fn names() -> impl Iterator<Item = &'static str> {
        TEMPLATES.iter().map(|t| t.name)
    }

    fn build(&self, template: &Template) -> Result<Molecule, ImportError> {
        let mut mol = Molecule::new();
        let ids = template
            .atoms
            .iter()
            .map(|a| {
                let mut atom = Atom::new(
                    a.elem,
                    Point::new(a.at.0 * self.bond_length, a.at.1 * self.bond_length),
                )
                .with_charge(a.charge);
                atom.h_count = a.hydrogens;
                mol.add_atom(atom)
            })
            .collect::<Vec<_>>();
        for &(a, b, kind) in template.bonds {
            mol.set_bond(ids[a], ids[b], kind)
                .map_err(|e| ImportError::Backend(e.to_string()))?;
        }
        Ok(mol)
    }
}
impl Default for TemplateImporter {
    fn default() -> Self {
        Self::new()
    }
}
impl NotationImporter for TemplateImporter {
    fn import(&self, notation: &str) -> Result<Molecule, ImportError> {
        let key = notation.trim();
        if let Some(t) = TEMPLATES.iter().find(|t| t.name.eq_ignore_ascii_case(key)) {
            debug!(name = t.name, "importing by name");
            return self.build(t);
        }
        check_notation(key)?;
        let template = TEMPLATES
            .iter()
            .find(|t| t.notations.iter().any(|&n| n == key))
            .ok_or_else(|| ImportError::Unrecognized(key.to_string()))?;
        debug!(name = template.name, notation = key, "importing by notation");
        self.build(template)
    }
}
