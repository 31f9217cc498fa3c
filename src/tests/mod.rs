
mod edit;
mod formula;

use crate::prelude::*;
use crate::valence::is_allowed_valence;
use std::time::{Duration, Instant};

pub(super) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

/// Build a molecule from atoms and bonds, leaving hydrogens alone
pub(super) fn sketch(
    atoms: &[(&str, f64, f64)],
    bonds: &[(usize, usize, BondKind)],
) -> (Molecule, Vec<AtomId>) {
    let mut mol = Molecule::new();
    let ids = atoms
        .iter()
        .map(|&(sym, x, y)| mol.add_atom(Atom::new(Symbol::new(sym).unwrap(), Point::new(x, y))))
        .collect::<Vec<_>>();
    for &(a, b, kind) in bonds {
        mol.add_bond(ids[a], ids[b], kind).unwrap();
    }
    (mol, ids)
}

/// An editor with a fake clock. Screen and world coordinates match until something pans or zooms.
pub(super) struct Driver {
    pub ed: Editor,
    pub now: Instant,
}
impl Driver {
    pub fn new(cfg: EditConfig) -> Self {
        Self {
            ed: Editor::new(cfg),
            now: Instant::now(),
        }
    }
    pub fn tick(&mut self) -> Instant {
        self.now += Duration::from_millis(16);
        self.now
    }
    /// Let the post-drag cool-down run out
    pub fn settle(&mut self) {
        self.now += Duration::from_millis(500);
    }
    pub fn send(&mut self, ev: PointerEvent) -> Option<Edit> {
        self.ed.handle(ev).unwrap()
    }
    pub fn down(&mut self, x: f64, y: f64) -> Option<Edit> {
        let t = self.tick();
        self.send(PointerEvent::down(x, y, t))
    }
    pub fn moved(&mut self, x: f64, y: f64) -> Option<Edit> {
        let t = self.tick();
        self.send(PointerEvent::moved(x, y, t))
    }
    pub fn up(&mut self, x: f64, y: f64) -> Option<Edit> {
        let t = self.tick();
        self.send(PointerEvent::up(x, y, t))
    }
    pub fn click(&mut self, x: f64, y: f64) -> Option<Edit> {
        self.down(x, y);
        self.up(x, y)
    }
    /// Press at `from`, move through the midpoint, release at `to`, then wait out the cool-down
    pub fn drag(&mut self, from: (f64, f64), to: (f64, f64)) -> Option<Edit> {
        self.down(from.0, from.1);
        self.moved((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
        self.moved(to.0, to.1);
        let out = self.up(to.0, to.1);
        self.settle();
        out
    }
    pub fn mol(&self) -> &Molecule {
        self.ed.molecule()
    }
}

/// Every heavy atom with a known element carries one of its valences
pub(super) fn valence_closed(mol: &Molecule) -> bool {
    mol.heavy_atoms().all(|id| {
        let valences = mol.atom(id).unwrap().valences();
        valences.is_empty() || is_allowed_valence(valences, mol.bond_sum(id, true))
    })
}
