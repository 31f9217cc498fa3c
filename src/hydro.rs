//! The hydrogen engine keeps implicit hydrogens in step with the heavy atoms they hang off of.
//!
//! Reconciling an atom throws away its implicit hydrogens, works out how many it needs from its
//! remaining bonds, and lays the new ones out in the emptiest direction around it. It never
//! refuses: an over-bonded atom just ends up with no hydrogens and gets flagged by validation.

use crate::core::*;
use crate::molecule::{Molecule, StructureKey};
use crate::valence::hydrogens_needed;
use itertools::Itertools;
use smallvec::SmallVec;
use std::f64::consts::{FRAC_PI_3, TAU};
use tracing::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydroConfig {
    /// Distance from the parent atom to each placed hydrogen
    pub radius: f64,
    /// Spacing for hydrogens fanned opposite a single substituent, in radians
    pub fan_step: f64,
}
impl HydroConfig {
    pub const fn new() -> Self {
        Self {
            radius: 25.0,
            fan_step: FRAC_PI_3,
        }
    }
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }
    pub const fn with_fan_step(mut self, fan_step: f64) -> Self {
        self.fan_step = fan_step;
        self
    }
}
impl Default for HydroConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Angles (radians, measured from +x) for `needed` new hydrogens, given the directions of the
/// substituents already on the atom.
pub fn placement_angles(existing: &[f64], needed: usize, fan_step: f64) -> SmallVec<f64, 4> {
    if needed == 0 {
        return SmallVec::new();
    }
    match existing.len() {
        0 => {
            let step = TAU / needed as f64;
            (0..needed).map(|i| i as f64 * step).collect()
        }
        1 => {
            let opposite = existing[0] + std::f64::consts::PI;
            if needed == 1 {
                let mut out = SmallVec::new();
                out.push(normalize(opposite));
                out
            } else {
                let mid = (needed - 1) as f64 / 2.0;
                (0..needed)
                    .map(|i| normalize(opposite + (i as f64 - mid) * fan_step))
                    .collect()
            }
        }
        // with two or more neighbors the widest gap wins; for two that's the larger of the two arcs
        _ => {
            let (start, gap) = widest_gap(existing);
            (1..=needed)
                .map(|i| normalize(start + gap * i as f64 / (needed + 1) as f64))
                .collect()
        }
    }
}

/// Start angle and size of the largest arc between consecutive directions. Ties go to the first
/// gap in sorted order.
fn widest_gap(angles: &[f64]) -> (f64, f64) {
    let sorted = angles
        .iter()
        .copied()
        .map(normalize)
        .sorted_by(f64::total_cmp)
        .collect::<SmallVec<f64, 4>>();
    let mut best = (sorted[sorted.len() - 1], sorted[0] + TAU - sorted[sorted.len() - 1]);
    for (&a, &b) in sorted.iter().tuple_windows() {
        let gap = b - a;
        if gap > best.1 {
            best = (a, gap);
        }
    }
    best
}

fn normalize(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Counts of what one reconciliation pass did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub removed: usize,
    pub added: usize,
}
impl std::ops::AddAssign for Reconciliation {
    fn add_assign(&mut self, rhs: Self) {
        self.removed += rhs.removed;
        self.added += rhs.added;
    }
}

/// Remembers the last structure key it was told about, so a caller can tell its own writes from
/// someone else's.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StructureWatch {
    seen: StructureKey,
}
impl StructureWatch {
    pub fn new(mol: &Molecule) -> Self {
        Self {
            seen: mol.structure_key(),
        }
    }
    /// Did atoms or bonds get added or removed since the last acknowledgement?
    pub fn changed(&self, mol: &Molecule) -> bool {
        self.seen != mol.structure_key()
    }
    pub fn acknowledge(&mut self, mol: &Molecule) {
        self.seen = mol.structure_key();
    }
}

#[derive(Debug, Clone, Default)]
pub struct HydrogenEngine {
    pub cfg: HydroConfig,
    watch: StructureWatch,
}
impl HydrogenEngine {
    pub fn new(cfg: HydroConfig) -> Self {
        Self {
            cfg,
            watch: StructureWatch::default(),
        }
    }

    /// Reconcile every atom in `affected`. Hydrogens, missing ids, and duplicates are skipped.
    ///
    /// The engine's own additions and removals are acknowledged before this returns, so they never
    /// show up in [`Self::needs_sync`].
    #[instrument(level = "debug", skip_all)]
    pub fn reconcile<I: IntoIterator<Item = AtomId>>(
        &mut self,
        mol: &mut Molecule,
        affected: I,
    ) -> Reconciliation {
        let mut total = Reconciliation::default();
        for id in affected.into_iter().unique() {
            total += self.reconcile_atom(mol, id);
        }
        self.watch.acknowledge(mol);
        debug!(removed = total.removed, added = total.added, "reconciled");
        total
    }
    /// Reconcile every non-hydrogen atom, as after an import
    pub fn reconcile_all(&mut self, mol: &mut Molecule) -> Reconciliation {
        let heavy = mol.heavy_atoms().collect::<Vec<_>>();
        self.reconcile(mol, heavy)
    }
    /// True if the structure changed since the engine last saw it, by a hand other than its own
    pub fn needs_sync(&self, mol: &Molecule) -> bool {
        self.watch.changed(mol)
    }
    /// Mark the current structure as seen without reconciling anything
    pub fn acknowledge(&mut self, mol: &Molecule) {
        self.watch.acknowledge(mol);
    }

    fn reconcile_atom(&self, mol: &mut Molecule, id: AtomId) -> Reconciliation {
        let mut out = Reconciliation::default();
        let Some(atom) = mol.atom(id).copied() else {
            trace!(id = id.index(), "skipping missing atom");
            return out;
        };
        if atom.is_hydrogen() {
            return out;
        }
        for h in mol.implicit_hydrogens(id) {
            if mol.remove_atom(h).is_ok() {
                out.removed += 1;
            }
        }
        let current = mol.bond_sum(id, false);
        let needed = match atom.h_count {
            Some(count) => {
                if let Some(a) = mol.atom_mut(id) {
                    a.h_count = None;
                }
                u16::from(count)
            }
            None => {
                let valences = atom.valences();
                if valences.is_empty() {
                    trace!(id = id.index(), elem = %atom.elem, "no valence data, skipping");
                    return out;
                }
                hydrogens_needed(valences, current)
            }
        };
        trace!(id = id.index(), current, needed, "placing hydrogens");
        if needed == 0 {
            return out;
        }
        // hydrogens placed by hand are still in the way, so they count as occupied directions
        let existing = mol
            .neighbors(id, true)
            .into_iter()
            .filter_map(|n| mol.atom(n))
            .map(|n| {
                let d = n.pos - atom.pos;
                d.y.atan2(d.x)
            })
            .collect::<SmallVec<f64, 4>>();
        for angle in placement_angles(&existing, needed as usize, self.cfg.fan_step) {
            let pos = atom.pos + Vector::new(angle.cos(), angle.sin()) * self.cfg.radius;
            let h = mol.add_atom(Atom::implicit_hydrogen(pos));
            if mol.add_bond(id, h, BondKind::Single).is_ok() {
                out.added += 1;
            }
        }
        out
    }
}
