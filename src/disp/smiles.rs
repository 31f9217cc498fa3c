//! SMILES output.
//!
//! The walk covers heavy atoms only; their hydrogens are left implicit. A molecule with nothing but
//! hydrogens is walked with bracketed `[H]` tokens instead.

use crate::atom_info::ORGANIC_SUBSET;
use crate::core::*;
use crate::molecule::Molecule;
use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::fmt::Write;

/// Elements the aromatic heuristic may write in lower case
const AROMATIC_CAPABLE: [&str; 6] = ["B", "C", "N", "O", "P", "S"];

fn bond2str(kind: BondKind) -> &'static str {
    match kind {
        BondKind::Single | BondKind::Wedge | BondKind::Dash => "",
        BondKind::Double => "=",
        BondKind::Triple => "#",
        _ => panic!("invalid bond!"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmilesConfig {
    /// Write atoms that look aromatic in lower case, dropping the double bonds between them
    pub aromatic_heuristic: bool,
    /// Bracket elements outside the organic subset. Turning this off gives shorter output that
    /// most readers will reject.
    pub brackets_for_unknown: bool,
}
impl SmilesConfig {
    /// Default config
    pub const fn new() -> Self {
        Self {
            aromatic_heuristic: true,
            brackets_for_unknown: true,
        }
    }
    /// Every double bond written out, every atom in upper case
    pub const fn kekule() -> Self {
        Self {
            aromatic_heuristic: false,
            brackets_for_unknown: true,
        }
    }
    pub const fn with_aromatic_heuristic(mut self, aromatic: bool) -> Self {
        self.aromatic_heuristic = aromatic;
        self
    }
    pub const fn with_brackets_for_unknown(mut self, brackets: bool) -> Self {
        self.brackets_for_unknown = brackets;
        self
    }
}
impl Default for SmilesConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Is there a path from `a` to `b` that doesn't go through `bond`?
pub fn is_ring_bond(mol: &Molecule, bond: BondId, a: AtomId, b: AtomId) -> bool {
    let mut seen = AHashSet::new();
    seen.insert(a);
    let mut queue = VecDeque::from([a]);
    while let Some(id) = queue.pop_front() {
        for (e, n, _) in mol.incident(id) {
            if e == bond {
                continue;
            }
            if n == b {
                return true;
            }
            if seen.insert(n) {
                queue.push_back(n);
            }
        }
    }
    false
}

/// Atoms with a double bond inside a ring.
///
/// This is a rough stand-in for aromaticity perception: a cyclohexene carbon passes too.
pub fn aromatic_atoms(mol: &Molecule) -> AHashSet<AtomId> {
    let mut out = AHashSet::new();
    for (bond, a, b, kind) in mol.bonds() {
        if kind != BondKind::Double || !is_ring_bond(mol, bond, a, b) {
            continue;
        }
        for id in [a, b] {
            let capable = mol.atom(id).is_some_and(|atom| {
                atom.charge == 0 && AROMATIC_CAPABLE.contains(&atom.elem.as_str())
            });
            if capable {
                out.insert(id);
            }
        }
    }
    out
}

fn write_label(out: &mut String, label: usize) {
    match label {
        0..=9 => {
            let _ = write!(out, "{label}");
        }
        10..=99 => {
            let _ = write!(out, "%{label}");
        }
        _ => {
            let _ = write!(out, "%({label})");
        }
    }
}

/// Walk order for one fragment
#[derive(Debug, Default)]
struct Plan {
    /// Children in the walk tree, in discovery order. The last one continues the chain.
    children: AHashMap<AtomId, SmallVec<(AtomId, BondKind), 4>>,
    /// Ring labels after each atom: label, the bond kind on the closing end, and the other end
    rings: AHashMap<AtomId, SmallVec<(usize, Option<BondKind>, AtomId), 2>>,
}

enum Step {
    Visit {
        atom: AtomId,
        from: Option<(AtomId, BondKind)>,
        branch: bool,
    },
    Close,
}

struct Writer<'a> {
    mol: &'a Molecule,
    cfg: SmilesConfig,
    hydrogens_only: bool,
    aromatic: AHashSet<AtomId>,
    visited: AHashSet<AtomId>,
    next_label: usize,
    out: String,
}
impl Writer<'_> {
    /// Bonds the walk may follow out of an atom, in bond id order
    fn links(&self, id: AtomId) -> SmallVec<(BondId, AtomId, BondKind), 4> {
        let mol = self.mol;
        mol.incident(id)
            .into_iter()
            .filter(|e| self.hydrogens_only || !mol.atom(e.1).is_some_and(Atom::is_hydrogen))
            .collect()
    }

    fn component(&self, seed: AtomId) -> Vec<AtomId> {
        let mut seen = AHashSet::new();
        seen.insert(seed);
        let mut out = vec![seed];
        let mut idx = 0;
        while let Some(&id) = out.get(idx) {
            idx += 1;
            for (_, n, _) in self.links(id) {
                if seen.insert(n) {
                    out.push(n);
                }
            }
        }
        out.sort_unstable_by_key(|id| id.index());
        out
    }

    fn fragment(&mut self, seed: AtomId) {
        // a terminal start keeps the nesting shallow
        let start = self
            .component(seed)
            .into_iter()
            .find(|&id| self.links(id).len() == 1)
            .unwrap_or(seed);
        let plan = self.plan(start);
        self.emit(start, &plan);
    }

    fn plan(&mut self, start: AtomId) -> Plan {
        let mut plan = Plan::default();
        let mut used = AHashSet::new();
        self.visited.insert(start);
        let mut stack = vec![(start, self.links(start), 0usize)];
        while let Some((atom, links, next)) = stack.last_mut() {
            let Some(&(bond, other, kind)) = links.get(*next) else {
                stack.pop();
                continue;
            };
            *next += 1;
            let atom = *atom;
            if !used.insert(bond) {
                continue;
            }
            if self.visited.contains(&other) {
                let label = self.next_label;
                self.next_label += 1;
                plan.rings
                    .entry(other)
                    .or_default()
                    .push((label, None, atom));
                plan.rings
                    .entry(atom)
                    .or_default()
                    .push((label, Some(kind), other));
            } else {
                self.visited.insert(other);
                plan.children.entry(atom).or_default().push((other, kind));
                stack.push((other, self.links(other), 0));
            }
        }
        plan
    }

    fn emit(&mut self, start: AtomId, plan: &Plan) {
        let mut steps = vec![Step::Visit {
            atom: start,
            from: None,
            branch: false,
        }];
        while let Some(step) = steps.pop() {
            let (atom, from, branch) = match step {
                Step::Close => {
                    self.out.push(')');
                    continue;
                }
                Step::Visit { atom, from, branch } => (atom, from, branch),
            };
            if branch {
                self.out.push('(');
            }
            if let Some((parent, kind)) = from {
                let sym = self.bond_symbol(kind, parent, atom);
                self.out.push_str(sym);
            }
            self.write_atom(atom);
            if let Some(rings) = plan.rings.get(&atom) {
                for &(label, kind, partner) in rings {
                    if let Some(kind) = kind {
                        let sym = self.bond_symbol(kind, atom, partner);
                        self.out.push_str(sym);
                    }
                    write_label(&mut self.out, label);
                }
            }
            let Some((&(last, kind), rest)) = plan.children.get(&atom).and_then(|c| c.split_last())
            else {
                continue;
            };
            steps.push(Step::Visit {
                atom: last,
                from: Some((atom, kind)),
                branch: false,
            });
            for &(child, kind) in rest.iter().rev() {
                steps.push(Step::Close);
                steps.push(Step::Visit {
                    atom: child,
                    from: Some((atom, kind)),
                    branch: true,
                });
            }
        }
    }

    fn bond_symbol(&self, kind: BondKind, a: AtomId, b: AtomId) -> &'static str {
        if self.aromatic.contains(&a) && self.aromatic.contains(&b) {
            ""
        } else {
            bond2str(kind)
        }
    }

    fn write_atom(&mut self, id: AtomId) {
        let mol = self.mol;
        let Some(atom) = mol.atom(id) else {
            return;
        };
        let sym = atom.elem.as_str();
        let organic = ORGANIC_SUBSET.contains(&sym);
        let bare = atom.charge == 0
            && !atom.is_hydrogen()
            && (organic || !self.cfg.brackets_for_unknown);
        if bare {
            if self.aromatic.contains(&id) {
                self.out.push_str(&sym.to_ascii_lowercase());
            } else {
                self.out.push_str(sym);
            }
            return;
        }
        self.out.push('[');
        self.out.push_str(sym);
        let h = if atom.is_hydrogen() {
            0
        } else {
            mol.hydrogen_count(id)
        };
        match h {
            0 => {}
            1 => self.out.push('H'),
            n => {
                let _ = write!(self.out, "H{n}");
            }
        }
        match atom.charge {
            0 => {}
            1 => self.out.push('+'),
            -1 => self.out.push('-'),
            n => {
                let _ = write!(self.out, "{n:+}");
            }
        }
        self.out.push(']');
    }
}

/// Write a molecule out as SMILES.
///
/// Output is deterministic for a given graph: neighbors are taken in bond id order and
/// disconnected fragments in atom id order, joined with `.`. Ring labels are handed out in order
/// and never reused, going to `%nn` past 9.
pub fn generate_smiles(mol: &Molecule, cfg: SmilesConfig) -> String {
    let heavy = mol.heavy_atoms().collect::<Vec<_>>();
    let hydrogens_only = heavy.is_empty();
    let seeds = if hydrogens_only {
        mol.atoms().map(|(id, _)| id).collect()
    } else {
        heavy
    };
    if seeds.is_empty() {
        return String::new();
    }
    let aromatic = if cfg.aromatic_heuristic && !hydrogens_only {
        aromatic_atoms(mol)
    } else {
        AHashSet::new()
    };
    let mut writer = Writer {
        mol,
        cfg,
        hydrogens_only,
        aromatic,
        visited: AHashSet::with_capacity(seeds.len()),
        next_label: 1,
        out: String::with_capacity(seeds.len() * 2),
    };
    for seed in seeds {
        if writer.visited.contains(&seed) {
            continue;
        }
        if !writer.out.is_empty() {
            writer.out.push('.');
        }
        writer.fragment(seed);
    }
    writer.out
}
