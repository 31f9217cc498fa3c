//! The graph model: atoms and bonds plus the queries and updates everything else is built on.
//!
//! Nothing here knows about editing policy or geometry. Updates mutate in place; a snapshot is a
//! `clone()` away.

use crate::core::*;
use petgraph::visit::EdgeRef;
use smallvec::SmallVec;
use tracing::*;

/// What happened when a bond was requested between two atoms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondChange {
    /// A new bond was created
    Created(BondId),
    /// The atoms were already bonded, so the existing bond moved to its next kind
    Escalated {
        id: BondId,
        from: BondKind,
        to: BondKind,
    },
}
impl BondChange {
    pub fn id(self) -> BondId {
        match self {
            Self::Created(id) => id,
            Self::Escalated { id, .. } => id,
        }
    }
}

/// Atom and bond counts. Only connectivity changes move this, position edits don't.
pub type StructureKey = (usize, usize);

#[derive(Debug, Clone, Default)]
pub struct Molecule {
    graph: MoleculeGraph,
}
impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn from_graph(graph: MoleculeGraph) -> Self {
        Self { graph }
    }
    pub fn graph(&self) -> &MoleculeGraph {
        &self.graph
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.graph.node_weight(id)
    }
    /// Mutable access to an atom, for position and charge edits. Don't change the element of a
    /// hydrogen the engine owns.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.graph.node_weight_mut(id)
    }
    pub fn bond(&self, id: BondId) -> Option<BondKind> {
        self.graph.edge_weight(id).copied()
    }
    pub fn endpoints(&self, id: BondId) -> Option<(AtomId, AtomId)> {
        self.graph.edge_endpoints(id)
    }
    pub fn contains_atom(&self, id: AtomId) -> bool {
        self.graph.contains_node(id)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }
    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }
    pub fn heavy_atom_count(&self) -> usize {
        self.atoms().filter(|(_, a)| !a.is_hydrogen()).count()
    }
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
    pub fn structure_key(&self) -> StructureKey {
        (self.graph.node_count(), self.graph.edge_count())
    }

    /// All atoms, in id order
    pub fn atoms(&self) -> impl Iterator<Item = (AtomId, &Atom)> + '_ {
        self.graph.node_indices().map(|i| (i, &self.graph[i]))
    }
    /// All bonds as `(id, a, b, kind)`, in id order
    pub fn bonds(&self) -> impl Iterator<Item = (BondId, AtomId, AtomId, BondKind)> + '_ {
        self.graph.edge_indices().filter_map(|e| {
            let (a, b) = self.graph.edge_endpoints(e)?;
            Some((e, a, b, self.graph[e]))
        })
    }
    /// Non-hydrogen atoms, in id order
    pub fn heavy_atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.atoms()
            .filter(|(_, a)| !a.is_hydrogen())
            .map(|(i, _)| i)
    }

    pub fn add_atom(&mut self, atom: Atom) -> AtomId {
        let id = self.graph.add_node(atom);
        trace!(id = id.index(), elem = %atom.elem, "added atom");
        id
    }
    /// Remove an atom along with every bond touching it
    pub fn remove_atom(&mut self, id: AtomId) -> Result<Atom, GraphError> {
        let atom = self
            .graph
            .remove_node(id)
            .ok_or(GraphError::MissingAtom(id))?;
        trace!(id = id.index(), elem = %atom.elem, "removed atom");
        Ok(atom)
    }

    /// Bond two atoms. If they're already bonded, the existing bond is escalated to its next kind
    /// instead of a second bond being made.
    pub fn add_bond(&mut self, a: AtomId, b: AtomId, kind: BondKind) -> Result<BondChange, GraphError> {
        self.check_pair(a, b)?;
        if let Some(id) = self.graph.find_edge(a, b) {
            let from = self.graph[id];
            let to = from.cycled();
            self.graph[id] = to;
            trace!(id = id.index(), %from, %to, "escalated existing bond");
            Ok(BondChange::Escalated { id, from, to })
        } else {
            let id = self.graph.add_edge(a, b, kind);
            trace!(id = id.index(), a = a.index(), b = b.index(), %kind, "added bond");
            Ok(BondChange::Created(id))
        }
    }
    /// Set the kind of a bond between two atoms, creating it if needed
    pub fn set_bond(&mut self, a: AtomId, b: AtomId, kind: BondKind) -> Result<BondId, GraphError> {
        self.check_pair(a, b)?;
        if let Some(id) = self.graph.find_edge(a, b) {
            self.graph[id] = kind;
            Ok(id)
        } else {
            Ok(self.graph.add_edge(a, b, kind))
        }
    }
    /// Change a bond's kind, returning the old one
    pub fn retype_bond(&mut self, id: BondId, kind: BondKind) -> Result<BondKind, GraphError> {
        let weight = self
            .graph
            .edge_weight_mut(id)
            .ok_or(GraphError::MissingBond(id))?;
        let old = std::mem::replace(weight, kind);
        trace!(id = id.index(), from = %old, to = %kind, "retyped bond");
        Ok(old)
    }
    /// Remove a bond, returning its endpoints and kind
    pub fn remove_bond(&mut self, id: BondId) -> Result<(AtomId, AtomId, BondKind), GraphError> {
        let (a, b) = self
            .graph
            .edge_endpoints(id)
            .ok_or(GraphError::MissingBond(id))?;
        let kind = self
            .graph
            .remove_edge(id)
            .ok_or(GraphError::MissingBond(id))?;
        trace!(id = id.index(), "removed bond");
        Ok((a, b, kind))
    }
    pub fn bond_between(&self, a: AtomId, b: AtomId) -> Option<BondId> {
        self.graph.find_edge(a, b)
    }

    /// Bonds touching an atom as `(bond, other atom, kind)`, in bond id order
    pub fn incident(&self, id: AtomId) -> SmallVec<(BondId, AtomId, BondKind), 4> {
        let mut out = self
            .graph
            .edges(id)
            .map(|e| {
                let other = if e.source() == id {
                    e.target()
                } else {
                    e.source()
                };
                (e.id(), other, *e.weight())
            })
            .collect::<SmallVec<_, 4>>();
        out.sort_unstable_by_key(|e| e.0.index());
        out
    }
    /// Neighbors of an atom, in bond id order. With `include_hydrogens` unset, every hydrogen is
    /// skipped, implicit or not.
    pub fn neighbors(&self, id: AtomId, include_hydrogens: bool) -> SmallVec<AtomId, 4> {
        self.incident(id)
            .into_iter()
            .map(|e| e.1)
            .filter(|&n| include_hydrogens || !self.graph[n].is_hydrogen())
            .collect()
    }
    /// The implicit hydrogens hanging off an atom
    pub fn implicit_hydrogens(&self, id: AtomId) -> SmallVec<AtomId, 4> {
        self.incident(id)
            .into_iter()
            .map(|e| e.1)
            .filter(|&n| self.graph[n].implicit && self.graph.edges(n).count() == 1)
            .collect()
    }
    /// Every hydrogen bonded to an atom, implicit or placed by hand
    pub fn hydrogen_count(&self, id: AtomId) -> usize {
        self.incident(id)
            .iter()
            .filter(|e| self.graph[e.1].is_hydrogen())
            .count()
    }
    /// Sum of bond orders on an atom, optionally skipping bonds to implicit hydrogens. Saturates
    /// instead of overflowing.
    pub fn bond_sum(&self, id: AtomId, include_implicit: bool) -> u16 {
        self.incident(id)
            .iter()
            .filter(|e| include_implicit || !self.graph[e.1].implicit)
            .fold(0u16, |acc, e| acc.saturating_add(e.2.order().into()))
    }
    pub fn degree(&self, id: AtomId) -> usize {
        self.graph.edges(id).count()
    }

    fn check_pair(&self, a: AtomId, b: AtomId) -> Result<(), GraphError> {
        if !self.graph.contains_node(a) {
            return Err(GraphError::MissingAtom(a));
        }
        if !self.graph.contains_node(b) {
            return Err(GraphError::MissingAtom(b));
        }
        if a == b {
            return Err(GraphError::SelfBond(a));
        }
        Ok(())
    }
}
