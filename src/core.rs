//! Atoms, bonds, and the plane they're drawn on

use crate::atom_info::{self, ElemData};
use crate::utils::Symbol;
use c_enum::*;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// A position on the drawing surface, in world units
pub type Point = nalgebra::Point2<f64>;
/// A displacement on the drawing surface
pub type Vector = nalgebra::Vector2<f64>;

/// Atom identifier, stable for as long as the atom exists
pub type AtomId = NodeIndex;
/// Bond identifier, stable for as long as the bond exists
pub type BondId = EdgeIndex;

pub const HYDROGEN: Symbol = Symbol::from_static("H");
pub const CARBON: Symbol = Symbol::from_static("C");

/// Something referenced part of the graph that isn't there.
///
/// These are contract violations on the caller's side; chemically strange input never produces one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum GraphError {
    #[error("no atom with id {}", .0.index())]
    MissingAtom(AtomId),
    #[error("no bond with id {}", .0.index())]
    MissingBond(BondId),
    #[error("can't bond atom {} to itself", .0.index())]
    SelfBond(AtomId),
}

/// An atom on the sketch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atom {
    pub elem: Symbol,
    pub charge: i8,
    pub pos: Point,
    /// Set on hydrogens the hydrogen engine owns. These are removed and re-added freely.
    pub implicit: bool,
    /// Hydrogen count requested by an importer, consumed by the first reconciliation
    pub h_count: Option<u8>,
}
impl Atom {
    pub fn new(elem: Symbol, pos: Point) -> Self {
        Self {
            elem,
            charge: 0,
            pos,
            implicit: false,
            h_count: None,
        }
    }
    pub fn implicit_hydrogen(pos: Point) -> Self {
        Self {
            implicit: true,
            ..Self::new(HYDROGEN, pos)
        }
    }
    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }
    pub fn with_h_count(mut self, count: u8) -> Self {
        self.h_count = Some(count);
        self
    }

    #[inline(always)]
    pub fn is_hydrogen(&self) -> bool {
        self.elem == HYDROGEN
    }
    /// Table entry for this atom's element, if it's one we know
    pub fn info(&self) -> Option<&'static ElemData> {
        atom_info::lookup(self.elem.as_str())
    }
    /// Valences for this atom's element at its current charge
    pub fn valences(&self) -> &'static [u8] {
        atom_info::charged_valences(self.elem.as_str(), self.charge)
    }
    pub fn mass(&self) -> f32 {
        self.info().map_or(0.0, |e| e.mass)
    }
}
impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str(self.info().map_or(self.elem.as_str(), |e| e.name))
        } else {
            use fmtastic::*;
            write!(f, "{}", self.elem)?;
            match self.charge {
                0 => Ok(()),
                1 => f.write_str("⁺"),
                -1 => f.write_str("⁻"),
                _ => write!(f, "{:+}", Superscript(self.charge)),
            }
        }
    }
}

c_enum! {
    /// The kind of a bond between two atoms
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    pub enum BondKind: u8 {
        Single,
        Double,
        Triple,
        /// Stereo bond toward the viewer, single for valence purposes
        Wedge,
        /// Stereo bond away from the viewer, single for valence purposes
        Dash,
    }
}
impl BondKind {
    /// Integer weight used for valence arithmetic
    pub fn order(self) -> u8 {
        match self {
            Self::Single | Self::Wedge | Self::Dash => 1,
            Self::Double => 2,
            Self::Triple => 3,
            _ => panic!("invalid bond!"),
        }
    }
    /// The kind a click on the bond turns it into.
    ///
    /// Plain bonds go single, double, triple, and back to single. Stereo bonds go wedge, dash,
    /// then single.
    pub fn cycled(self) -> Self {
        match self {
            Self::Single => Self::Double,
            Self::Double => Self::Triple,
            Self::Triple => Self::Single,
            Self::Wedge => Self::Dash,
            Self::Dash => Self::Single,
            _ => panic!("invalid bond!"),
        }
    }
    pub fn is_stereo(self) -> bool {
        matches!(self, Self::Wedge | Self::Dash)
    }
    pub fn as_static_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Triple => "triple",
            Self::Wedge => "wedge",
            Self::Dash => "dash",
            _ => panic!("invalid bond!"),
        }
    }
}
impl Display for BondKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_static_str())
    }
}

/// Free-standing function form of [`BondKind::order`]
#[inline(always)]
pub fn bond_order(kind: BondKind) -> u8 {
    kind.order()
}

/// The graph behind a sketch: atoms as nodes, bond kinds as edges.
///
/// A stable graph keeps ids valid across removals.
pub type MoleculeGraph = StableUnGraph<Atom, BondKind>;
