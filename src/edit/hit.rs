//! Hit testing, done in world space so tolerances don't change with zoom.
//!
//! Hydrogens the engine owns are never hit; they come and go with their parent atom.

use crate::core::*;
use crate::molecule::Molecule;

/// Distance from `p` to the segment `a`-`b`, clamped to the segment's ends
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// The closest atom whose center is within `reach` of `p`
pub fn hit_atom(mol: &Molecule, p: Point, reach: f64) -> Option<AtomId> {
    mol.atoms()
        .filter(|(_, a)| !a.implicit)
        .map(|(id, a)| (id, (a.pos - p).norm()))
        .filter(|&(_, d)| d <= reach)
        .min_by(|x, y| x.1.total_cmp(&y.1))
        .map(|(id, _)| id)
}

/// The closest bond whose segment passes within `tolerance` of `p`
pub fn hit_bond(mol: &Molecule, p: Point, tolerance: f64) -> Option<BondId> {
    mol.bonds()
        .filter_map(|(id, a, b, _)| {
            let a = mol.atom(a)?;
            let b = mol.atom(b)?;
            if a.implicit || b.implicit {
                return None;
            }
            Some((id, segment_distance(p, a.pos, b.pos)))
        })
        .filter(|&(_, d)| d <= tolerance)
        .min_by(|x, y| x.1.total_cmp(&y.1))
        .map(|(id, _)| id)
}

/// Axis-aligned box from two corners, in any order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectBox {
    pub min: Point,
    pub max: Point,
}
impl SelectBox {
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }
    /// Edges count as inside
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
    /// Every atom (implicit hydrogens aside) inside the box
    pub fn atoms_within<'a>(&'a self, mol: &'a Molecule) -> impl Iterator<Item = AtomId> + 'a {
        mol.atoms()
            .filter(move |(_, a)| !a.implicit && self.contains(a.pos))
            .map(|(id, _)| id)
    }
}
