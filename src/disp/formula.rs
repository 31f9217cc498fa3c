use crate::core::*;
use crate::molecule::Molecule;
use crate::utils::Symbol;
use fmtastic::*;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::ops::AddAssign;

/// Element counts and net charge, written in Hill order
#[derive(Default, Clone, PartialEq, Eq, Hash)]
pub struct Formula {
    counts: BTreeMap<Symbol, usize>,
    pub charge: i32,
}
impl Formula {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn count(&self, elem: Symbol) -> usize {
        self.counts.get(&elem).copied().unwrap_or(0)
    }
    pub fn add_atom(&mut self, elem: Symbol, count: usize) {
        if count > 0 {
            *self.counts.entry(elem).or_default() += count;
        }
    }
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
    /// Total atom count
    pub fn atoms(&self) -> usize {
        self.counts.values().sum()
    }
    /// Entries in Hill order: carbon, then hydrogen, then the rest alphabetically. Without any
    /// carbon, everything is alphabetical.
    pub fn hill_order(&self) -> Vec<(Symbol, usize)> {
        let has_carbon = self.counts.contains_key(&CARBON);
        let mut out = Vec::with_capacity(self.counts.len());
        if has_carbon {
            out.push((CARBON, self.count(CARBON)));
            if let Some(&h) = self.counts.get(&HYDROGEN) {
                out.push((HYDROGEN, h));
            }
        }
        out.extend(
            self.counts
                .iter()
                .filter(|&(&e, _)| !has_carbon || (e != CARBON && e != HYDROGEN))
                .map(|(&e, &n)| (e, n)),
        );
        out
    }
    /// Sum of element masses, skipping anything not in the table
    pub fn mass(&self) -> f32 {
        self.counts
            .iter()
            .map(|(e, &n)| {
                crate::atom_info::lookup(e.as_str()).map_or(0.0, |d| d.mass) * n as f32
            })
            .sum()
    }
}

impl Debug for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formula")
            .field("atoms", &self.counts)
            .field("charge", &self.charge)
            .finish()
    }
}
/// Plain ASCII by default (`C2H6O`), Unicode sub- and superscripts with `{:#}` (`C₂H₆O`)
impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (elem, n) in self.hill_order() {
            Display::fmt(&elem, f)?;
            if n > 1 {
                if f.alternate() {
                    Display::fmt(&Subscript(n), f)?;
                } else {
                    Display::fmt(&n, f)?;
                }
            }
        }
        if f.alternate() {
            match self.charge {
                0 => {}
                1 => f.write_str("⁺")?,
                -1 => f.write_str("⁻")?,
                _ => write!(f, "{:+}", Superscript(self.charge))?,
            }
        } else {
            match self.charge {
                0 => {}
                1 => f.write_str("+")?,
                -1 => f.write_str("-")?,
                _ => write!(f, "{:+}", self.charge)?,
            }
        }
        Ok(())
    }
}

impl<'a> Extend<&'a Atom> for Formula {
    fn extend<T: IntoIterator<Item = &'a Atom>>(&mut self, iter: T) {
        iter.into_iter().for_each(|a| {
            self.add_atom(a.elem, 1);
            self.charge += a.charge as i32;
        });
    }
}
impl<'a> FromIterator<&'a Atom> for Formula {
    fn from_iter<T: IntoIterator<Item = &'a Atom>>(iter: T) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}
impl AddAssign<&Self> for Formula {
    fn add_assign(&mut self, other: &Self) {
        for (&e, &n) in &other.counts {
            self.add_atom(e, n);
        }
        self.charge += other.charge;
    }
}

impl Molecule {
    /// Formula over every atom on the sketch, hydrogens included
    pub fn formula(&self) -> Formula {
        self.atoms().map(|(_, a)| a).collect()
    }
    /// Molecular mass in daltons
    pub fn mass(&self) -> f32 {
        self.atoms().map(|(_, a)| a.mass()).sum()
    }
}
