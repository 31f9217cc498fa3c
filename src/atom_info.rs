//! The valence table. Elements are rows of data keyed by symbol, not types.

use ElemGroup::*;

/// Element group on the periodic table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemGroup {
    /// Alkali metal
    Alkali,
    /// Alkaline earth metal
    AlkEar,
    /// Transition metal
    Trans,
    /// Post-transition metal
    Poor,
    /// Metalloid
    Metoid,
    /// Nonmetal
    Nonmet,
    /// Halogen
    Halogn,
    /// Noble gas
    Noble,
}

#[derive(Debug, Clone, Copy)]
pub struct ElemData {
    pub name: &'static str,
    pub sym: &'static str,
    pub mass: f32,
    pub group: ElemGroup,
    /// Total bond orders this element can carry, most preferred (smallest) first.
    /// Empty means hydrogen completion doesn't apply.
    pub valences: &'static [u8],
}
impl ElemData {
    pub const fn new(
        name: &'static str,
        sym: &'static str,
        mass: f32,
        group: ElemGroup,
        valences: &'static [u8],
    ) -> Self {
        Self {
            name,
            sym,
            mass,
            group,
            valences,
        }
    }
}

/// Every element the editor knows, indexed by atomic number
pub static ELEM_DATA: &[ElemData] = &[
    ElemData::new("unknown",    "R",  0.0000, Nonmet, &[]),
    ElemData::new("hydrogen",   "H",  1.0078, Nonmet, &[1]),
    ElemData::new("helium",     "He", 4.0026, Noble,  &[0]),
    ElemData::new("lithium",    "Li", 6.9410, Alkali, &[1]),
    ElemData::new("beryllium",  "Be", 9.0122, AlkEar, &[2]),
    ElemData::new("boron",      "B",  10.811, Metoid, &[3]),
    ElemData::new("carbon",     "C",  12.011, Nonmet, &[4]),
    ElemData::new("nitrogen",   "N",  14.007, Nonmet, &[3, 5]),
    ElemData::new("oxygen",     "O",  15.999, Nonmet, &[2]),
    ElemData::new("fluorine",   "F",  18.998, Halogn, &[1]),
    ElemData::new("neon",       "Ne", 20.180, Noble,  &[0]),
    ElemData::new("sodium",     "Na", 22.990, Alkali, &[1]),
    ElemData::new("magnesium",  "Mg", 24.305, AlkEar, &[2]),
    ElemData::new("aluminium",  "Al", 26.982, Poor,   &[3]),
    ElemData::new("silicon",    "Si", 28.086, Metoid, &[4]),
    ElemData::new("phosphorus", "P",  30.974, Nonmet, &[3, 5]),
    ElemData::new("sulfur",     "S",  32.065, Nonmet, &[2, 4, 6]),
    ElemData::new("chlorine",   "Cl", 35.453, Halogn, &[1, 3, 5, 7]),
    ElemData::new("argon",      "Ar", 39.948, Noble,  &[0]),
    ElemData::new("potassium",  "K",  39.098, Alkali, &[1]),
    ElemData::new("calcium",    "Ca", 40.078, AlkEar, &[2]),
    ElemData::new("scandium",   "Sc", 44.956, Trans,  &[]),
    ElemData::new("titanium",   "Ti", 47.867, Trans,  &[]),
    ElemData::new("vanadium",   "V",  50.942, Trans,  &[]),
    ElemData::new("chromium",   "Cr", 51.996, Trans,  &[]),
    ElemData::new("manganese",  "Mn", 54.938, Trans,  &[]),
    ElemData::new("iron",       "Fe", 55.845, Trans,  &[]),
    ElemData::new("cobalt",     "Co", 58.933, Trans,  &[]),
    ElemData::new("nickel",     "Ni", 58.693, Trans,  &[]),
    ElemData::new("copper",     "Cu", 63.546, Trans,  &[]),
    ElemData::new("zinc",       "Zn", 65.380, Trans,  &[]),
    ElemData::new("gallium",    "Ga", 69.723, Poor,   &[3]),
    ElemData::new("germanium",  "Ge", 72.640, Metoid, &[4]),
    ElemData::new("arsenic",    "As", 74.992, Metoid, &[3, 5]),
    ElemData::new("selenium",   "Se", 78.960, Nonmet, &[2, 4, 6]),
    ElemData::new("bromine",    "Br", 79.904, Halogn, &[1, 3, 5, 7]),
    ElemData::new("krypton",    "Kr", 83.798, Noble,  &[0]),
    ElemData::new("rubidium",   "Rb", 85.468, Alkali, &[1]),
    ElemData::new("strontium",  "Sr", 87.620, AlkEar, &[2]),
    ElemData::new("yttrium",    "Y",  88.906, Trans,  &[]),
    ElemData::new("zirconium",  "Zr", 91.224, Trans,  &[]),
    ElemData::new("niobium",    "Nb", 92.906, Trans,  &[]),
    ElemData::new("molybdenum", "Mo", 95.950, Trans,  &[]),
    ElemData::new("technetium", "Tc", 98.000, Trans,  &[]),
    ElemData::new("ruthenium",  "Ru", 101.07, Trans,  &[]),
    ElemData::new("rhodium",    "Rh", 102.91, Trans,  &[]),
    ElemData::new("palladium",  "Pd", 106.42, Trans,  &[]),
    ElemData::new("silver",     "Ag", 107.87, Trans,  &[]),
    ElemData::new("cadmium",    "Cd", 112.41, Trans,  &[]),
    ElemData::new("indium",     "In", 114.82, Poor,   &[3]),
    ElemData::new("tin",        "Sn", 118.71, Poor,   &[2, 4]),
    ElemData::new("antimony",   "Sb", 121.76, Metoid, &[3, 5]),
    ElemData::new("tellurium",  "Te", 127.60, Metoid, &[2, 4, 6]),
    ElemData::new("iodine",     "I",  126.90, Halogn, &[1, 3, 5, 7]),
    ElemData::new("xenon",      "Xe", 131.29, Noble,  &[0, 2, 4, 6]),
];

/// Symbols that can be written without brackets in line notation
pub const ORGANIC_SUBSET: &[&str] = &["B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I"];

/// Look up an element by its symbol. Symbols are case-sensitive, and the `R` placeholder is never
/// returned.
pub fn lookup(sym: &str) -> Option<&'static ElemData> {
    ELEM_DATA.iter().skip(1).find(|e| e.sym == sym)
}

/// The valences an element can take, smallest first. Unknown symbols get an empty slice instead of
/// an error so callers can skip them.
pub fn possible_valences(sym: &str) -> &'static [u8] {
    lookup(sym).map_or(&[], |e| e.valences)
}

/// The valences an element takes with a formal charge.
///
/// A charged main-group atom bonds like the element with the same electron count, so N⁺ takes
/// carbon's valences and O⁻ takes fluorine's. Transition metals have no such rule and get an empty
/// slice, as do shifts that land off the table.
pub fn charged_valences(sym: &str, charge: i8) -> &'static [u8] {
    let Some((num, elem)) = ELEM_DATA.iter().enumerate().skip(1).find(|(_, e)| e.sym == sym) else {
        return &[];
    };
    if charge == 0 {
        return elem.valences;
    }
    if elem.group == Trans {
        return &[];
    }
    let shifted = num as isize - charge as isize;
    match usize::try_from(shifted).ok().and_then(|i| ELEM_DATA.get(i)) {
        Some(e) if e.group != Trans => e.valences,
        _ => &[],
    }
}
