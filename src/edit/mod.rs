//! The editing state machine.
//!
//! One [`Editor`] owns the molecule, the hydrogen engine, and every bit of interaction state. Pointer
//! events go in one at a time through [`Editor::handle`]; the current tool decides what a click or a
//! drag means, and the [`Gesture`] decides which of the two happened.

pub mod gesture;
pub mod hit;
pub mod input;
pub mod view;

pub use gesture::{Gesture, Phase, Release};
pub use hit::{hit_atom, hit_bond, segment_distance, SelectBox};
pub use input::*;
pub use view::ViewTransform;

use crate::core::*;
use crate::disp::smiles::{generate_smiles, SmilesConfig};
use crate::hydro::{HydroConfig, HydrogenEngine};
use crate::molecule::{BondChange, Molecule};
use crate::parse::{ImportError, NotationImporter};
use crate::utils::Symbol;
use crate::valence::{admit, Admission};
use crate::validate::{validate, ValidateConfig, Warning};
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;
use tracing::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditConfig {
    /// How far (world units) the pointer must travel before a press becomes a drag
    pub drag_threshold: f64,
    /// How long clicks are ignored after a drag ends
    pub click_cooldown: Duration,
    pub atom_radius: f64,
    /// Extra reach around an atom's radius that still counts as a hit
    pub atom_tolerance: f64,
    /// Max distance from a bond's segment that counts as a hit
    pub bond_tolerance: f64,
    /// Scale limits, inclusive
    pub scale_range: (f64, f64),
    /// Fixed scale change per wheel notch
    pub zoom_step: f64,
    /// Refuse bonds that would overfill an atom. Off by default so unfinished sketches can pass
    /// through invalid states.
    pub enforce_admission: bool,
    /// Run the hydrogen engine after structural edits
    pub hydrogens: bool,
}
impl EditConfig {
    pub const fn new() -> Self {
        Self {
            drag_threshold: 5.0,
            click_cooldown: Duration::from_millis(150),
            atom_radius: 10.0,
            atom_tolerance: 4.0,
            bond_tolerance: 6.0,
            scale_range: (0.2, 2.0),
            zoom_step: 0.1,
            enforce_admission: false,
            hydrogens: true,
        }
    }
    pub const fn with_drag_threshold(mut self, threshold: f64) -> Self {
        self.drag_threshold = threshold;
        self
    }
    pub const fn with_click_cooldown(mut self, cooldown: Duration) -> Self {
        self.click_cooldown = cooldown;
        self
    }
    pub const fn with_enforce_admission(mut self, enforce: bool) -> Self {
        self.enforce_admission = enforce;
        self
    }
    pub const fn with_hydrogens(mut self, hydrogens: bool) -> Self {
        self.hydrogens = hydrogens;
        self
    }
    pub const fn with_scale_range(mut self, min: f64, max: f64) -> Self {
        self.scale_range = (min, max);
        self
    }
    pub fn atom_reach(&self) -> f64 {
        self.atom_radius + self.atom_tolerance
    }
}
impl Default for EditConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    #[default]
    Select,
    PlaceAtom,
    Erase,
    Pan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hover {
    Atom(AtomId),
    Bond(BondId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("{0:?} isn't a valid element symbol")]
    InvalidSymbol(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// What an input did, if anything
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// A new atom, and the bond that attached it if there was one
    AtomPlaced { atom: AtomId, bond: Option<BondId> },
    /// A drag between two atoms made or escalated a bond
    Bonded(BondChange),
    BondCycled {
        bond: BondId,
        from: BondKind,
        to: BondKind,
    },
    AtomErased(AtomId),
    BondErased(BondId),
    SelectionErased { count: usize },
    /// Atoms changed position only
    Moved { count: usize },
    SelectionChanged { count: usize },
    ViewChanged,
    /// The admission check refused a bond; nothing changed
    Rejected(Admission),
    Imported { atoms: usize },
}

/// In-flight payload for the current gesture
#[derive(Debug, Clone, Default)]
enum Action {
    #[default]
    None,
    /// Dragging atoms. Every position is `original + (pointer - anchor)`, so nothing accumulates.
    Move {
        anchor: Point,
        originals: Vec<(AtomId, Point)>,
    },
    /// Rubber-band selection, only shown once the gesture is a drag
    Box {
        anchor: Point,
        current: Point,
        active: bool,
    },
    /// Drawing a bond out of `origin`, or out of empty space
    Bond {
        origin: Option<AtomId>,
        preview: Point,
    },
    /// Panning, tracked in screen space against the previous move
    Pan { last: Point },
}

/// Everything a renderer needs to draw a frame
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub molecule: &'a Molecule,
    pub view: ViewTransform,
    pub selection: &'a BTreeSet<AtomId>,
    pub hover: Option<Hover>,
    pub select_box: Option<SelectBox>,
    /// From and to, in world space
    pub bond_preview: Option<(Point, Point)>,
}

#[derive(Debug, Clone)]
pub struct Editor {
    mol: Molecule,
    hydro: HydrogenEngine,
    cfg: EditConfig,
    tool: Tool,
    element: Symbol,
    selection: BTreeSet<AtomId>,
    gesture: Gesture,
    action: Action,
    view: ViewTransform,
    hover: Option<Hover>,
    revision: u64,
}
impl Default for Editor {
    fn default() -> Self {
        Self::new(EditConfig::new())
    }
}
impl Editor {
    pub fn new(cfg: EditConfig) -> Self {
        Self {
            mol: Molecule::new(),
            hydro: HydrogenEngine::default(),
            cfg,
            tool: Tool::Select,
            element: CARBON,
            selection: BTreeSet::new(),
            gesture: Gesture::default(),
            action: Action::None,
            view: ViewTransform::new(),
            hover: None,
            revision: 0,
        }
    }
    pub fn with_hydro_config(mut self, cfg: HydroConfig) -> Self {
        self.hydro.cfg = cfg;
        self
    }

    pub fn molecule(&self) -> &Molecule {
        &self.mol
    }
    /// Direct access to the molecule. Call [`Self::sync`] afterwards if atoms or bonds were added
    /// or removed.
    pub fn molecule_mut(&mut self) -> &mut Molecule {
        &mut self.mol
    }
    pub fn config(&self) -> &EditConfig {
        &self.cfg
    }
    pub fn tool(&self) -> Tool {
        self.tool
    }
    pub fn element(&self) -> Symbol {
        self.element
    }
    pub fn selection(&self) -> &BTreeSet<AtomId> {
        &self.selection
    }
    pub fn view(&self) -> ViewTransform {
        self.view
    }
    pub fn hover(&self) -> Option<Hover> {
        self.hover
    }
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }
    /// Bumped once per completed structural edit
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn select_tool(&mut self, tool: Tool) {
        debug!(?tool, "tool selected");
        self.reset_interaction();
        self.tool = tool;
    }
    /// Pick the element new atoms get. Symbols outside the valence table are allowed and just get
    /// flagged.
    pub fn select_element(&mut self, sym: &str) -> Result<(), EditError> {
        let elem = Symbol::new(sym).ok_or_else(|| EditError::InvalidSymbol(sym.to_string()))?;
        debug!(%elem, "element selected");
        self.reset_interaction();
        self.element = elem;
        Ok(())
    }
    /// Clear selection, hover, and any gesture in progress
    pub fn reset_interaction(&mut self) {
        self.selection.clear();
        self.hover = None;
        self.cancel_gesture();
    }
    /// Keep the world point at `center` (screen space) fixed while setting the scale, as a zoom
    /// slider does
    pub fn set_zoom(&mut self, scale: f64, center: Point) -> bool {
        self.view.zoom_to(center, scale, self.cfg.scale_range)
    }

    pub fn handle(&mut self, ev: PointerEvent) -> Result<Option<Edit>, EditError> {
        match ev.kind {
            PointerKind::Down => Ok(self.pointer_down(ev)),
            PointerKind::Move => Ok(self.pointer_move(ev)),
            PointerKind::Up => self.pointer_up(ev),
            PointerKind::Leave => {
                self.cancel_gesture();
                self.hover = None;
                Ok(None)
            }
            PointerKind::Wheel { delta } => {
                if !delta.is_finite() || delta == 0.0 {
                    return Ok(None);
                }
                let zoomed = self.view.zoom_step(
                    ev.pos,
                    -delta.signum(),
                    self.cfg.zoom_step,
                    self.cfg.scale_range,
                );
                Ok(zoomed.then_some(Edit::ViewChanged))
            }
        }
    }

    fn pointer_down(&mut self, ev: PointerEvent) -> Option<Edit> {
        if self.gesture.is_active() {
            trace!("down without up, dropping the old gesture");
            self.cancel_gesture();
        }
        let world = self.view.to_world(ev.pos);
        self.gesture.down(world, ev.pos);
        self.hover = None;
        match self.tool {
            Tool::Select => {
                if let Some(atom) = hit_atom(&self.mol, world, self.cfg.atom_reach()) {
                    let changed = if ev.modifiers.shift {
                        self.selection.insert(atom)
                    } else if !self.selection.contains(&atom) {
                        self.selection.clear();
                        self.selection.insert(atom)
                    } else {
                        false
                    };
                    self.action = Action::Move {
                        anchor: world,
                        originals: self.drag_set(),
                    };
                    changed.then(|| Edit::SelectionChanged {
                        count: self.selection.len(),
                    })
                } else {
                    self.action = Action::Box {
                        anchor: world,
                        current: world,
                        active: false,
                    };
                    None
                }
            }
            Tool::PlaceAtom => {
                self.action = Action::Bond {
                    origin: hit_atom(&self.mol, world, self.cfg.atom_reach()),
                    preview: world,
                };
                None
            }
            Tool::Erase => None,
            Tool::Pan => {
                self.action = Action::Pan { last: ev.pos };
                None
            }
        }
    }

    fn pointer_move(&mut self, ev: PointerEvent) -> Option<Edit> {
        let world = self.view.to_world(ev.pos);
        if !self.gesture.is_active() {
            self.update_hover(world);
            return None;
        }
        if let Action::Pan { last } = &mut self.action {
            let delta = ev.pos - *last;
            *last = ev.pos;
            self.view.pan_by(delta);
            return Some(Edit::ViewChanged);
        }
        self.gesture.moved(world, self.cfg.drag_threshold);
        if !self.gesture.is_dragging() {
            return None;
        }
        match &mut self.action {
            Action::Move { anchor, originals } => {
                let delta = world - *anchor;
                for (id, orig) in originals.iter() {
                    if let Some(atom) = self.mol.atom_mut(*id) {
                        atom.pos = orig + delta;
                    }
                }
                Some(Edit::Moved {
                    count: originals.len(),
                })
            }
            Action::Box {
                current, active, ..
            } => {
                *current = world;
                *active = true;
                None
            }
            Action::Bond { preview, .. } => {
                *preview = world;
                None
            }
            _ => None,
        }
    }

    fn pointer_up(&mut self, ev: PointerEvent) -> Result<Option<Edit>, EditError> {
        let world = self.view.to_world(ev.pos);
        let release = self.gesture.up(
            world,
            self.cfg.drag_threshold,
            ev.time,
            self.cfg.click_cooldown,
        );
        let action = std::mem::take(&mut self.action);
        trace!(?release, tool = ?self.tool, "pointer up");
        let out = match release {
            Release::Stray | Release::SuppressedClick => None,
            Release::Click => self.click(world, action)?,
            Release::Drag => self.drag_end(world, action)?,
        };
        self.update_hover(world);
        Ok(out)
    }

    fn click(&mut self, world: Point, action: Action) -> Result<Option<Edit>, EditError> {
        match self.tool {
            Tool::Select => {
                // a press on an atom already settled the selection
                if let Action::Move { .. } = action {
                    return Ok(None);
                }
                if let Some(bond) = hit_bond(&self.mol, world, self.cfg.bond_tolerance) {
                    self.cycle_bond(bond)
                } else if !self.selection.is_empty() {
                    self.selection.clear();
                    Ok(Some(Edit::SelectionChanged { count: 0 }))
                } else {
                    Ok(None)
                }
            }
            // jittery clicks shouldn't leave stray atoms behind
            Tool::PlaceAtom => Ok(None),
            Tool::Erase => self.erase_at(world),
            Tool::Pan => Ok(None),
        }
    }

    fn drag_end(&mut self, world: Point, action: Action) -> Result<Option<Edit>, EditError> {
        match action {
            Action::Move { anchor, originals } => {
                let delta = world - anchor;
                for (id, orig) in &originals {
                    if let Some(atom) = self.mol.atom_mut(*id) {
                        atom.pos = orig + delta;
                    }
                }
                debug!(count = originals.len(), dx = delta.x, dy = delta.y, "moved atoms");
                Ok(Some(Edit::Moved {
                    count: originals.len(),
                }))
            }
            Action::Box { anchor, .. } => {
                let area = SelectBox::new(anchor, world);
                self.selection = area.atoms_within(&self.mol).collect();
                Ok(Some(Edit::SelectionChanged {
                    count: self.selection.len(),
                }))
            }
            Action::Bond { origin, .. } => self.finish_bond(origin, world),
            Action::Pan { .. } | Action::None => Ok(None),
        }
    }

    /// Selected atoms plus the implicit hydrogens riding along with them
    fn drag_set(&self) -> Vec<(AtomId, Point)> {
        let mut out = Vec::with_capacity(self.selection.len());
        for &id in &self.selection {
            let Some(atom) = self.mol.atom(id) else {
                continue;
            };
            out.push((id, atom.pos));
            for h in self.mol.implicit_hydrogens(id) {
                if let Some(h_atom) = self.mol.atom(h) {
                    out.push((h, h_atom.pos));
                }
            }
        }
        out
    }

    fn finish_bond(
        &mut self,
        origin: Option<AtomId>,
        world: Point,
    ) -> Result<Option<Edit>, EditError> {
        let target = hit_atom(&self.mol, world, self.cfg.atom_reach());
        match (origin, target) {
            (Some(o), Some(t)) if o == t => Ok(None),
            (Some(o), Some(t)) => self.bond_atoms(o, t),
            (Some(o), None) => self.grow_from(o, world),
            (None, Some(t)) => {
                let start = self.gesture.start();
                self.grow_from(t, start)
            }
            (None, None) => {
                let start = self.gesture.start();
                let first = self.mol.add_atom(Atom::new(self.element, start));
                let atom = self.mol.add_atom(Atom::new(self.element, world));
                let change = self.mol.add_bond(first, atom, BondKind::Single)?;
                self.structural_change([first, atom]);
                Ok(Some(Edit::AtomPlaced {
                    atom,
                    bond: Some(change.id()),
                }))
            }
        }
    }

    fn bond_atoms(&mut self, a: AtomId, b: AtomId) -> Result<Option<Edit>, EditError> {
        let additional = match self.mol.bond_between(a, b) {
            Some(id) => {
                let kind = self.mol.bond(id).ok_or(GraphError::MissingBond(id))?;
                kind.cycled().order().saturating_sub(kind.order())
            }
            None => 1,
        };
        if let Some(rejected) = self.check_admission(a, b, additional) {
            return Ok(Some(rejected));
        }
        let change = self.mol.add_bond(a, b, BondKind::Single)?;
        self.structural_change([a, b]);
        Ok(Some(Edit::Bonded(change)))
    }

    fn grow_from(&mut self, origin: AtomId, at: Point) -> Result<Option<Edit>, EditError> {
        if let Some(rejected) = self.check_admission(origin, origin, 1) {
            return Ok(Some(rejected));
        }
        let atom = self.mol.add_atom(Atom::new(self.element, at));
        let change = self.mol.add_bond(origin, atom, BondKind::Single)?;
        self.structural_change([origin, atom]);
        Ok(Some(Edit::AtomPlaced {
            atom,
            bond: Some(change.id()),
        }))
    }

    fn cycle_bond(&mut self, bond: BondId) -> Result<Option<Edit>, EditError> {
        let from = self.mol.bond(bond).ok_or(GraphError::MissingBond(bond))?;
        let (a, b) = self
            .mol
            .endpoints(bond)
            .ok_or(GraphError::MissingBond(bond))?;
        let to = from.cycled();
        let additional = to.order().saturating_sub(from.order());
        if let Some(rejected) = self.check_admission(a, b, additional) {
            return Ok(Some(rejected));
        }
        self.mol.retype_bond(bond, to)?;
        self.structural_change([a, b]);
        Ok(Some(Edit::BondCycled { bond, from, to }))
    }

    fn check_admission(&self, a: AtomId, b: AtomId, additional: u8) -> Option<Edit> {
        if !self.cfg.enforce_admission || additional == 0 {
            return None;
        }
        let verdict = admit(&self.mol, a, b, additional);
        (!verdict.is_accepted()).then(|| {
            debug!(%verdict, "edit refused");
            Edit::Rejected(verdict)
        })
    }

    fn erase_at(&mut self, world: Point) -> Result<Option<Edit>, EditError> {
        if let Some(atom) = hit_atom(&self.mol, world, self.cfg.atom_reach()) {
            let survivors = self.detach_atom(atom)?;
            self.structural_change(survivors);
            Ok(Some(Edit::AtomErased(atom)))
        } else if let Some(bond) = hit_bond(&self.mol, world, self.cfg.bond_tolerance) {
            let (a, b, _) = self.mol.remove_bond(bond)?;
            self.structural_change([a, b]);
            Ok(Some(Edit::BondErased(bond)))
        } else {
            Ok(None)
        }
    }

    /// Remove an atom and its leaf hydrogens without reconciling, returning the neighbors that
    /// are left
    fn detach_atom(&mut self, id: AtomId) -> Result<Vec<AtomId>, EditError> {
        let mut survivors = Vec::new();
        for n in self.mol.neighbors(id, true) {
            let leaf_h = self
                .mol
                .atom(n)
                .is_some_and(|a| a.is_hydrogen() && self.mol.degree(n) == 1);
            if leaf_h {
                self.mol.remove_atom(n)?;
            } else {
                survivors.push(n);
            }
        }
        self.mol.remove_atom(id)?;
        self.selection.remove(&id);
        Ok(survivors)
    }

    /// Erase every selected atom, with the same cascade as the erase tool
    pub fn delete_selection(&mut self) -> Result<Option<Edit>, EditError> {
        if self.selection.is_empty() {
            return Ok(None);
        }
        let doomed = std::mem::take(&mut self.selection);
        let mut survivors = Vec::new();
        for &id in &doomed {
            if self.mol.contains_atom(id) {
                survivors.extend(self.detach_atom(id)?);
            }
        }
        survivors.retain(|id| self.mol.contains_atom(*id));
        self.cancel_gesture();
        self.structural_change(survivors);
        Ok(Some(Edit::SelectionErased {
            count: doomed.len(),
        }))
    }

    /// Drop a lone atom of the current element at a world position
    pub fn place_atom(&mut self, at: Point) -> Result<Edit, EditError> {
        let atom = self.mol.add_atom(Atom::new(self.element, at));
        self.structural_change([atom]);
        Ok(Edit::AtomPlaced { atom, bond: None })
    }

    /// Set an atom's formal charge and redo its hydrogens
    pub fn set_charge(&mut self, id: AtomId, charge: i8) -> Result<(), EditError> {
        let atom = self.mol.atom_mut(id).ok_or(GraphError::MissingAtom(id))?;
        atom.charge = charge;
        self.structural_change([id]);
        Ok(())
    }

    /// Replace the sketch with whatever the importer makes of `notation`
    pub fn import<I: NotationImporter + ?Sized>(
        &mut self,
        importer: &I,
        notation: &str,
    ) -> Result<Edit, EditError> {
        let mol = importer.import(notation)?;
        Ok(self.load(mol))
    }
    /// Replace the sketch with `mol` and complete every heavy atom
    pub fn load(&mut self, mol: Molecule) -> Edit {
        self.reset_interaction();
        self.mol = mol;
        if self.cfg.hydrogens {
            self.hydro.reconcile_all(&mut self.mol);
        } else {
            self.hydro.acknowledge(&self.mol);
        }
        self.revision += 1;
        info!(atoms = self.mol.atom_count(), "loaded molecule");
        Edit::Imported {
            atoms: self.mol.heavy_atom_count(),
        }
    }
    /// Catch up with atoms or bonds added or removed through [`Self::molecule_mut`]. Returns
    /// whether anything needed doing.
    pub fn sync(&mut self) -> bool {
        if !self.hydro.needs_sync(&self.mol) {
            return false;
        }
        debug!("structure changed outside the editor");
        self.selection.retain(|id| self.mol.contains_atom(*id));
        if self.cfg.hydrogens {
            self.hydro.reconcile_all(&mut self.mol);
        } else {
            self.hydro.acknowledge(&self.mol);
        }
        self.revision += 1;
        true
    }

    /// The line notation for the current sketch
    pub fn notation(&self) -> String {
        generate_smiles(&self.mol, SmilesConfig::new())
    }
    pub fn warnings(&self) -> Vec<Warning> {
        validate(
            &self.mol,
            &ValidateConfig::new().with_overlap_distance(self.cfg.atom_radius),
        )
    }
    pub fn scene(&self) -> Scene<'_> {
        let select_box = match self.action {
            Action::Box {
                anchor,
                current,
                active: true,
            } => Some(SelectBox::new(anchor, current)),
            _ => None,
        };
        let bond_preview = match self.action {
            Action::Bond { origin, preview } if self.gesture.is_dragging() => {
                let from = origin
                    .and_then(|o| self.mol.atom(o))
                    .map_or(self.gesture.start(), |a| a.pos);
                Some((from, preview))
            }
            _ => None,
        };
        Scene {
            molecule: &self.mol,
            view: self.view,
            selection: &self.selection,
            hover: self.hover,
            select_box,
            bond_preview,
        }
    }

    fn structural_change<I: IntoIterator<Item = AtomId>>(&mut self, affected: I) {
        if self.cfg.hydrogens {
            self.hydro.reconcile(&mut self.mol, affected);
        } else {
            self.hydro.acknowledge(&self.mol);
        }
        self.selection.retain(|id| self.mol.contains_atom(*id));
        self.revision += 1;
    }

    fn cancel_gesture(&mut self) {
        self.gesture.reset();
        self.action = Action::None;
    }

    fn update_hover(&mut self, world: Point) {
        self.hover = hit_atom(&self.mol, world, self.cfg.atom_reach())
            .map(Hover::Atom)
            .or_else(|| hit_bond(&self.mol, world, self.cfg.bond_tolerance).map(Hover::Bond));
    }
}
