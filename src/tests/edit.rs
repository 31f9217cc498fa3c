use super::*;
use crate::edit::{Hover, Modifiers, Phase};
use crate::valence::Admission;
use std::f64::consts::TAU;

fn find_elem(mol: &Molecule, sym: &str) -> AtomId {
    mol.atoms()
        .find(|(_, a)| a.elem.as_str() == sym)
        .map(|(id, _)| id)
        .unwrap()
}

/// Draw C(0,0)-C(40,0) with the place tool and hand back both atoms and the bond
fn ethane(d: &mut Driver) -> (AtomId, AtomId, BondId) {
    d.ed.select_tool(Tool::PlaceAtom);
    let Some(Edit::AtomPlaced {
        atom,
        bond: Some(bond),
    }) = d.drag((0.0, 0.0), (40.0, 0.0))
    else {
        panic!("expected an atom");
    };
    let (a, b) = d.mol().endpoints(bond).unwrap();
    let first = if a == atom { b } else { a };
    (first, atom, bond)
}

#[test]
fn methane_hydrogens() {
    super::macros::trace_capture!();
    let mut d = Driver::new(EditConfig::new());
    let Edit::AtomPlaced { atom, bond: None } = d.ed.place_atom(Point::new(100.0, 100.0)).unwrap()
    else {
        panic!("expected a lone atom");
    };
    let center = d.mol().atom(atom).unwrap().pos;
    let mut angles = d
        .mol()
        .implicit_hydrogens(atom)
        .into_iter()
        .map(|h| {
            let v = d.mol().atom(h).unwrap().pos - center;
            assert!(approx_eq(v.norm(), 25.0));
            v.y.atan2(v.x).rem_euclid(TAU)
        })
        .collect::<Vec<_>>();
    angles.sort_by(f64::total_cmp);
    assert_eq!(angles.len(), 4);
    for pair in angles.windows(2) {
        assert!(approx_eq(pair[1] - pair[0], TAU / 4.0));
    }
    assert_eq!(d.ed.notation(), "C");
    assert_eq!(d.mol().formula().to_string(), "CH4");
    assert!(d.ed.warnings().is_empty());
    assert_eq!(d.ed.revision(), 1);
}

#[test]
fn chain_by_dragging() {
    let mut d = Driver::new(EditConfig::new());
    let (c0, c1, _) = ethane(&mut d);
    assert_eq!(d.ed.notation(), "CC");
    let Some(Edit::AtomPlaced { atom: c2, .. }) = d.drag((40.0, 0.0), (80.0, 20.0)) else {
        panic!("expected an atom");
    };
    assert_eq!(d.mol().atom(c2).unwrap().pos, Point::new(80.0, 20.0));
    assert_eq!(d.ed.notation(), "CCC");
    assert_eq!(d.mol().formula().to_string(), "C3H8");
    assert_eq!(d.mol().hydrogen_count(c0), 3);
    assert_eq!(d.mol().hydrogen_count(c1), 2);
    assert_eq!(d.mol().hydrogen_count(c2), 3);
    assert!(valence_closed(d.mol()));

    // branching off the middle carbon twice
    d.drag((40.0, 0.0), (40.0, -40.0));
    assert_eq!(d.ed.notation(), "CC(C)C");
    d.drag((40.0, 0.0), (40.0, 40.0));
    assert_eq!(d.mol().heavy_atom_count(), 5);
    assert_eq!(d.mol().hydrogen_count(c1), 0);
    assert_eq!(d.ed.notation(), "CC(C)(C)C");
    assert!(valence_closed(d.mol()));
}

#[test]
fn chain_grown_from_the_middle() {
    let mut d = Driver::new(EditConfig::new());
    d.ed.select_tool(Tool::PlaceAtom);
    let Some(Edit::AtomPlaced { bond: Some(bond), .. }) = d.drag((100.0, 100.0), (140.0, 100.0))
    else {
        panic!("expected an atom");
    };
    let (a, b) = d.mol().endpoints(bond).unwrap();
    let middle = if d.mol().atom(a).unwrap().pos == Point::new(100.0, 100.0) { a } else { b };
    d.drag((100.0, 100.0), (60.0, 100.0));
    assert_eq!(d.mol().heavy_atom_count(), 3);
    assert_eq!(d.mol().neighbors(middle, false).len(), 2);
    assert!(d.mol().heavy_atoms().all(|id| id.index() >= middle.index()));
    assert_eq!(d.ed.notation(), "CCC");
}

#[test]
fn bond_from_empty_space_onto_atom() {
    let mut d = Driver::new(EditConfig::new());
    d.ed.select_element("O").unwrap();
    let Edit::AtomPlaced { atom: o, .. } = d.ed.place_atom(Point::new(0.0, 0.0)).unwrap() else {
        panic!("expected an atom");
    };
    d.ed.select_element("C").unwrap();
    d.ed.select_tool(Tool::PlaceAtom);
    let Some(Edit::AtomPlaced { atom: c, .. }) = d.drag((60.0, 0.0), (2.0, 0.0)) else {
        panic!("expected an atom");
    };
    assert_eq!(d.mol().atom(c).unwrap().pos, Point::new(60.0, 0.0));
    assert!(d.mol().bond_between(o, c).is_some());
    assert_eq!(d.ed.notation(), "OC");
}

#[test]
fn clicks_never_place_atoms() {
    let mut d = Driver::new(EditConfig::new());
    d.ed.select_tool(Tool::PlaceAtom);
    assert_eq!(d.click(0.0, 0.0), None);
    d.down(10.0, 10.0);
    d.moved(12.0, 11.0);
    assert_eq!(d.up(13.0, 12.0), None);
    assert!(d.mol().is_empty());
    assert_eq!(d.ed.revision(), 0);

    // the same holds for a click on an atom
    let (c0, ..) = ethane(&mut d);
    let before = d.mol().atom_count();
    assert_eq!(d.click(0.0, 0.0), None);
    assert_eq!(d.mol().atom_count(), before);
    assert_eq!(d.mol().atom(c0).unwrap().elem, CARBON);
}

#[test]
fn bond_cycling() {
    super::macros::trace_capture!();
    let mut d = Driver::new(EditConfig::new());
    let (c0, c1, bond) = ethane(&mut d);
    d.ed.select_tool(Tool::Select);
    let expected = [
        (BondKind::Single, BondKind::Double, 2, "C=C"),
        (BondKind::Double, BondKind::Triple, 1, "C#C"),
        (BondKind::Triple, BondKind::Single, 3, "CC"),
    ];
    for (from, to, h, notation) in expected {
        assert_eq!(
            d.click(20.0, 0.0),
            Some(Edit::BondCycled { bond, from, to })
        );
        assert_eq!(d.mol().bond(bond), Some(to));
        assert_eq!(d.mol().hydrogen_count(c0), h);
        assert_eq!(d.mol().hydrogen_count(c1), h);
        assert!(valence_closed(d.mol()));
        assert_eq!(d.ed.notation(), notation);
    }
}

#[test]
fn click_after_drag_is_suppressed() {
    let mut d = Driver::new(EditConfig::new());
    let (_, _, bond) = ethane(&mut d);
    d.ed.select_tool(Tool::Select);
    d.down(-20.0, -20.0);
    d.moved(20.0, 0.0);
    assert_eq!(d.up(60.0, 20.0), Some(Edit::SelectionChanged { count: 2 }));
    // still inside the cool-down
    assert_eq!(d.click(20.0, 0.0), None);
    assert_eq!(d.mol().bond(bond), Some(BondKind::Single));
    d.settle();
    assert!(matches!(d.click(20.0, 0.0), Some(Edit::BondCycled { .. })));
}

#[test]
fn box_select_and_group_move() {
    let mut d = Driver::new(EditConfig::new());
    let (c0, c1, _) = ethane(&mut d);
    d.ed.select_tool(Tool::Select);
    let Edit::AtomPlaced { atom: far, .. } = d.ed.place_atom(Point::new(200.0, 0.0)).unwrap() else {
        panic!("expected an atom");
    };

    d.down(-20.0, -20.0);
    assert!(d.ed.scene().select_box.is_none());
    d.moved(20.0, 0.0);
    let area = d.ed.scene().select_box.unwrap();
    assert_eq!(area.min, Point::new(-20.0, -20.0));
    assert_eq!(area.max, Point::new(20.0, 0.0));
    d.moved(60.0, 20.0);
    assert_eq!(d.up(60.0, 20.0), Some(Edit::SelectionChanged { count: 2 }));
    d.settle();
    assert!(d.ed.scene().select_box.is_none());
    assert_eq!(d.ed.selection().iter().copied().collect::<Vec<_>>(), {
        let mut v = vec![c0, c1];
        v.sort();
        v
    });

    // grabbing either selected atom moves both, hydrogens included
    assert_eq!(
        d.drag((40.0, 0.0), (40.0, 30.0)),
        Some(Edit::Moved { count: 8 })
    );
    assert_eq!(d.mol().atom(c0).unwrap().pos, Point::new(0.0, 30.0));
    assert_eq!(d.mol().atom(c1).unwrap().pos, Point::new(40.0, 30.0));
    assert_eq!(d.mol().atom(far).unwrap().pos, Point::new(200.0, 0.0));
    for h in d.mol().implicit_hydrogens(c0) {
        let v = d.mol().atom(h).unwrap().pos - Point::new(0.0, 30.0);
        assert!(approx_eq(v.norm(), 25.0));
    }
    assert_eq!(d.ed.selection().len(), 2);
}

#[test]
fn single_atom_drag() {
    let mut d = Driver::new(EditConfig::new());
    let Edit::AtomPlaced { atom, .. } = d.ed.place_atom(Point::new(0.0, 0.0)).unwrap() else {
        panic!("expected an atom");
    };
    let revision = d.ed.revision();
    assert_eq!(d.down(0.0, 0.0), Some(Edit::SelectionChanged { count: 1 }));
    assert_eq!(d.up(0.0, 0.0), None);
    assert_eq!(
        d.drag((0.0, 0.0), (50.0, 10.0)),
        Some(Edit::Moved { count: 5 })
    );
    assert_eq!(d.mol().atom(atom).unwrap().pos, Point::new(50.0, 10.0));
    assert_eq!(d.ed.selection().len(), 1);
    assert!(d.ed.selection().contains(&atom));
    // moves aren't structural
    assert_eq!(d.ed.revision(), revision);

    // a click on empty space clears the selection
    assert_eq!(d.click(-100.0, -100.0), Some(Edit::SelectionChanged { count: 0 }));
    assert!(d.ed.selection().is_empty());
}

#[test]
fn shift_extends_selection() {
    let mut d = Driver::new(EditConfig::new());
    let Edit::AtomPlaced { atom: a, .. } = d.ed.place_atom(Point::new(0.0, 0.0)).unwrap() else {
        panic!("expected an atom");
    };
    let Edit::AtomPlaced { atom: b, .. } = d.ed.place_atom(Point::new(100.0, 0.0)).unwrap() else {
        panic!("expected an atom");
    };
    d.click(0.0, 0.0);
    let t = d.tick();
    let ev = PointerEvent::down(100.0, 0.0, t).with_modifiers(Modifiers::SHIFT);
    assert_eq!(d.send(ev), Some(Edit::SelectionChanged { count: 2 }));
    d.up(100.0, 0.0);
    assert!(d.ed.selection().contains(&a) && d.ed.selection().contains(&b));
}

#[test]
fn erase_cascades() {
    super::macros::trace_capture!();
    let mut d = Driver::new(EditConfig::new());
    d.ed.import(&TemplateImporter::new(), "CCO").unwrap();
    assert_eq!(d.mol().atom_count(), 9);
    let o = find_elem(d.mol(), "O");
    let o_pos = d.mol().atom(o).unwrap().pos;
    d.ed.select_tool(Tool::Erase);
    assert_eq!(d.click(o_pos.x, o_pos.y), Some(Edit::AtomErased(o)));
    // freed ids get handed out again, so look for the element rather than the id
    assert!(d.mol().atoms().all(|(_, a)| a.elem.as_str() != "O"));
    assert_eq!(d.ed.notation(), "CC");
    assert_eq!(d.mol().atom_count(), 8);
    assert!(valence_closed(d.mol()));

    let heavy = d.mol().heavy_atoms().collect::<Vec<_>>();
    let (a, b) = (
        d.mol().atom(heavy[0]).unwrap().pos,
        d.mol().atom(heavy[1]).unwrap().pos,
    );
    let mid = Point::from((a.coords + b.coords) / 2.0);
    assert!(matches!(d.click(mid.x, mid.y), Some(Edit::BondErased(_))));
    assert_eq!(d.ed.notation(), "C.C");
    assert_eq!(d.mol().atom_count(), 10);

    // drags don't erase
    d.down(a.x, a.y);
    d.moved(a.x + 30.0, a.y);
    assert_eq!(d.up(a.x + 30.0, a.y), None);
    assert_eq!(d.mol().atom_count(), 10);
}

#[test]
fn delete_selection_cascades() {
    let mut d = Driver::new(EditConfig::new());
    let (c0, _, _) = ethane(&mut d);
    d.ed.select_tool(Tool::Select);
    assert_eq!(d.ed.delete_selection().unwrap(), None);
    d.click(40.0, 0.0);
    assert_eq!(
        d.ed.delete_selection().unwrap(),
        Some(Edit::SelectionErased { count: 1 })
    );
    assert_eq!(d.mol().heavy_atoms().collect::<Vec<_>>(), [c0]);
    assert_eq!(d.mol().atom_count(), 5);
    assert_eq!(d.mol().hydrogen_count(c0), 4);
    assert!(d.ed.selection().is_empty());
}

#[test]
fn pan() {
    let mut d = Driver::new(EditConfig::new());
    d.ed.select_tool(Tool::Pan);
    d.down(0.0, 0.0);
    assert_eq!(d.moved(10.0, 2.0), Some(Edit::ViewChanged));
    assert_eq!(d.moved(30.0, 5.0), Some(Edit::ViewChanged));
    assert_eq!(d.up(30.0, 5.0), None);
    assert_eq!(d.ed.view().offset, Vector::new(30.0, 5.0));
    assert_eq!(d.ed.view().to_world(Point::new(30.0, 5.0)), Point::origin());
    assert!(d.mol().is_empty());
}

#[test]
fn wheel_zoom_keeps_anchor() {
    let mut d = Driver::new(EditConfig::new());
    let t = d.tick();
    assert_eq!(d.send(PointerEvent::wheel(100.0, 100.0, 0.0, t)), None);
    assert_eq!(
        d.send(PointerEvent::wheel(100.0, 100.0, -1.0, t)),
        Some(Edit::ViewChanged)
    );
    let view = d.ed.view();
    assert!(approx_eq(view.scale, 1.1));
    assert!(approx_eq(view.offset.x, -10.0) && approx_eq(view.offset.y, -10.0));
    let anchor = view.to_world(Point::new(100.0, 100.0));
    assert!(approx_eq(anchor.x, 100.0) && approx_eq(anchor.y, 100.0));

    for _ in 0..20 {
        d.send(PointerEvent::wheel(100.0, 100.0, -1.0, t));
    }
    assert_eq!(d.ed.view().scale, 2.0);
    assert_eq!(d.send(PointerEvent::wheel(100.0, 100.0, -1.0, t)), None);
    for _ in 0..40 {
        d.send(PointerEvent::wheel(0.0, 0.0, 3.0, t));
    }
    assert_eq!(d.ed.view().scale, 0.2);
}

#[test]
fn non_finite_zoom_is_ignored() {
    let mut d = Driver::new(EditConfig::new());
    let t = d.tick();
    let before = d.ed.view();
    assert_eq!(d.send(PointerEvent::wheel(10.0, 10.0, f64::NAN, t)), None);
    assert_eq!(d.send(PointerEvent::wheel(10.0, 10.0, f64::INFINITY, t)), None);
    assert_eq!(d.send(PointerEvent::wheel(f64::NAN, 10.0, -1.0, t)), None);
    assert!(!d.ed.set_zoom(f64::NAN, Point::origin()));
    assert_eq!(d.ed.view(), before);

    // bounds given backwards still clamp
    let mut d = Driver::new(EditConfig::new().with_scale_range(2.0, 0.5));
    assert!(d.ed.set_zoom(10.0, Point::origin()));
    assert_eq!(d.ed.view().scale, 2.0);
    assert!(d.ed.set_zoom(0.0, Point::origin()));
    assert_eq!(d.ed.view().scale, 0.5);

    let mut d = Driver::new(EditConfig::new().with_scale_range(f64::NAN, 2.0));
    assert!(!d.ed.set_zoom(1.5, Point::origin()));
    assert_eq!(d.ed.view().scale, 1.0);
}

#[test]
fn zoomed_placement() {
    let mut d = Driver::new(EditConfig::new());
    assert!(d.ed.set_zoom(2.0, Point::origin()));
    assert!(!d.ed.set_zoom(5.0, Point::origin()));
    d.ed.select_tool(Tool::PlaceAtom);
    let Some(Edit::AtomPlaced { atom, .. }) = d.drag((0.0, 0.0), (80.0, 0.0)) else {
        panic!("expected an atom");
    };
    assert_eq!(d.mol().atom(atom).unwrap().pos, Point::new(40.0, 0.0));
    // 4 world units is under the threshold, though it's 8 on screen
    d.down(80.0, 0.0);
    assert_eq!(d.up(88.0, 0.0), None);
    assert_eq!(d.mol().heavy_atom_count(), 2);
}

#[test]
fn leave_cancels() {
    let mut d = Driver::new(EditConfig::new());
    d.ed.select_tool(Tool::PlaceAtom);
    d.down(0.0, 0.0);
    d.moved(40.0, 0.0);
    assert_eq!(d.ed.gesture().phase(), Phase::Dragging);
    assert_eq!(
        d.ed.scene().bond_preview,
        Some((Point::origin(), Point::new(40.0, 0.0)))
    );
    let t = d.tick();
    assert_eq!(d.send(PointerEvent::leave(t)), None);
    assert_eq!(d.ed.gesture().phase(), Phase::Idle);
    assert!(d.ed.scene().bond_preview.is_none());
    assert_eq!(d.up(40.0, 0.0), None);
    assert!(d.mol().is_empty());
}

#[test]
fn hover() {
    let mut d = Driver::new(EditConfig::new());
    let (c0, _, bond) = ethane(&mut d);
    d.moved(3.0, 0.0);
    assert_eq!(d.ed.hover(), Some(Hover::Atom(c0)));
    d.moved(20.0, 2.0);
    assert_eq!(d.ed.hover(), Some(Hover::Bond(bond)));
    d.moved(200.0, 200.0);
    assert_eq!(d.ed.hover(), None);
}

#[test]
fn admission_enforced() {
    let mut d = Driver::new(EditConfig::new().with_enforce_admission(true));
    let (c0, c1, bond) = ethane(&mut d);
    for to in [(-40.0, 0.0), (0.0, 40.0), (0.0, -40.0)] {
        assert!(matches!(
            d.drag((0.0, 0.0), to),
            Some(Edit::AtomPlaced { .. })
        ));
    }
    assert_eq!(d.mol().hydrogen_count(c0), 0);
    let atoms = d.mol().atom_count();
    assert_eq!(
        d.drag((0.0, 0.0), (30.0, 30.0)),
        Some(Edit::Rejected(Admission::Rejected {
            atom: c0,
            bonds: 4,
            additional: 1,
        }))
    );
    assert_eq!(d.mol().atom_count(), atoms);

    d.ed.select_tool(Tool::Select);
    assert!(matches!(d.click(20.0, 0.0), Some(Edit::Rejected(_))));
    assert_eq!(d.mol().bond(bond), Some(BondKind::Single));
    assert_eq!(d.mol().hydrogen_count(c1), 3);
}

#[test]
fn admission_off_by_default() {
    let mut d = Driver::new(EditConfig::new());
    let (c0, ..) = ethane(&mut d);
    for to in [(-40.0, 0.0), (0.0, 40.0), (0.0, -40.0), (30.0, 30.0)] {
        assert!(matches!(
            d.drag((0.0, 0.0), to),
            Some(Edit::AtomPlaced { .. })
        ));
    }
    assert_eq!(d.mol().neighbors(c0, false).len(), 5);
    assert!(d.ed.warnings().iter().any(|w| matches!(
        w,
        Warning::ValenceMismatch { atom, bonds: 5, .. } if *atom == c0
    )));
}

#[test]
fn outside_edits_sync() {
    let mut d = Driver::new(EditConfig::new());
    assert!(!d.ed.sync());
    let n = d
        .ed
        .molecule_mut()
        .add_atom(Atom::new(Symbol::new("N").unwrap(), Point::origin()));
    assert!(d.ed.sync());
    assert_eq!(d.mol().hydrogen_count(n), 3);
    assert!(!d.ed.sync());
    d.ed.molecule_mut().atom_mut(n).unwrap().pos = Point::new(5.0, 5.0);
    assert!(!d.ed.sync());
}

#[test]
fn no_hydrogens() {
    let mut d = Driver::new(EditConfig::new().with_hydrogens(false));
    d.ed.place_atom(Point::origin()).unwrap();
    assert_eq!(d.mol().atom_count(), 1);
    assert!(!d.ed.sync());
    assert_eq!(d.ed.notation(), "C");
}

#[test]
fn charge_redoes_hydrogens() {
    let mut d = Driver::new(EditConfig::new());
    d.ed.select_element("N").unwrap();
    let Edit::AtomPlaced { atom, .. } = d.ed.place_atom(Point::origin()).unwrap() else {
        panic!("expected an atom");
    };
    d.ed.set_charge(atom, 1).unwrap();
    assert_eq!(d.mol().atom(atom).unwrap().charge, 1);
    assert_eq!(d.mol().hydrogen_count(atom), 4);
    assert_eq!(d.ed.notation(), "[NH4+]");
    assert!(d.ed.warnings().is_empty());
    d.ed.set_charge(atom, 0).unwrap();
    assert_eq!(d.mol().hydrogen_count(atom), 3);
    assert_eq!(d.ed.notation(), "N");
    assert!(d.ed.set_charge(AtomId::new(99), 1).is_err());
}

#[test]
fn imports() {
    let mut d = Driver::new(EditConfig::new());
    d.ed.place_atom(Point::origin()).unwrap();
    let offline = |_: &str| -> Result<Molecule, ImportError> {
        Err(ImportError::Backend("offline".to_string()))
    };
    assert_eq!(
        d.ed.import(&offline, "CCO"),
        Err(EditError::Import(ImportError::Backend("offline".to_string())))
    );
    assert_eq!(d.mol().atom_count(), 5);
    assert!(matches!(
        d.ed.import(&TemplateImporter::new(), "C(C"),
        Err(EditError::Import(ImportError::Notation(_)))
    ));
    assert_eq!(d.mol().atom_count(), 5);

    assert_eq!(
        d.ed.import(&TemplateImporter::new(), "c1ccccc1"),
        Ok(Edit::Imported { atoms: 6 })
    );
    assert_eq!(d.ed.notation(), "c1ccccc1");
    assert_eq!(d.mol().formula().to_string(), "C6H6");
    assert!(valence_closed(d.mol()));
    assert!(d.ed.warnings().is_empty());
}

#[test]
fn tool_switch_resets() {
    let mut d = Driver::new(EditConfig::new());
    d.ed.place_atom(Point::origin()).unwrap();
    d.click(0.0, 0.0);
    assert_eq!(d.ed.selection().len(), 1);
    d.down(100.0, 100.0);
    d.ed.select_tool(Tool::Erase);
    assert!(d.ed.selection().is_empty());
    assert!(!d.ed.gesture().is_active());
    assert_eq!(d.ed.tool(), Tool::Erase);
    assert!(matches!(
        d.ed.select_element("N1"),
        Err(EditError::InvalidSymbol(_))
    ));
    assert_eq!(d.ed.element(), CARBON);
}
