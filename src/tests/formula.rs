use super::*;

fn imported(notation: &str) -> Molecule {
    let mut mol = TemplateImporter::new().import(notation).unwrap();
    HydrogenEngine::default().reconcile_all(&mut mol);
    mol
}

#[test]
fn hill_order() {
    let ethanol = imported("CCO");
    let formula = ethanol.formula();
    assert_eq!(formula.to_string(), "C2H6O");
    assert_eq!(format!("{formula:#}"), "C₂H₆O");
    assert_eq!(formula.atoms(), 9);
    assert_eq!(formula.count(CARBON), 2);

    // no carbon means plain alphabetical
    assert_eq!(imported("O").formula().to_string(), "H2O");
    assert_eq!(imported("N").formula().to_string(), "H3N");
}

#[test]
fn charges() {
    let ammonium = imported("[NH4+]");
    let formula = ammonium.formula();
    assert_eq!(formula.charge, 1);
    assert_eq!(formula.to_string(), "H4N+");
    assert_eq!(format!("{formula:#}"), "H₄N⁺");

    let mut f = Formula::new();
    f.add_atom(Symbol::new("Fe").unwrap(), 1);
    f.charge = 3;
    assert_eq!(f.to_string(), "Fe+3");
    f.charge = -1;
    assert_eq!(f.to_string(), "Fe-");
}

#[test]
fn sums() {
    let mut f = Formula::new();
    assert!(f.is_empty());
    assert_eq!(f.to_string(), "");
    f.add_atom(CARBON, 0);
    assert!(f.is_empty());
    f += &imported("C").formula();
    f += &imported("O").formula();
    assert_eq!(f.to_string(), "CH6O");
    let water = imported("O");
    let collected = water.atoms().map(|(_, a)| a).collect::<Formula>();
    assert_eq!(collected, water.formula());
}

#[test]
fn mass() {
    let water = imported("O");
    assert!((water.mass() - 18.015).abs() < 0.01);
    assert!((water.formula().mass() - water.mass()).abs() < 1e-3);
    let (unknown, _) = sketch(&[("Xx", 0.0, 0.0)], &[]);
    assert_eq!(unknown.mass(), 0.0);
}
