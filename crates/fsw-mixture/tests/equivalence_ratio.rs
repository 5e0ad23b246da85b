use fsw_core::numeric::{Tolerances, nearly_equal};
use fsw_core::units::{constants::one_atm, k};
use fsw_mixture::*;
use proptest::prelude::*;

fn spec(fuel: &str) -> MixtureSpec {
    MixtureSpec::new(fuel, "O2:1, N2:3.76", k(300.0), one_atm())
}

proptest! {
    #[test]
    fn mole_fractions_sum_to_one(phi in 0.01_f64..20.0, fuel_idx in 0usize..4) {
        let fuels = ["H2", "CH4", "C3H8", "H2:0.5, CH4:0.5"];
        let mech = Mechanism::gri30();
        let state = build_mixture(&mech, &spec(fuels[fuel_idx]), phi).unwrap();
        let sum: f64 = state.composition().iter().map(|(_, x)| x).sum();
        let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
        prop_assert!(nearly_equal(sum, 1.0, tol), "sum = {}", sum);
        prop_assert!(state.composition().iter().all(|(_, x)| x > 0.0));
    }

    #[test]
    fn fuel_to_oxygen_ratio_scales_with_phi(phi in 0.05_f64..10.0) {
        let mech = Mechanism::gri30();
        let state = build_mixture(&mech, &spec("H2"), phi).unwrap();
        let comp = state.composition();
        // H2 + 0.5 O2 at φ = 1, so X_H2 / X_O2 = 2φ.
        let ratio = comp.mole_fraction("H2") / comp.mole_fraction("O2");
        let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
        prop_assert!(nearly_equal(ratio, 2.0 * phi, tol), "ratio = {}, phi = {}", ratio, phi);
    }
}

#[test]
fn blended_fuel_reports_dominant_species() {
    let mech = Mechanism::gri30();
    let state = build_mixture(&mech, &spec("H2:0.3, CH4:0.7"), 1.0).unwrap();
    assert_eq!(state.fuel(), "CH4");
    assert!(state.composition().mole_fraction("H2") > 0.0);
}

#[test]
fn mechanism_from_yaml_file() {
    let dir = std::env::temp_dir().join("fsw_mixture_mech_test");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("tiny.yaml");
    std::fs::write(
        &path,
        "species:\n- name: H2\n  composition: {H: 2}\n- name: O2\n  composition: {O: 2}\n- name: N2\n  composition: {N: 2}\n",
    )
    .unwrap();

    let mech = Mechanism::resolve_reference("tiny.yaml", Some(&dir)).unwrap();
    assert_eq!(mech.name(), "tiny");
    let state = build_mixture(&mech, &spec("H2"), 1.0).unwrap();
    assert_eq!(state.mechanism(), "tiny");

    let missing = build_mixture(&mech, &spec("CH4"), 1.0).unwrap_err();
    assert!(matches!(missing, MixtureError::UnknownSpecies { .. }));
}

#[test]
fn unknown_mechanism_reference() {
    let err = Mechanism::resolve_reference("no_such_mech.yaml", None).unwrap_err();
    assert!(matches!(err, MixtureError::UnknownMechanism { .. }));
}
