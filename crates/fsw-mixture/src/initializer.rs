//! Equivalence-ratio mixture initialization.

use crate::composition::Composition;
use crate::error::{MixtureError, MixtureResult};
use crate::mechanism::Mechanism;
use fsw_core::numeric::ensure_positive;
use fsw_core::units::{Density, Pressure, Temperature, constants::GAS_CONSTANT, kg_per_m3};
use std::sync::Arc;

/// Fuel/oxidizer pair plus initial conditions, independent of φ.
#[derive(Debug, Clone, PartialEq)]
pub struct MixtureSpec {
    /// Fuel species name, or a composition string for blended fuels.
    pub fuel: String,
    /// Oxidizer composition string, e.g. `"O2:1, N2:3.76"`.
    pub oxidizer: String,
    pub temperature: Temperature,
    pub pressure: Pressure,
}

impl MixtureSpec {
    pub fn new(
        fuel: impl Into<String>,
        oxidizer: impl Into<String>,
        temperature: Temperature,
        pressure: Pressure,
    ) -> Self {
        Self {
            fuel: fuel.into(),
            oxidizer: oxidizer.into(),
            temperature,
            pressure,
        }
    }
}

/// Unburned reactant state for one sweep run.
///
/// Built once per run and never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct MixtureState {
    fuel: String,
    equivalence_ratio: f64,
    composition: Composition,
    temperature: Temperature,
    pressure: Pressure,
    mechanism: String,
    molar_mass: f64,
}

impl MixtureState {
    /// Primary fuel species (largest fraction of the fuel stream).
    pub fn fuel(&self) -> &str {
        &self.fuel
    }

    pub fn equivalence_ratio(&self) -> f64 {
        self.equivalence_ratio
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    pub fn pressure(&self) -> Pressure {
        self.pressure
    }

    /// Name of the mechanism the composition was resolved against.
    pub fn mechanism(&self) -> &str {
        &self.mechanism
    }

    /// Mean molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        self.molar_mass
    }

    /// Ideal-gas density: ρ = p·M / (R·T).
    pub fn density(&self) -> Density {
        kg_per_m3(self.pressure.value * self.molar_mass / (GAS_CONSTANT * self.temperature.value))
    }
}

/// Build the reactant mixture at equivalence ratio `phi`.
///
/// The oxidizer amount follows from the oxygen balance of complete
/// combustion: `a = −d_fuel / d_ox` moles of oxidizer per mole of fuel at
/// φ = 1, and `X ∝ φ·X_fuel + a·X_ox`.
pub fn build_mixture(
    mechanism: &Mechanism,
    spec: &MixtureSpec,
    phi: f64,
) -> MixtureResult<MixtureState> {
    ensure_positive(phi, "equivalence ratio must be positive and finite")?;
    ensure_positive(
        spec.temperature.value,
        "temperature must be positive and finite",
    )?;
    ensure_positive(spec.pressure.value, "pressure must be positive and finite")?;

    let fuel = Composition::parse(&spec.fuel)?.canonicalize(mechanism)?;
    let oxidizer = Composition::parse(&spec.oxidizer)?.canonicalize(mechanism)?;

    let fuel_demand = fuel.oxygen_demand(mechanism)?;
    if fuel_demand <= 0.0 {
        return Err(MixtureError::InvalidMixtureSpec {
            what: format!("fuel '{}' has no oxygen demand", spec.fuel),
        });
    }
    let oxidizer_demand = oxidizer.oxygen_demand(mechanism)?;
    if oxidizer_demand >= 0.0 {
        return Err(MixtureError::InvalidMixtureSpec {
            what: format!("oxidizer '{}' supplies no oxygen", spec.oxidizer),
        });
    }
    let stoich_ratio = -fuel_demand / oxidizer_demand;

    let mut fractions = Vec::with_capacity(fuel.len() + oxidizer.len());
    fractions.extend(fuel.iter().map(|(s, x)| (s.to_string(), phi * x)));
    fractions.extend(oxidizer.iter().map(|(s, x)| (s.to_string(), stoich_ratio * x)));
    let composition = Composition::new_mole_fractions(fractions)?;
    let molar_mass = composition.molar_mass(mechanism)?;

    let primary_fuel = fuel
        .iter()
        .fold(None::<(&str, f64)>, |best, (s, x)| match best {
            Some((_, bx)) if bx >= x => best,
            _ => Some((s, x)),
        })
        .map(|(s, _)| s.to_string())
        .unwrap_or_default();

    Ok(MixtureState {
        fuel: primary_fuel,
        equivalence_ratio: phi,
        composition,
        temperature: spec.temperature,
        pressure: spec.pressure,
        mechanism: mechanism.name().to_string(),
        molar_mass,
    })
}

/// Mixture factory bound to one mechanism and one fuel/oxidizer specification.
#[derive(Debug, Clone)]
pub struct MixtureInitializer {
    mechanism: Arc<Mechanism>,
    spec: MixtureSpec,
}

impl MixtureInitializer {
    pub fn new(mechanism: Arc<Mechanism>, spec: MixtureSpec) -> Self {
        Self { mechanism, spec }
    }

    pub fn mechanism(&self) -> &Arc<Mechanism> {
        &self.mechanism
    }

    pub fn spec(&self) -> &MixtureSpec {
        &self.spec
    }

    pub fn initialize(&self, phi: f64) -> MixtureResult<MixtureState> {
        build_mixture(&self.mechanism, &self.spec, phi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsw_core::numeric::{Tolerances, nearly_equal};
    use fsw_core::units::{constants::one_atm, k, pa};

    fn h2_air() -> MixtureSpec {
        MixtureSpec::new("H2", "O2:1, N2:3.76", k(300.0), one_atm())
    }

    fn tol() -> Tolerances {
        Tolerances {
            abs: 1e-9,
            rel: 1e-9,
        }
    }

    #[test]
    fn stoichiometric_hydrogen_air() {
        let state = build_mixture(&Mechanism::gri30(), &h2_air(), 1.0).unwrap();
        let comp = state.composition();
        // H2 + 0.5 (O2 + 3.76 N2)
        let total = 1.0 + 0.5 * 4.76;
        assert!(nearly_equal(comp.mole_fraction("H2"), 1.0 / total, tol()));
        assert!(nearly_equal(comp.mole_fraction("O2"), 0.5 / total, tol()));
        assert!(nearly_equal(comp.mole_fraction("N2"), 1.88 / total, tol()));
        assert_eq!(state.fuel(), "H2");
    }

    #[test]
    fn lean_methane_air() {
        let spec = MixtureSpec::new("CH4", "O2:1, N2:3.76", k(300.0), one_atm());
        let state = build_mixture(&Mechanism::gri30(), &spec, 0.5).unwrap();
        let comp = state.composition();
        // CH4 needs 2 O2; at φ=0.5: 0.5 CH4 : 2 O2 : 7.52 N2
        let ratio = comp.mole_fraction("O2") / comp.mole_fraction("CH4");
        assert!(nearly_equal(ratio, 4.0, tol()));
    }

    #[test]
    fn inputs_are_preserved_exactly() {
        let spec = MixtureSpec::new("H2", "O2:1, N2:3.76", k(321.5), pa(2.5e5));
        let state = build_mixture(&Mechanism::gri30(), &spec, 0.8).unwrap();
        assert_eq!(state.temperature().value, 321.5);
        assert_eq!(state.pressure().value, 2.5e5);
        assert_eq!(state.equivalence_ratio(), 0.8);
        assert_eq!(state.mechanism(), "gri30");
    }

    #[test]
    fn reject_non_positive_phi() {
        let mech = Mechanism::gri30();
        for phi in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = build_mixture(&mech, &h2_air(), phi).unwrap_err();
            assert!(matches!(err, MixtureError::InvalidMixtureSpec { .. }), "{phi}");
        }
    }

    #[test]
    fn reject_unknown_fuel() {
        let spec = MixtureSpec::new("C8H18", "O2:1, N2:3.76", k(300.0), one_atm());
        let err = build_mixture(&Mechanism::gri30(), &spec, 1.0).unwrap_err();
        assert!(matches!(err, MixtureError::UnknownSpecies { .. }));
    }

    #[test]
    fn reject_inert_oxidizer() {
        let spec = MixtureSpec::new("H2", "N2", k(300.0), one_atm());
        let err = build_mixture(&Mechanism::gri30(), &spec, 1.0).unwrap_err();
        assert!(matches!(err, MixtureError::InvalidMixtureSpec { .. }));
    }

    #[test]
    fn density_of_air_like_mixture() {
        let state = build_mixture(&Mechanism::gri30(), &h2_air(), 1.0).unwrap();
        // Stoichiometric H2/air at 300 K, 1 atm is about 0.85 kg/m³.
        let rho = state.density().value;
        assert!((rho - 0.85).abs() < 0.02, "rho = {rho}");
    }

    #[test]
    fn initializer_reuses_spec() {
        let init = MixtureInitializer::new(Arc::new(Mechanism::gri30()), h2_air());
        let lean = init.initialize(0.4).unwrap();
        let rich = init.initialize(4.0).unwrap();
        assert!(rich.composition().mole_fraction("H2") > lean.composition().mole_fraction("H2"));
    }
}
