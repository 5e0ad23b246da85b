//! Mixture composition by mole fraction.

use crate::error::{MixtureError, MixtureResult};
use crate::mechanism::Mechanism;
use fsw_core::numeric::{Tolerances, nearly_equal};

/// Composition defined by normalized mole fractions.
///
/// The composition is always normalized (mole fractions sum to 1.0).
/// Species are kept in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    items: Vec<(String, f64)>,
}

impl Composition {
    /// Create a pure-species composition.
    pub fn pure(species: impl Into<String>) -> Self {
        Self {
            items: vec![(species.into(), 1.0)],
        }
    }

    /// Create a composition from mole fractions.
    ///
    /// Validates that all fractions are finite, non-negative, and have a positive sum,
    /// then normalizes to sum=1. Repeated species are merged.
    pub fn new_mole_fractions(fractions: Vec<(String, f64)>) -> MixtureResult<Self> {
        if fractions.is_empty() {
            return Err(MixtureError::NonPhysical {
                what: "empty composition",
            });
        }

        let mut merged: Vec<(String, f64)> = Vec::with_capacity(fractions.len());
        let mut sum = 0.0;
        for (name, frac) in fractions {
            if !frac.is_finite() {
                return Err(MixtureError::NonPhysical {
                    what: "non-finite mole fraction",
                });
            }
            if frac < 0.0 {
                return Err(MixtureError::NonPhysical {
                    what: "negative mole fraction",
                });
            }
            sum += frac;
            match merged.iter_mut().find(|(n, _)| *n == name) {
                Some((_, f)) => *f += frac,
                None => merged.push((name, frac)),
            }
        }

        if sum <= 0.0 || !sum.is_finite() {
            return Err(MixtureError::NonPhysical {
                what: "mole fractions sum to zero or non-finite",
            });
        }

        let normalized: Vec<(String, f64)> = merged
            .into_iter()
            .map(|(s, f)| (s, f / sum))
            .filter(|(_, f)| *f > 1e-15) // Drop negligible species
            .collect();

        if normalized.is_empty() {
            return Err(MixtureError::NonPhysical {
                what: "all mole fractions negligible",
            });
        }

        Ok(Self { items: normalized })
    }

    /// Parse `"O2:1, N2:3.76"`. A bare name counts as amount 1.
    pub fn parse(input: &str) -> MixtureResult<Self> {
        let bad = |reason: &str| MixtureError::Composition {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let mut fractions = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (name, amount) = match part.rsplit_once(':') {
                Some((name, amount)) => {
                    let amount: f64 = amount
                        .trim()
                        .parse()
                        .map_err(|_| bad(&format!("invalid amount in '{}'", part)))?;
                    (name.trim(), amount)
                }
                None => (part, 1.0),
            };
            if name.is_empty() {
                return Err(bad("missing species name"));
            }
            fractions.push((name.to_string(), amount));
        }

        if fractions.is_empty() {
            return Err(bad("no species given"));
        }

        Self::new_mole_fractions(fractions).map_err(|e| bad(&e.to_string()))
    }

    /// Replace each species name with the mechanism's canonical spelling.
    ///
    /// Fails on the first species the mechanism does not define.
    pub fn canonicalize(self, mechanism: &Mechanism) -> MixtureResult<Self> {
        let mut items = Vec::with_capacity(self.items.len());
        for (name, frac) in self.items {
            let species = mechanism.species_by_name(&name)?;
            items.push((species.name().to_string(), frac));
        }
        Self::new_mole_fractions(items)
    }

    /// Get mole fraction of a species (0.0 if not present).
    pub fn mole_fraction(&self, species: &str) -> f64 {
        self.items
            .iter()
            .find(|(s, _)| s == species)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Check if this is a pure-species composition.
    ///
    /// Returns `Some(species)` if exactly one species has fraction ≈1.0.
    pub fn is_pure(&self) -> Option<&str> {
        if self.items.len() == 1 {
            let (species, frac) = &self.items[0];
            let tol = Tolerances {
                abs: 1e-10,
                rel: 1e-10,
            };
            if nearly_equal(*frac, 1.0, tol) {
                return Some(species);
            }
        }
        None
    }

    /// Iterate over all species with non-zero mole fractions.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.items.iter().map(|(s, f)| (s.as_str(), *f))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mixture molar mass [kg/kmol]: M_mix = Σ (x_i * M_i).
    pub fn molar_mass(&self, mechanism: &Mechanism) -> MixtureResult<f64> {
        let mut total = 0.0;
        for (name, frac) in &self.items {
            total += mechanism.species_by_name(name)?.molar_mass() * frac;
        }
        Ok(total)
    }

    /// Oxygen demand per mole of mixture: Σ x_i (2C + H/2 + 2S − O).
    pub fn oxygen_demand(&self, mechanism: &Mechanism) -> MixtureResult<f64> {
        let mut total = 0.0;
        for (name, frac) in &self.items {
            total += mechanism.species_by_name(name)?.oxygen_demand() * frac;
        }
        Ok(total)
    }
}

impl std::fmt::Display for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (name, frac)) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{:.6}", name, frac)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tol() -> Tolerances {
        Tolerances {
            abs: 1e-10,
            rel: 1e-10,
        }
    }

    #[test]
    fn pure_composition() {
        let comp = Composition::pure("O2");
        assert_eq!(comp.is_pure(), Some("O2"));
        assert_eq!(comp.mole_fraction("O2"), 1.0);
        assert_eq!(comp.mole_fraction("N2"), 0.0);
    }

    #[test]
    fn parse_air_string() {
        let comp = Composition::parse("O2:1, N2:3.76").unwrap();
        assert_eq!(comp.len(), 2);
        assert!(nearly_equal(comp.mole_fraction("O2"), 1.0 / 4.76, tol()));
        assert!(nearly_equal(comp.mole_fraction("N2"), 3.76 / 4.76, tol()));
    }

    #[test]
    fn parse_bare_name_is_pure() {
        let comp = Composition::parse("H2").unwrap();
        assert_eq!(comp.is_pure(), Some("H2"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Composition::parse("").is_err());
        assert!(Composition::parse("O2:abc").is_err());
        assert!(Composition::parse(":1").is_err());
        assert!(Composition::parse("O2:-1").is_err());
    }

    #[test]
    fn repeated_species_are_merged() {
        let comp = Composition::parse("N2:1, O2:1, N2:2").unwrap();
        assert_eq!(comp.len(), 2);
        assert!(nearly_equal(comp.mole_fraction("N2"), 0.75, tol()));
    }

    #[test]
    fn mixture_normalization_non_unit_sum() {
        let comp = Composition::new_mole_fractions(vec![
            ("O2".to_string(), 2.0),
            ("N2".to_string(), 8.0),
        ])
        .unwrap();
        assert!(nearly_equal(comp.mole_fraction("O2"), 0.2, tol()));
        assert!(nearly_equal(comp.mole_fraction("N2"), 0.8, tol()));
    }

    #[test]
    fn invalid_zero_sum() {
        let result = Composition::new_mole_fractions(vec![
            ("O2".to_string(), 0.0),
            ("N2".to_string(), 0.0),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_non_finite() {
        let result = Composition::new_mole_fractions(vec![("O2".to_string(), f64::NAN)]);
        assert!(result.is_err());
    }

    #[test]
    fn canonicalize_uses_mechanism_spelling() {
        let mech = Mechanism::gri30();
        let comp = Composition::parse("o2:1, ar:1").unwrap().canonicalize(&mech).unwrap();
        assert!(nearly_equal(comp.mole_fraction("AR"), 0.5, tol()));
        assert!(nearly_equal(comp.mole_fraction("O2"), 0.5, tol()));
    }

    #[test]
    fn canonicalize_rejects_unknown_species() {
        let mech = Mechanism::h2o2();
        let err = Composition::parse("CH4").unwrap().canonicalize(&mech).unwrap_err();
        assert!(matches!(err, MixtureError::UnknownSpecies { .. }));
    }

    #[test]
    fn air_molar_mass() {
        let mech = Mechanism::gri30();
        let air = Composition::parse("O2:1, N2:3.76").unwrap();
        let mw = air.molar_mass(&mech).unwrap();
        assert!((mw - 28.85).abs() < 0.05);
    }
}
