//! Species definitions.

use crate::element::Element;

/// A species as defined by a mechanism dataset: name plus elemental composition.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesDef {
    name: String,
    atoms: Vec<(Element, f64)>,
}

impl SpeciesDef {
    pub fn new(name: impl Into<String>, atoms: Vec<(Element, f64)>) -> Self {
        Self {
            name: name.into(),
            atoms,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of atoms of `element` in one molecule.
    pub fn atom_count(&self, element: Element) -> f64 {
        self.atoms
            .iter()
            .filter(|(el, _)| *el == element)
            .map(|(_, n)| *n)
            .sum()
    }

    pub fn atoms(&self) -> impl Iterator<Item = (Element, f64)> + '_ {
        self.atoms.iter().copied()
    }

    /// Molar mass [kg/kmol] from element atomic weights.
    pub fn molar_mass(&self) -> f64 {
        self.atoms
            .iter()
            .map(|(el, n)| el.atomic_weight() * n)
            .sum()
    }

    /// O atoms consumed by complete combustion of one molecule.
    ///
    /// Positive for fuels, negative for oxidizers, zero for inerts.
    pub fn oxygen_demand(&self) -> f64 {
        self.atoms
            .iter()
            .map(|(el, n)| el.oxygen_demand() * n)
            .sum()
    }
}
