//! Reaction-mechanism species datasets.
//!
//! Only the species table is consumed here: names and elemental composition,
//! which is what mixture initialization and mechanism checks need. Thermo and
//! kinetic data stay with the external solver.

use crate::element::Element;
use crate::error::{MixtureError, MixtureResult};
use crate::species::SpeciesDef;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

type AtomTable = &'static [(Element, f64)];

use Element::{Ar, C, H, N, O};

const H2O2_SPECIES: &[(&str, AtomTable)] = &[
    ("H2", &[(H, 2.0)]),
    ("H", &[(H, 1.0)]),
    ("O", &[(O, 1.0)]),
    ("O2", &[(O, 2.0)]),
    ("OH", &[(O, 1.0), (H, 1.0)]),
    ("H2O", &[(H, 2.0), (O, 1.0)]),
    ("HO2", &[(H, 1.0), (O, 2.0)]),
    ("H2O2", &[(H, 2.0), (O, 2.0)]),
    ("AR", &[(Ar, 1.0)]),
    ("N2", &[(N, 2.0)]),
];

const GRI30_SPECIES: &[(&str, AtomTable)] = &[
    ("H2", &[(H, 2.0)]),
    ("H", &[(H, 1.0)]),
    ("O", &[(O, 1.0)]),
    ("O2", &[(O, 2.0)]),
    ("OH", &[(O, 1.0), (H, 1.0)]),
    ("H2O", &[(H, 2.0), (O, 1.0)]),
    ("HO2", &[(H, 1.0), (O, 2.0)]),
    ("H2O2", &[(H, 2.0), (O, 2.0)]),
    ("C", &[(C, 1.0)]),
    ("CH", &[(C, 1.0), (H, 1.0)]),
    ("CH2", &[(C, 1.0), (H, 2.0)]),
    ("CH2(S)", &[(C, 1.0), (H, 2.0)]),
    ("CH3", &[(C, 1.0), (H, 3.0)]),
    ("CH4", &[(C, 1.0), (H, 4.0)]),
    ("CO", &[(C, 1.0), (O, 1.0)]),
    ("CO2", &[(C, 1.0), (O, 2.0)]),
    ("HCO", &[(H, 1.0), (C, 1.0), (O, 1.0)]),
    ("CH2O", &[(H, 2.0), (C, 1.0), (O, 1.0)]),
    ("CH2OH", &[(C, 1.0), (H, 3.0), (O, 1.0)]),
    ("CH3O", &[(C, 1.0), (H, 3.0), (O, 1.0)]),
    ("CH3OH", &[(C, 1.0), (H, 4.0), (O, 1.0)]),
    ("C2H", &[(C, 2.0), (H, 1.0)]),
    ("C2H2", &[(C, 2.0), (H, 2.0)]),
    ("C2H3", &[(C, 2.0), (H, 3.0)]),
    ("C2H4", &[(C, 2.0), (H, 4.0)]),
    ("C2H5", &[(C, 2.0), (H, 5.0)]),
    ("C2H6", &[(C, 2.0), (H, 6.0)]),
    ("HCCO", &[(H, 1.0), (C, 2.0), (O, 1.0)]),
    ("CH2CO", &[(C, 2.0), (H, 2.0), (O, 1.0)]),
    ("HCCOH", &[(C, 2.0), (O, 1.0), (H, 2.0)]),
    ("N", &[(N, 1.0)]),
    ("NH", &[(N, 1.0), (H, 1.0)]),
    ("NH2", &[(N, 1.0), (H, 2.0)]),
    ("NH3", &[(N, 1.0), (H, 3.0)]),
    ("NNH", &[(N, 2.0), (H, 1.0)]),
    ("NO", &[(N, 1.0), (O, 1.0)]),
    ("NO2", &[(N, 1.0), (O, 2.0)]),
    ("N2O", &[(N, 2.0), (O, 1.0)]),
    ("HNO", &[(H, 1.0), (N, 1.0), (O, 1.0)]),
    ("CN", &[(C, 1.0), (N, 1.0)]),
    ("HCN", &[(H, 1.0), (C, 1.0), (N, 1.0)]),
    ("H2CN", &[(H, 2.0), (C, 1.0), (N, 1.0)]),
    ("HCNN", &[(C, 1.0), (N, 2.0), (H, 1.0)]),
    ("HCNO", &[(H, 1.0), (N, 1.0), (C, 1.0), (O, 1.0)]),
    ("HOCN", &[(H, 1.0), (N, 1.0), (C, 1.0), (O, 1.0)]),
    ("HNCO", &[(H, 1.0), (N, 1.0), (C, 1.0), (O, 1.0)]),
    ("NCO", &[(N, 1.0), (C, 1.0), (O, 1.0)]),
    ("N2", &[(N, 2.0)]),
    ("AR", &[(Ar, 1.0)]),
    ("C3H7", &[(C, 3.0), (H, 7.0)]),
    ("C3H8", &[(C, 3.0), (H, 8.0)]),
    ("CH2CHO", &[(O, 1.0), (H, 3.0), (C, 2.0)]),
    ("CH3CHO", &[(O, 1.0), (H, 4.0), (C, 2.0)]),
];

/// Names accepted by [`Mechanism::builtin`].
pub const BUILTIN_MECHANISMS: [&str; 2] = ["gri30", "h2o2"];

/// A named species table.
#[derive(Debug, Clone, PartialEq)]
pub struct Mechanism {
    name: String,
    species: Vec<SpeciesDef>,
}

#[derive(Debug, Deserialize)]
struct MechanismFile {
    #[serde(default)]
    phases: Vec<PhaseEntry>,
    species: Vec<SpeciesEntry>,
}

#[derive(Debug, Deserialize)]
struct PhaseEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpeciesEntry {
    name: String,
    composition: BTreeMap<String, f64>,
}

impl Mechanism {
    pub fn new(name: impl Into<String>, species: Vec<SpeciesDef>) -> Self {
        Self {
            name: name.into(),
            species,
        }
    }

    /// GRI-Mech 3.0 species set (53 species).
    pub fn gri30() -> Self {
        Self::from_table("gri30", GRI30_SPECIES)
    }

    /// Hydrogen/oxygen species set with N2 and AR diluents.
    pub fn h2o2() -> Self {
        Self::from_table("h2o2", H2O2_SPECIES)
    }

    pub fn builtin(name: &str) -> MixtureResult<Self> {
        let key = name.trim().trim_end_matches(".yaml").to_lowercase();
        match key.as_str() {
            "gri30" => Ok(Self::gri30()),
            "h2o2" => Ok(Self::h2o2()),
            _ => Err(MixtureError::UnknownMechanism {
                name: name.to_string(),
            }),
        }
    }

    /// Resolve a mechanism reference: a built-in name or a path to a YAML file.
    pub fn resolve_reference(reference: &str, base_dir: Option<&Path>) -> MixtureResult<Self> {
        if let Ok(mech) = Self::builtin(reference) {
            return Ok(mech);
        }
        let path = Path::new(reference);
        let path = match base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };
        if path.exists() {
            Self::load_yaml(&path)
        } else {
            Err(MixtureError::UnknownMechanism {
                name: reference.to_string(),
            })
        }
    }

    /// Load the species section of a Cantera-style YAML mechanism.
    pub fn load_yaml(path: &Path) -> MixtureResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MixtureError::MechanismLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "mechanism".to_string());
        Self::from_yaml_str(&content, &fallback).map_err(|e| match e {
            MixtureError::MechanismLoad { message, .. } => MixtureError::MechanismLoad {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_yaml_str(content: &str, fallback_name: &str) -> MixtureResult<Self> {
        let file: MechanismFile =
            serde_yaml::from_str(content).map_err(|e| MixtureError::MechanismLoad {
                path: fallback_name.into(),
                message: e.to_string(),
            })?;

        let mut species = Vec::with_capacity(file.species.len());
        for entry in file.species {
            let mut atoms = Vec::with_capacity(entry.composition.len());
            for (symbol, count) in entry.composition {
                let element: Element =
                    symbol
                        .parse()
                        .map_err(|_| MixtureError::MechanismLoad {
                            path: fallback_name.into(),
                            message: format!(
                                "species '{}' uses unsupported element '{}'",
                                entry.name, symbol
                            ),
                        })?;
                atoms.push((element, count));
            }
            species.push(SpeciesDef::new(entry.name, atoms));
        }

        let name = file
            .phases
            .first()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| fallback_name.to_string());
        Ok(Self::new(name, species))
    }

    fn from_table(name: &str, table: &[(&str, AtomTable)]) -> Self {
        let species = table
            .iter()
            .map(|(species, atoms)| SpeciesDef::new(*species, atoms.to_vec()))
            .collect();
        Self::new(name, species)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn species(&self) -> &[SpeciesDef] {
        &self.species
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Look up a species by name. Exact match first, then case-insensitive.
    pub fn find(&self, name: &str) -> Option<&SpeciesDef> {
        let name = name.trim();
        self.species
            .iter()
            .find(|s| s.name() == name)
            .or_else(|| {
                self.species
                    .iter()
                    .find(|s| s.name().eq_ignore_ascii_case(name))
            })
    }

    pub fn species_by_name(&self, name: &str) -> MixtureResult<&SpeciesDef> {
        self.find(name).ok_or_else(|| MixtureError::UnknownSpecies {
            name: name.trim().to_string(),
            mechanism: self.name.clone(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gri30_has_53_species() {
        let mech = Mechanism::gri30();
        assert_eq!(mech.len(), 53);
        assert_eq!(mech.name(), "gri30");
        assert!(mech.contains("CH2(S)"));
    }

    #[test]
    fn lookup_is_case_insensitive_fallback() {
        let mech = Mechanism::gri30();
        assert_eq!(mech.find("ar").unwrap().name(), "AR");
        assert_eq!(mech.find(" H2 ").unwrap().name(), "H2");
        assert!(mech.find("C8H18").is_none());
    }

    #[test]
    fn unknown_species_error_names_mechanism() {
        let mech = Mechanism::h2o2();
        let err = mech.species_by_name("CH4").unwrap_err();
        assert_eq!(
            err,
            MixtureError::UnknownSpecies {
                name: "CH4".into(),
                mechanism: "h2o2".into()
            }
        );
    }

    #[test]
    fn builtin_accepts_yaml_suffix() {
        assert_eq!(Mechanism::builtin("gri30.yaml").unwrap().name(), "gri30");
        assert!(Mechanism::builtin("nope").is_err());
    }

    #[test]
    fn parse_cantera_species_section() {
        let yaml = r#"
phases:
- name: tiny
  thermo: ideal-gas
species:
- name: H2
  composition: {H: 2}
  thermo: {model: NASA7}
- name: O2
  composition: {O: 2}
- name: N2
  composition: {N: 2}
"#;
        let mech = Mechanism::from_yaml_str(yaml, "fallback").unwrap();
        assert_eq!(mech.name(), "tiny");
        assert_eq!(mech.len(), 3);
        assert_eq!(mech.find("O2").unwrap().oxygen_demand(), -2.0);
    }

    #[test]
    fn reject_unsupported_element() {
        let yaml = "species:\n- name: XeF2\n  composition: {Xe: 1, F: 2}\n";
        let err = Mechanism::from_yaml_str(yaml, "bad").unwrap_err();
        assert!(matches!(err, MixtureError::MechanismLoad { .. }));
    }
}
