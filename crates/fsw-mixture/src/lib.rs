//! fsw-mixture: premixed reactant definitions for flamesweep.
//!
//! Provides:
//! - Element table (atomic weights, oxygen demand)
//! - Species definitions with elemental composition
//! - Mechanism datasets (built-in GRI-Mech 3.0 / H2-O2 tables, Cantera-style YAML)
//! - Composition handling (normalized mole fractions, `"O2:1, N2:3.76"` strings)
//! - Equivalence-ratio mixture initialization
//!
//! # Example
//!
//! ```no_run
//! use fsw_core::units::{constants::one_atm, k};
//! use fsw_mixture::{Mechanism, MixtureSpec, build_mixture};
//!
//! let mech = Mechanism::gri30();
//! let spec = MixtureSpec::new("H2", "O2:1, N2:3.76", k(300.0), one_atm());
//! let state = build_mixture(&mech, &spec, 1.0).unwrap();
//! println!("X_H2 = {:.4}", state.composition().mole_fraction("H2"));
//! ```

pub mod composition;
pub mod element;
pub mod error;
pub mod initializer;
pub mod mechanism;
pub mod species;

pub use composition::Composition;
pub use element::Element;
pub use error::{MixtureError, MixtureResult};
pub use initializer::{MixtureInitializer, MixtureSpec, MixtureState, build_mixture};
pub use mechanism::Mechanism;
pub use species::SpeciesDef;
