//! Mixture definition errors.

use fsw_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for mixture operations.
pub type MixtureResult<T> = Result<T, MixtureError>;

/// Errors that can occur while resolving species or building a mixture.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MixtureError {
    /// The requested mixture cannot be built (bad φ, T, p or stoichiometry).
    #[error("Invalid mixture spec: {what}")]
    InvalidMixtureSpec { what: String },

    /// Species name not present in the mechanism.
    #[error("Invalid mixture spec: species '{name}' not found in mechanism '{mechanism}'")]
    UnknownSpecies { name: String, mechanism: String },

    /// Malformed composition string.
    #[error("Invalid composition '{input}': {reason}")]
    Composition { input: String, reason: String },

    /// Non-physical values (negative or non-finite mole fractions).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Mechanism dataset could not be read or parsed.
    #[error("Failed to load mechanism {path}: {message}")]
    MechanismLoad { path: PathBuf, message: String },

    /// Unknown built-in mechanism name.
    #[error("Unknown mechanism '{name}'")]
    UnknownMechanism { name: String },
}

impl From<CoreError> for MixtureError {
    fn from(err: CoreError) -> Self {
        MixtureError::InvalidMixtureSpec {
            what: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MixtureError::UnknownSpecies {
            name: "XY".into(),
            mechanism: "gri30".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("XY"));
        assert!(msg.contains("gri30"));
    }

    #[test]
    fn core_error_becomes_invalid_spec() {
        let err: MixtureError = CoreError::InvalidArg { what: "phi" }.into();
        assert!(matches!(err, MixtureError::InvalidMixtureSpec { .. }));
    }
}
