use std::fmt::{self, Debug, Display};
use std::io;

use crate::people::PersonId;
use crate::population::DiseaseState;

/// Provides `ModelError` and maps other errors to
/// convert to a `ModelError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum ModelError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    /// A named parameter is missing, out of `[0, 1]`, or otherwise unusable.
    /// Detected before the first tick runs.
    ConfigurationError(String),
    /// An update rule was handed an agent whose state does not match the
    /// rule. This means a tick observed state written during that same tick.
    InvariantViolation {
        person_id: PersonId,
        expected: DiseaseState,
        found: DiseaseState,
    },
    /// A consistency rule that must hold between ticks was broken: a pathogen
    /// attached to a susceptible person or missing from an infected one, or a
    /// person who stayed hospitalized through a tick but is not at the hospital.
    BoundaryViolation {
        person_id: PersonId,
        reason: String,
    },
    /// Roulette weights that are negative, non-finite, or sum to more than 1.
    SamplingError(String),
    ModelError(String),
}

impl From<io::Error> for ModelError {
    fn from(error: io::Error) -> Self {
        ModelError::IoError(error)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(error: serde_json::Error) -> Self {
        ModelError::JsonError(error)
    }
}

impl From<csv::Error> for ModelError {
    fn from(error: csv::Error) -> Self {
        ModelError::CSVError(error)
    }
}

impl From<String> for ModelError {
    fn from(error: String) -> Self {
        ModelError::ModelError(error)
    }
}

impl From<&str> for ModelError {
    fn from(error: &str) -> Self {
        ModelError::ModelError(error.to_string())
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::IoError(error) => Some(error),
            ModelError::JsonError(error) => Some(error),
            ModelError::CSVError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelError::ConfigurationError(message) => {
                write!(f, "Configuration error: {message}")
            }
            ModelError::InvariantViolation {
                person_id,
                expected,
                found,
            } => write!(
                f,
                "Invariant violation: update rule for {expected} invoked for {person_id} in state {found}"
            ),
            ModelError::BoundaryViolation { person_id, reason } => {
                write!(f, "Invariant violation at tick boundary: {person_id} {reason}")
            }
            ModelError::SamplingError(message) => write!(f, "Sampling error: {message}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}
