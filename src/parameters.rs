//! Named model parameters.
//!
//! Parameters are scalar probabilities looked up by name, e.g.
//! `context.par(PROB_RECOVERY)`. They are stored in insertion order so that
//! printing them is stable. `validate_parameters` must pass before a run starts.
use indexmap::IndexMap;
use log::info;

use crate::context::Context;
use crate::define_data_plugin;
use crate::error::ModelError;
use crate::random::validate_roulette_weights;

pub const PROB_HOSPITALIZATION: &str = "Prob hospitalization";
pub const PROB_RECOVERY: &str = "Prob recovery";
pub const DISCHARGE_INFECTED: &str = "Discharge infected";

/// Parameters every update rule may read.
pub const REQUIRED_PARAMETERS: [&str; 3] = [PROB_HOSPITALIZATION, PROB_RECOVERY, DISCHARGE_INFECTED];

struct ParametersData {
    values: IndexMap<String, f64>,
}

define_data_plugin!(
    ParametersPlugin,
    ParametersData,
    ParametersData {
        values: IndexMap::new()
    }
);

fn check_probability(name: &str, value: f64) -> Result<(), ModelError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ModelError::ConfigurationError(format!(
            "parameter \"{name}\" = {value} is not a probability in [0, 1]"
        )))
    }
}

pub trait ContextParametersExt {
    /// Sets (or replaces) the parameter `name`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::ConfigurationError` if `value` is outside `[0, 1]`.
    fn add_param(&mut self, name: &str, value: f64) -> Result<(), ModelError>;

    /// Looks up the parameter `name`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::ConfigurationError` if it was never set.
    fn par(&self, name: &str) -> Result<f64, ModelError>;

    /// All parameters in insertion order.
    fn get_parameters(&self) -> Vec<(String, f64)>;

    /// Checks that every required parameter is present, every parameter is a
    /// probability, and that the infected rule's outcome weights
    /// (`Prob hospitalization`, `Prob recovery`) sum to at most 1.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::ConfigurationError` for missing or out of range
    /// parameters and `ModelError::SamplingError` for overfull weights.
    fn validate_parameters(&self) -> Result<(), ModelError>;
}

impl ContextParametersExt for Context {
    fn add_param(&mut self, name: &str, value: f64) -> Result<(), ModelError> {
        check_probability(name, value)?;
        self.get_data_container_mut(ParametersPlugin)
            .values
            .insert(name.to_string(), value);
        info!("parameter \"{name}\" = {value}");
        Ok(())
    }

    fn par(&self, name: &str) -> Result<f64, ModelError> {
        self.get_data_container(ParametersPlugin)
            .and_then(|data| data.values.get(name).copied())
            .ok_or_else(|| {
                ModelError::ConfigurationError(format!("parameter \"{name}\" is not set"))
            })
    }

    fn get_parameters(&self) -> Vec<(String, f64)> {
        self.get_data_container(ParametersPlugin)
            .map(|data| {
                data.values
                    .iter()
                    .map(|(name, value)| (name.clone(), *value))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn validate_parameters(&self) -> Result<(), ModelError> {
        for name in REQUIRED_PARAMETERS {
            self.par(name)?;
        }
        for (name, value) in self.get_parameters() {
            check_probability(&name, value)?;
        }
        validate_roulette_weights(&[self.par(PROB_HOSPITALIZATION)?, self.par(PROB_RECOVERY)?])
    }
}
