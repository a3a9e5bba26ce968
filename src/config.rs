//! Model configuration read from a JSON file, and the setup that applies it.
//!
//! ```json
//! {
//!   "ticks": 100,
//!   "random_seed": 1231,
//!   "parameters": {
//!     "Prob hospitalization": 0.1,
//!     "Prob recovery": 0.0,
//!     "Discharge infected": 0.1
//!   },
//!   "pathogen": { "name": "MRSA", "prob_infecting": 0.1, "prob_recovery": 0.0 },
//!   "prevalence": 0.01,
//!   "network": { "population": 1000, "edge_list": "contacts.csv" },
//!   "infector_selection": "sequential"
//! }
//! ```
//!
//! A relative `edge_list` path is resolved against the directory holding the
//! configuration file. `random_seed` is optional; the command line seed wins
//! over it.
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::info;
use serde::Deserialize;

use crate::context::Context;
use crate::define_rng;
use crate::error::ModelError;
use crate::location::ContextLocationExt;
use crate::neighbor_sampler::{ContextInfectorSelectionExt, InfectorSelection};
use crate::network::ContextNetworkExt;
use crate::parameters::ContextParametersExt;
use crate::pathogen::{ContextPathogenExt, Pathogen};
use crate::people::ContextPeopleExt;

// Initial locations and seeded infections draw from their own stream so that
// changing setup does not shift the draws the update rules see.
define_rng!(pub SeedingRng);

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    pub population: usize,
    pub edge_list: PathBuf,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub ticks: usize,
    #[serde(default)]
    pub random_seed: Option<u64>,
    pub parameters: IndexMap<String, f64>,
    pub pathogen: Pathogen,
    pub prevalence: f64,
    pub network: NetworkConfig,
    #[serde(default)]
    pub infector_selection: InfectorSelection,
}

impl ModelConfig {
    /// Reads and parses `path`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError` if the file cannot be read or is not a valid configuration.
    pub fn load(path: &Path) -> Result<ModelConfig, ModelError> {
        info!("loading model configuration from {}", path.display());
        let text = fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        ModelConfig::parse(&text, base_dir)
    }

    /// Parses configuration text, resolving a relative edge list against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::JsonError` for malformed or incomplete JSON.
    pub fn parse(text: &str, base_dir: &Path) -> Result<ModelConfig, ModelError> {
        let mut config: ModelConfig = serde_json::from_str(text)?;
        if config.network.edge_list.is_relative() {
            config.network.edge_list = base_dir.join(&config.network.edge_list);
        }
        Ok(config)
    }
}

/// Builds the initial model in `context` from `config`: parameters, people,
/// contact network, starting locations, the pathogen and its seed infections.
/// The random module must already be initialized.
///
/// # Errors
///
/// Returns the first configuration, parameter, network or seeding error. The
/// context should be discarded in that case.
pub fn init_model(context: &mut Context, config: &ModelConfig) -> Result<(), ModelError> {
    for (name, value) in &config.parameters {
        context.add_param(name, *value)?;
    }
    context.validate_parameters()?;

    context.add_people(config.network.population);
    context.load_edge_list(&config.network.edge_list)?;
    context.initialize_locations(SeedingRng);

    context.add_pathogen(config.pathogen.clone())?;
    context.seed_infections(SeedingRng, config.prevalence)?;
    context.set_infector_selection(config.infector_selection);
    info!(
        "initialized {} people with {} infector selection",
        config.network.population, config.infector_selection
    );
    Ok(())
}
