//! A discrete-time, location-aware transmission model for a single pathogen
//! spreading over a fixed contact network.
//!
//! Every person is `Susceptible`, `Infected` or `Infected_Hospitalized`, and
//! is at one of three locations each tick: the community, the hospital or
//! home. Once per tick every person runs the update rule for the state they
//! started the tick in:
//! * Susceptible people move to a random location and may catch the pathogen
//!   from an infected neighbor standing at the same place.
//! * Infected people move to the community or home, and may be hospitalized
//!   or recover.
//! * Hospitalized people stay in hospital, and may recover or be discharged
//!   while still infected.
//!
//! The central object is the `Context`, which owns all model state through
//! data plugins and runs ticks as scheduled plans. Model modules extend it
//! through `Context*Ext` traits:
//! * `people`, `population` and `location` hold identities, disease state and
//!   location for every person.
//! * `network` holds the contact graph and `pathogen` the circulating pathogen.
//! * `parameters` holds the named probabilities the rules read.
//! * `rules`, `neighbor_sampler` and `snapshot` implement one tick of
//!   behavior, and `simulation` drives ticks.
//! * `infection_log` and `summary` record and report the outcome.
//! * `config` and `runner` build a model from a JSON file and command line
//!   arguments.
pub mod config;
pub mod context;
pub mod error;
pub mod hashing;
pub mod infection_log;
pub mod location;
pub mod log;
pub mod neighbor_sampler;
pub mod network;
pub mod parameters;
pub mod pathogen;
pub mod people;
pub mod plan;
pub mod population;
pub mod random;
pub mod rules;
pub mod runner;
pub mod simulation;
pub mod snapshot;
pub mod summary;

// Re-exported for use by `define_rng!`.
pub use rand;

pub mod prelude {
    pub use crate::config::{init_model, ModelConfig, SeedingRng};
    pub use crate::context::Context;
    pub use crate::error::ModelError;
    pub use crate::infection_log::{ContextInfectionLogExt, InfectionEvent};
    pub use crate::location::{ContextLocationExt, Location};
    pub use crate::neighbor_sampler::{ContextInfectorSelectionExt, InfectorSelection};
    pub use crate::network::ContextNetworkExt;
    pub use crate::parameters::{
        ContextParametersExt, DISCHARGE_INFECTED, PROB_HOSPITALIZATION, PROB_RECOVERY,
    };
    pub use crate::pathogen::{ContextPathogenExt, Pathogen};
    pub use crate::people::{ContextPeopleExt, PersonId};
    pub use crate::population::{ContextPopulationExt, DiseaseState};
    pub use crate::random::ContextRandomExt;
    pub use crate::rules::ModelRng;
    pub use crate::simulation::{ContextSimulationExt, TickSummary};
    pub use crate::snapshot::TickSnapshot;
    pub use crate::summary::{format_infection_log, format_model_overview, StateLocationCounts};
    pub use crate::{define_data_plugin, define_rng};
}
