//! The single circulating pathogen.
//!
//! A `Pathogen` is immutable once registered. Every infected person holds an
//! `Rc` to the same instance, so attaching and detaching it is a reference
//! count change rather than a copy.
use std::rc::Rc;

use log::info;
use serde::Deserialize;

use crate::context::Context;
use crate::define_data_plugin;
use crate::error::ModelError;
use crate::people::{ContextPeopleExt, PersonId};
use crate::population::{ContextPopulationExt, DiseaseState};
use crate::random::{ContextRandomExt, RngId};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pathogen {
    name: String,
    /// State a person enters when infected by seeding rather than by a neighbor.
    #[serde(default = "default_initial_state")]
    initial_state: DiseaseState,
    #[serde(default)]
    prob_infecting: f64,
    #[serde(default)]
    prob_recovery: f64,
}

fn default_initial_state() -> DiseaseState {
    DiseaseState::Infected
}

impl Pathogen {
    #[must_use]
    pub fn new(name: &str) -> Pathogen {
        Pathogen {
            name: name.to_string(),
            initial_state: default_initial_state(),
            prob_infecting: 0.0,
            prob_recovery: 0.0,
        }
    }

    #[must_use]
    pub fn with_initial_state(mut self, initial_state: DiseaseState) -> Pathogen {
        self.initial_state = initial_state;
        self
    }

    #[must_use]
    pub fn with_prob_infecting(mut self, prob_infecting: f64) -> Pathogen {
        self.prob_infecting = prob_infecting;
        self
    }

    #[must_use]
    pub fn with_prob_recovery(mut self, prob_recovery: f64) -> Pathogen {
        self.prob_recovery = prob_recovery;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn initial_state(&self) -> DiseaseState {
        self.initial_state
    }

    #[must_use]
    pub fn prob_infecting(&self) -> f64 {
        self.prob_infecting
    }

    #[must_use]
    pub fn prob_recovery(&self) -> f64 {
        self.prob_recovery
    }

    /// # Errors
    ///
    /// Returns `ModelError::ConfigurationError` if a probability is outside
    /// `[0, 1]` or the initial state is `Susceptible`.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (label, value) in [
            ("prob_infecting", self.prob_infecting),
            ("prob_recovery", self.prob_recovery),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ModelError::ConfigurationError(format!(
                    "pathogen {} has {label} = {value}, outside [0, 1]",
                    self.name
                )));
            }
        }
        if self.initial_state == DiseaseState::Susceptible {
            return Err(ModelError::ConfigurationError(format!(
                "pathogen {} cannot have Susceptible as its initial state",
                self.name
            )));
        }
        Ok(())
    }
}

struct PathogenData {
    circulating: Option<Rc<Pathogen>>,
}

define_data_plugin!(
    PathogenPlugin,
    PathogenData,
    PathogenData { circulating: None }
);

pub trait ContextPathogenExt {
    /// Registers the circulating pathogen. Only one may be registered per context.
    ///
    /// # Errors
    ///
    /// Returns `ModelError` if the pathogen is invalid or one is already registered.
    fn add_pathogen(&mut self, pathogen: Pathogen) -> Result<Rc<Pathogen>, ModelError>;

    fn get_circulating_pathogen(&self) -> Option<Rc<Pathogen>>;

    /// Infects `round(prevalence * population)` distinct people chosen uniformly,
    /// and at least one when `prevalence > 0`. Seeded people enter the pathogen's
    /// initial state. Returns the seeded ids in ascending order.
    ///
    /// # Errors
    ///
    /// Returns `ModelError` if no pathogen is registered or `prevalence` is
    /// outside `[0, 1]`.
    fn seed_infections<R: RngId>(
        &mut self,
        rng_id: R,
        prevalence: f64,
    ) -> Result<Vec<PersonId>, ModelError>;
}

impl ContextPathogenExt for Context {
    fn add_pathogen(&mut self, pathogen: Pathogen) -> Result<Rc<Pathogen>, ModelError> {
        pathogen.validate()?;
        let data_container = self.get_data_container_mut(PathogenPlugin);
        if let Some(existing) = &data_container.circulating {
            return Err(ModelError::ConfigurationError(format!(
                "pathogen {} is already circulating; only one pathogen is supported",
                existing.name()
            )));
        }
        info!("registered pathogen {}", pathogen.name());
        let pathogen = Rc::new(pathogen);
        data_container.circulating = Some(Rc::clone(&pathogen));
        Ok(pathogen)
    }

    fn get_circulating_pathogen(&self) -> Option<Rc<Pathogen>> {
        self.get_data_container(PathogenPlugin)
            .and_then(|data_container| data_container.circulating.clone())
    }

    fn seed_infections<R: RngId>(
        &mut self,
        rng_id: R,
        prevalence: f64,
    ) -> Result<Vec<PersonId>, ModelError> {
        let pathogen = self.get_circulating_pathogen().ok_or_else(|| {
            ModelError::ConfigurationError("no pathogen registered to seed".to_string())
        })?;
        if !(0.0..=1.0).contains(&prevalence) {
            return Err(ModelError::ConfigurationError(format!(
                "seeding prevalence {prevalence} is outside [0, 1]"
            )));
        }

        let population = self.get_current_population();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let mut count = (prevalence * population as f64).round() as usize;
        if prevalence > 0.0 {
            count = count.max(1);
        }
        count = count.min(population);

        let mut candidates: Vec<PersonId> = self.iter_people().collect();
        let mut seeded = Vec::with_capacity(count);
        for _ in 0..count {
            let index = self.sample_range(rng_id, 0..candidates.len());
            seeded.push(candidates.swap_remove(index));
        }
        seeded.sort_unstable();

        for person_id in &seeded {
            self.infect(*person_id, Rc::clone(&pathogen), pathogen.initial_state())?;
        }
        info!(
            "seeded {} of {} people with {}",
            seeded.len(),
            population,
            pathogen.name()
        );
        Ok(seeded)
    }
}
