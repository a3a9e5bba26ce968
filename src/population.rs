//! Disease state and pathogen attachment for every person.
//!
//! The mutators keep one invariant: a person carries a pathogen exactly when
//! their state is not `Susceptible`. Callers change state through `infect`,
//! `clear_infection` and `set_disease_state`, which refuse any change that
//! would break it.
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter};

use crate::context::Context;
use crate::define_data_plugin;
use crate::error::ModelError;
use crate::pathogen::Pathogen;
use crate::people::PersonId;

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    EnumIter,
    EnumCount,
)]
pub enum DiseaseState {
    #[default]
    Susceptible,
    Infected,
    #[strum(serialize = "Infected_Hospitalized")]
    #[serde(rename = "Infected_Hospitalized")]
    InfectedHospitalized,
}

impl DiseaseState {
    #[must_use]
    pub fn is_infected(self) -> bool {
        self != DiseaseState::Susceptible
    }
}

#[derive(Clone, Default)]
struct PersonRecord {
    disease_state: DiseaseState,
    pathogen: Option<Rc<Pathogen>>,
}

struct PopulationData {
    records: Vec<PersonRecord>,
}

impl PopulationData {
    fn get(&self, person_id: PersonId) -> Option<&PersonRecord> {
        self.records.get(person_id.index())
    }

    fn get_mut(&mut self, person_id: PersonId) -> &mut PersonRecord {
        let index = person_id.index();
        if index >= self.records.len() {
            self.records.resize_with(index + 1, PersonRecord::default);
        }
        &mut self.records[index]
    }
}

define_data_plugin!(
    PopulationPlugin,
    PopulationData,
    PopulationData {
        records: Vec::new()
    }
);

pub trait ContextPopulationExt {
    fn get_disease_state(&self, person_id: PersonId) -> DiseaseState;

    fn get_pathogen(&self, person_id: PersonId) -> Option<Rc<Pathogen>>;

    /// Attaches `pathogen` and moves the person to `state`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError` if `state` is `Susceptible`.
    fn infect(
        &mut self,
        person_id: PersonId,
        pathogen: Rc<Pathogen>,
        state: DiseaseState,
    ) -> Result<(), ModelError>;

    /// Detaches the pathogen and returns the person to `Susceptible`.
    fn clear_infection(&mut self, person_id: PersonId);

    /// Changes state without touching the pathogen. Only moves between the two
    /// infected states are allowed.
    ///
    /// # Errors
    ///
    /// Returns `ModelError` if either the current or the new state is `Susceptible`.
    fn set_disease_state(&mut self, person_id: PersonId, state: DiseaseState)
        -> Result<(), ModelError>;
}

impl ContextPopulationExt for Context {
    fn get_disease_state(&self, person_id: PersonId) -> DiseaseState {
        self.get_data_container(PopulationPlugin)
            .and_then(|data| data.get(person_id))
            .map_or(DiseaseState::Susceptible, |record| record.disease_state)
    }

    fn get_pathogen(&self, person_id: PersonId) -> Option<Rc<Pathogen>> {
        self.get_data_container(PopulationPlugin)
            .and_then(|data| data.get(person_id))
            .and_then(|record| record.pathogen.clone())
    }

    fn infect(
        &mut self,
        person_id: PersonId,
        pathogen: Rc<Pathogen>,
        state: DiseaseState,
    ) -> Result<(), ModelError> {
        if !state.is_infected() {
            return Err(ModelError::ModelError(format!(
                "cannot infect {person_id} into the Susceptible state"
            )));
        }
        let record = self.get_data_container_mut(PopulationPlugin).get_mut(person_id);
        record.disease_state = state;
        record.pathogen = Some(pathogen);
        Ok(())
    }

    fn clear_infection(&mut self, person_id: PersonId) {
        let record = self.get_data_container_mut(PopulationPlugin).get_mut(person_id);
        record.disease_state = DiseaseState::Susceptible;
        record.pathogen = None;
    }

    fn set_disease_state(
        &mut self,
        person_id: PersonId,
        state: DiseaseState,
    ) -> Result<(), ModelError> {
        let record = self.get_data_container_mut(PopulationPlugin).get_mut(person_id);
        if !state.is_infected() || !record.disease_state.is_infected() {
            return Err(ModelError::ModelError(format!(
                "{person_id} cannot move from {} to {state} without changing its pathogen",
                record.disease_state
            )));
        }
        record.disease_state = state;
        Ok(())
    }
}
