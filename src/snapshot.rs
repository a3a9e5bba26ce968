//! The frozen view of the population that update rules read during a tick.
//!
//! A tick captures every person's state, location and pathogen before any rule
//! runs. Rules read other people only through the snapshot and write only to
//! the person they were invoked for, so the order people are processed in
//! cannot leak one person's update into another's view of the same tick.
use std::rc::Rc;

use crate::context::Context;
use crate::location::{ContextLocationExt, Location};
use crate::pathogen::Pathogen;
use crate::people::{ContextPeopleExt, PersonId};
use crate::population::{ContextPopulationExt, DiseaseState};

pub struct TickSnapshot {
    states: Vec<DiseaseState>,
    locations: Vec<Location>,
    pathogens: Vec<Option<Rc<Pathogen>>>,
}

impl TickSnapshot {
    #[must_use]
    pub fn capture(context: &Context) -> TickSnapshot {
        let people: Vec<PersonId> = context.iter_people().collect();
        TickSnapshot {
            states: people
                .iter()
                .map(|person| context.get_disease_state(*person))
                .collect(),
            locations: context.get_location_snapshot(),
            pathogens: people
                .iter()
                .map(|person| context.get_pathogen(*person))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// State at the start of the tick. People added after capture read as
    /// `Susceptible`.
    #[must_use]
    pub fn disease_state(&self, person: PersonId) -> DiseaseState {
        self.states
            .get(person.index())
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn location(&self, person: PersonId) -> Location {
        self.locations
            .get(person.index())
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn pathogen(&self, person: PersonId) -> Option<Rc<Pathogen>> {
        self.pathogens.get(person.index()).cloned().flatten()
    }
}
