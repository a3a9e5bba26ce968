//! Agent identities. People are added once during setup and never removed, so a
//! `PersonId` doubles as an index into every per-person store.
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::define_data_plugin;
use crate::error::ModelError;

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(usize);

impl PersonId {
    #[must_use]
    pub fn new(id: usize) -> PersonId {
        PersonId(id)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Person {}", self.0)
    }
}

pub type PeopleIterator = std::iter::Map<std::ops::Range<usize>, fn(usize) -> PersonId>;

struct PeopleData {
    population: usize,
}

define_data_plugin!(PeoplePlugin, PeopleData, PeopleData { population: 0 });

pub trait ContextPeopleExt {
    /// Adds a new person and returns their id. New people are Susceptible.
    fn add_person(&mut self) -> PersonId;

    /// Adds `count` people at once and returns their ids in order.
    fn add_people(&mut self, count: usize) -> Vec<PersonId>;

    fn get_current_population(&self) -> usize;

    /// Looks up the id for a raw index, e.g. one read from an input file.
    ///
    /// # Errors
    ///
    /// Returns `ModelError` if no person with that index exists.
    fn get_person_id(&self, index: usize) -> Result<PersonId, ModelError>;

    /// Every person, in ascending id order. The iterator does not borrow the context.
    fn iter_people(&self) -> PeopleIterator;
}

impl ContextPeopleExt for Context {
    fn add_person(&mut self) -> PersonId {
        let data_container = self.get_data_container_mut(PeoplePlugin);
        let person_id = PersonId(data_container.population);
        data_container.population += 1;
        person_id
    }

    fn add_people(&mut self, count: usize) -> Vec<PersonId> {
        (0..count).map(|_| self.add_person()).collect()
    }

    fn get_current_population(&self) -> usize {
        self.get_data_container(PeoplePlugin)
            .map_or(0, |data_container| data_container.population)
    }

    fn get_person_id(&self, index: usize) -> Result<PersonId, ModelError> {
        if index >= self.get_current_population() {
            return Err(ModelError::ModelError(format!(
                "no person with index {index}; population is {}",
                self.get_current_population()
            )));
        }
        Ok(PersonId(index))
    }

    fn iter_people(&self) -> PeopleIterator {
        (0..self.get_current_population()).map(PersonId as fn(usize) -> PersonId)
    }
}
