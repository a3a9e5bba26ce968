//! Where each person is during the current tick.
//!
//! The location store is a dense vector indexed by `PersonId`. Reads past the
//! end return the default location, mirroring how unset person properties
//! behave, and writes grow the vector as needed.
use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::context::Context;
use crate::define_data_plugin;
use crate::people::{ContextPeopleExt, PersonId};
use crate::random::{ContextRandomExt, RngId};

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
pub enum Location {
    #[default]
    Community,
    Hospital,
    Home,
}

impl Location {
    /// Draws one of the locations uniformly at random.
    pub fn sample_uniform<R: RngId>(context: &Context, rng_id: R) -> Location {
        let index = context.sample_range(rng_id, 0..Location::COUNT);
        Location::iter().nth(index).unwrap_or_default()
    }
}

struct LocationData {
    locations: Vec<Location>,
}

define_data_plugin!(
    LocationPlugin,
    LocationData,
    LocationData {
        locations: Vec::new()
    }
);

pub trait ContextLocationExt {
    fn get_location(&self, person_id: PersonId) -> Location;

    fn set_location(&mut self, person_id: PersonId, location: Location);

    /// Assigns every person a uniformly drawn starting location.
    fn initialize_locations<R: RngId>(&mut self, rng_id: R);

    /// A copy of the store with one entry per person, in id order.
    fn get_location_snapshot(&self) -> Vec<Location>;
}

impl ContextLocationExt for Context {
    fn get_location(&self, person_id: PersonId) -> Location {
        self.get_data_container(LocationPlugin)
            .and_then(|data| data.locations.get(person_id.index()).copied())
            .unwrap_or_default()
    }

    fn set_location(&mut self, person_id: PersonId, location: Location) {
        let locations = &mut self.get_data_container_mut(LocationPlugin).locations;
        let index = person_id.index();
        if index >= locations.len() {
            locations.resize(index + 1, Location::default());
        }
        locations[index] = location;
    }

    fn initialize_locations<R: RngId>(&mut self, rng_id: R) {
        let context: &Context = self;
        let locations: Vec<Location> = context
            .iter_people()
            .map(|_| Location::sample_uniform(context, rng_id))
            .collect();
        self.get_data_container_mut(LocationPlugin).locations = locations;
    }

    fn get_location_snapshot(&self) -> Vec<Location> {
        (0..self.get_current_population())
            .map(|index| self.get_location(PersonId::new(index)))
            .collect()
    }
}
