//! Choosing which neighbor, if any, infects a susceptible person.
//!
//! A neighbor qualifies when, at the start of the tick, it was `Infected` (not
//! hospitalized) and stood at the location the susceptible person was just
//! assigned. Two selection laws are available and they are not equivalent:
//!
//! * `Sequential` walks qualifying neighbors in network order and gives each a
//!   single `NEIGHBOR_TRANSMISSION_PROBABILITY` trial. The first success is the
//!   infector, even if a later neighbor would also have succeeded.
//! * `Uniform` picks one qualifying neighbor uniformly and always transmits.
//!   Any qualifying neighbor means certain infection.
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::define_data_plugin;
use crate::location::Location;
use crate::network::ContextNetworkExt;
use crate::people::PersonId;
use crate::population::DiseaseState;
use crate::random::ContextRandomExt;
use crate::rules::ModelRng;
use crate::snapshot::TickSnapshot;

/// Chance that one qualifying neighbor transmits under `Sequential`.
pub const NEIGHBOR_TRANSMISSION_PROBABILITY: f64 = 0.3;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InfectorSelection {
    #[default]
    Sequential,
    Uniform,
}

define_data_plugin!(
    InfectorSelectionPlugin,
    InfectorSelection,
    InfectorSelection::default()
);

/// Neighbors of `person` that can infect someone at `location`, in network
/// order. Lazy, so a short-circuiting consumer stops reading the network (and
/// drawing random numbers) as soon as it is done.
pub fn qualifying_neighbors<'a>(
    context: &'a Context,
    snapshot: &'a TickSnapshot,
    person: PersonId,
    location: Location,
) -> impl Iterator<Item = PersonId> + 'a {
    context
        .get_neighbors(person)
        .iter()
        .copied()
        .filter(move |neighbor| {
            snapshot.disease_state(*neighbor) == DiseaseState::Infected
                && snapshot.location(*neighbor) == location
        })
}

pub trait ContextInfectorSelectionExt {
    fn set_infector_selection(&mut self, selection: InfectorSelection);

    fn get_infector_selection(&self) -> InfectorSelection;

    /// Applies the configured selection law to `person`, who has just been
    /// assigned `location`.
    fn select_infector(
        &self,
        snapshot: &TickSnapshot,
        person: PersonId,
        location: Location,
    ) -> Option<PersonId>;
}

impl ContextInfectorSelectionExt for Context {
    fn set_infector_selection(&mut self, selection: InfectorSelection) {
        *self.get_data_container_mut(InfectorSelectionPlugin) = selection;
    }

    fn get_infector_selection(&self) -> InfectorSelection {
        self.get_data_container(InfectorSelectionPlugin)
            .copied()
            .unwrap_or_default()
    }

    fn select_infector(
        &self,
        snapshot: &TickSnapshot,
        person: PersonId,
        location: Location,
    ) -> Option<PersonId> {
        let mut candidates = qualifying_neighbors(self, snapshot, person, location);
        match self.get_infector_selection() {
            InfectorSelection::Sequential => candidates
                .find(|_| self.sample_bool(ModelRng, NEIGHBOR_TRANSMISSION_PROBABILITY)),
            InfectorSelection::Uniform => {
                let candidates: Vec<PersonId> = candidates.collect();
                self.sample_from_known_length(ModelRng, candidates.into_iter())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::rc::Rc;

    use super::*;
    use crate::location::ContextLocationExt;
    use crate::pathogen::Pathogen;
    use crate::people::ContextPeopleExt;
    use crate::population::ContextPopulationExt;

    // Person 0 is susceptible; persons 1..=n are its neighbors.
    fn star(neighbors: &[(DiseaseState, Location)]) -> (Context, Vec<PersonId>) {
        let mut context = Context::new();
        context.init_random(42);
        let people = context.add_people(neighbors.len() + 1);
        let pathogen = Rc::new(Pathogen::new("MRSA"));
        for (neighbor, (state, location)) in people[1..].iter().zip(neighbors) {
            context.add_edge_bidi(people[0], *neighbor).unwrap();
            if *state != DiseaseState::Susceptible {
                context
                    .infect(*neighbor, Rc::clone(&pathogen), *state)
                    .unwrap();
            }
            context.set_location(*neighbor, *location);
        }
        (context, people)
    }

    #[test]
    fn only_infected_neighbors_at_the_same_location_qualify() {
        let (context, people) = star(&[
            (DiseaseState::Infected, Location::Home),
            (DiseaseState::Infected, Location::Community),
            (DiseaseState::InfectedHospitalized, Location::Home),
            (DiseaseState::Susceptible, Location::Home),
            (DiseaseState::Infected, Location::Home),
        ]);
        let snapshot = TickSnapshot::capture(&context);
        let qualifying: Vec<PersonId> =
            qualifying_neighbors(&context, &snapshot, people[0], Location::Home).collect();
        assert_eq!(qualifying, vec![people[1], people[5]]);
    }

    #[test]
    fn no_qualifying_neighbor_draws_nothing() {
        for selection in [InfectorSelection::Sequential, InfectorSelection::Uniform] {
            let (mut context, people) = star(&[(DiseaseState::Infected, Location::Home)]);
            context.set_infector_selection(selection);
            let snapshot = TickSnapshot::capture(&context);
            assert!(context
                .select_infector(&snapshot, people[0], Location::Hospital)
                .is_none());

            let mut reference = Context::new();
            reference.init_random(42);
            assert_eq!(
                context.sample_range(ModelRng, 0..1_000_000),
                reference.sample_range(ModelRng, 0..1_000_000)
            );
        }
    }

    #[test]
    fn sequential_takes_first_success_not_best() {
        // Every neighbor qualifies; the scan consumes one Bernoulli draw per
        // neighbor and stops at the first success.
        let neighbors = vec![(DiseaseState::Infected, Location::Community); 8];
        let (context, people) = star(&neighbors);
        let snapshot = TickSnapshot::capture(&context);

        let mut reference = Context::new();
        reference.init_random(42);
        let draws: Vec<bool> = (0..neighbors.len())
            .map(|_| reference.sample_bool(ModelRng, NEIGHBOR_TRANSMISSION_PROBABILITY))
            .collect();
        let expected = draws.iter().position(|success| *success).map(|k| people[k + 1]);

        let infector = context.select_infector(&snapshot, people[0], Location::Community);
        assert_eq!(infector, expected);
    }

    #[test]
    fn sequential_success_rate_matches_transmission_probability() {
        let (context, people) = star(&[(DiseaseState::Infected, Location::Home)]);
        let snapshot = TickSnapshot::capture(&context);
        let trials = 10_000;
        let successes = (0..trials)
            .filter(|_| {
                context
                    .select_infector(&snapshot, people[0], Location::Home)
                    .is_some()
            })
            .count();
        #[allow(clippy::cast_precision_loss)]
        let rate = successes as f64 / f64::from(trials);
        assert!((rate - NEIGHBOR_TRANSMISSION_PROBABILITY).abs() < 0.02);
    }

    #[test]
    fn uniform_always_infects_when_someone_qualifies() {
        let (mut context, people) = star(&[
            (DiseaseState::Infected, Location::Home),
            (DiseaseState::Infected, Location::Home),
            (DiseaseState::Infected, Location::Home),
        ]);
        context.set_infector_selection(InfectorSelection::Uniform);
        let snapshot = TickSnapshot::capture(&context);
        let mut seen = [0usize; 3];
        for _ in 0..3000 {
            let infector = context
                .select_infector(&snapshot, people[0], Location::Home)
                .unwrap();
            seen[infector.index() - 1] += 1;
        }
        assert!(seen.iter().all(|&count| (850..1150).contains(&count)));
    }

    #[test]
    fn default_selection_is_sequential() {
        let context = Context::new();
        assert_eq!(context.get_infector_selection(), InfectorSelection::Sequential);
    }

    #[test]
    fn selection_names() {
        let parsed: InfectorSelection = serde_json::from_str(r#""uniform""#).unwrap();
        assert_eq!(parsed, InfectorSelection::Uniform);
        assert_eq!(InfectorSelection::Sequential.to_string(), "sequential");
    }
}
