//! End-of-run reporting: what was simulated, where people in each state are,
//! and who infected whom.
use std::fmt::{self, Display};

use strum::{EnumCount, IntoEnumIterator};

use crate::context::Context;
use crate::infection_log::{ContextInfectionLogExt, InfectionEvent};
use crate::location::{ContextLocationExt, Location};
use crate::neighbor_sampler::ContextInfectorSelectionExt;
use crate::network::ContextNetworkExt;
use crate::parameters::ContextParametersExt;
use crate::pathogen::ContextPathogenExt;
use crate::people::ContextPeopleExt;
use crate::simulation::ContextSimulationExt;
use crate::population::{ContextPopulationExt, DiseaseState};

/// Number of people in each (state, location) pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateLocationCounts {
    counts: [[usize; Location::COUNT]; DiseaseState::COUNT],
}

fn state_index(state: DiseaseState) -> usize {
    DiseaseState::iter()
        .position(|candidate| candidate == state)
        .unwrap_or_default()
}

fn location_index(location: Location) -> usize {
    Location::iter()
        .position(|candidate| candidate == location)
        .unwrap_or_default()
}

impl StateLocationCounts {
    #[must_use]
    pub fn from_context(context: &Context) -> StateLocationCounts {
        let mut counts = StateLocationCounts::default();
        for person_id in context.iter_people() {
            counts.add(
                context.get_disease_state(person_id),
                context.get_location(person_id),
            );
        }
        counts
    }

    fn add(&mut self, state: DiseaseState, location: Location) {
        self.counts[state_index(state)][location_index(location)] += 1;
    }

    #[must_use]
    pub fn get(&self, state: DiseaseState, location: Location) -> usize {
        self.counts[state_index(state)][location_index(location)]
    }

    #[must_use]
    pub fn state_total(&self, state: DiseaseState) -> usize {
        self.counts[state_index(state)].iter().sum()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

impl Display for StateLocationCounts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Location-wise distribution of states:")?;
        for state in DiseaseState::iter() {
            writeln!(f, "  {state}:")?;
            for location in Location::iter() {
                writeln!(f, "    {location}: {}", self.get(state, location))?;
            }
        }
        Ok(())
    }
}

impl Display for InfectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Susceptible Agent {} infected by Agent {} in {}",
            self.infected.index(),
            self.infector.index(),
            self.location
        )
    }
}

/// Parameters, pathogen and population of the model, one item per line.
#[must_use]
pub fn format_model_overview(context: &Context) -> String {
    let mut text = String::from("Model parameters:\n");
    for (name, value) in context.get_parameters() {
        text.push_str(&format!("  {name}: {value}\n"));
    }
    match context.get_circulating_pathogen() {
        Some(pathogen) => text.push_str(&format!(
            "Pathogen {} (initial state {}, prob infecting {}, prob recovery {})\n",
            pathogen.name(),
            pathogen.initial_state(),
            pathogen.prob_infecting(),
            pathogen.prob_recovery()
        )),
        None => text.push_str("No pathogen\n"),
    }
    text.push_str(&format!(
        "{} people, {} contacts, {} infector selection\n",
        context.get_current_population(),
        context.get_edge_count(),
        context.get_infector_selection()
    ));
    text.push_str(&format!(
        "{} ticks completed\n",
        context.get_ticks_completed()
    ));
    text
}

/// The infection log, one event per line, under a heading.
#[must_use]
pub fn format_infection_log(context: &Context) -> String {
    let mut text = String::from("Infection Events:\n");
    for event in context.get_infection_log() {
        text.push_str(&event.to_string());
        text.push('\n');
    }
    text
}
