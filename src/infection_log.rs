//! Append-only record of every successful transmission.
use serde::Serialize;

use crate::context::Context;
use crate::define_data_plugin;
use crate::location::Location;
use crate::people::PersonId;

/// One transmission: `infected` caught the pathogen from `infector` while both
/// were at `location`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InfectionEvent {
    pub infected: PersonId,
    pub infector: PersonId,
    pub location: Location,
}

struct InfectionLogData {
    events: Vec<InfectionEvent>,
}

define_data_plugin!(
    InfectionLogPlugin,
    InfectionLogData,
    InfectionLogData { events: Vec::new() }
);

pub trait ContextInfectionLogExt {
    fn record_infection(&mut self, infected: PersonId, infector: PersonId, location: Location);

    /// Events in the order they were recorded.
    fn get_infection_log(&self) -> &[InfectionEvent];
}

impl ContextInfectionLogExt for Context {
    fn record_infection(&mut self, infected: PersonId, infector: PersonId, location: Location) {
        self.get_data_container_mut(InfectionLogPlugin)
            .events
            .push(InfectionEvent {
                infected,
                infector,
                location,
            });
    }

    fn get_infection_log(&self) -> &[InfectionEvent] {
        self.get_data_container(InfectionLogPlugin)
            .map(|data| data.events.as_slice())
            .unwrap_or_default()
    }
}
