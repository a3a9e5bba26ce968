//! Driving the model one tick at a time.
//!
//! `schedule_ticks` validates the parameters and then schedules a periodic
//! plan that runs one tick per unit of time, plus a shutdown at `t = ticks`.
//! Each tick captures a `TickSnapshot`, then runs the update rule matching each
//! person's start-of-tick state, in ascending id order.
//!
//! Rules report errors instead of panicking. The first error stops the run: it
//! is stored, the context is shut down, and `take_fatal_error` hands it back to
//! whoever called `execute`.
use log::{debug, error, info};

use crate::context::Context;
use crate::define_data_plugin;
use crate::error::ModelError;
use crate::location::{ContextLocationExt, Location};
use crate::parameters::ContextParametersExt;
use crate::people::ContextPeopleExt;
use crate::plan::ExecutionPhase;
use crate::population::{ContextPopulationExt, DiseaseState};
use crate::snapshot::TickSnapshot;

/// Transition counts for one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub tick: usize,
    pub new_infections: usize,
    pub hospitalizations: usize,
    pub recoveries: usize,
    pub discharges: usize,
}

impl TickSummary {
    fn record(&mut self, from: DiseaseState, to: DiseaseState) {
        match (from, to) {
            (DiseaseState::Susceptible, DiseaseState::InfectedHospitalized) => {
                self.new_infections += 1;
                self.hospitalizations += 1;
            }
            (DiseaseState::Susceptible, _) => self.new_infections += 1,
            (_, DiseaseState::Susceptible) => self.recoveries += 1,
            (DiseaseState::Infected, _) => self.hospitalizations += 1,
            (DiseaseState::InfectedHospitalized, _) => self.discharges += 1,
        }
    }
}

struct SimulationData {
    ticks_completed: usize,
    fatal_error: Option<ModelError>,
}

define_data_plugin!(
    SimulationPlugin,
    SimulationData,
    SimulationData {
        ticks_completed: 0,
        fatal_error: None,
    }
);

pub trait ContextSimulationExt {
    /// Schedules `ticks` ticks starting at the current time.
    ///
    /// # Errors
    ///
    /// Returns the parameter validation error, in which case nothing is scheduled.
    fn schedule_ticks(&mut self, ticks: usize) -> Result<(), ModelError>;

    /// Runs every person's update rule once against a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first rule error, or a broken tick-boundary invariant.
    /// People after the failing one are not updated.
    fn execute_tick(&mut self) -> Result<TickSummary, ModelError>;

    /// Checks that every person carries a pathogen exactly when they are not
    /// `Susceptible`, and that everyone who started the tick hospitalized and
    /// is still hospitalized is at the hospital.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::BoundaryViolation` naming the first person who
    /// breaks either rule.
    fn check_tick_boundary(&self, snapshot: &TickSnapshot) -> Result<(), ModelError>;

    fn get_ticks_completed(&self) -> usize;

    /// Removes and returns the error that stopped the run, if any.
    fn take_fatal_error(&mut self) -> Option<ModelError>;

    /// Schedules `ticks` ticks, executes them, and reports any fatal error.
    ///
    /// # Errors
    ///
    /// Returns a validation error before running, or the error that stopped the run.
    fn run_simulation(&mut self, ticks: usize) -> Result<(), ModelError>;
}

fn run_scheduled_tick(context: &mut Context) {
    if let Err(e) = context.execute_tick() {
        error!("aborting run at t={}: {e}", context.get_current_time());
        context.get_data_container_mut(SimulationPlugin).fatal_error = Some(e);
        context.shutdown();
    }
}

impl ContextSimulationExt for Context {
    fn schedule_ticks(&mut self, ticks: usize) -> Result<(), ModelError> {
        self.validate_parameters()?;
        #[allow(clippy::cast_precision_loss)]
        let end = self.get_current_time() + ticks as f64;
        self.add_periodic_plan_with_phase(1.0, run_scheduled_tick, ExecutionPhase::Normal);
        self.add_plan_with_phase(
            end,
            |context| {
                info!("finished {} ticks", context.get_ticks_completed());
                context.shutdown();
            },
            ExecutionPhase::First,
        );
        info!(
            "scheduled {ticks} ticks for {} people",
            self.get_current_population()
        );
        Ok(())
    }

    fn execute_tick(&mut self) -> Result<TickSummary, ModelError> {
        let snapshot = TickSnapshot::capture(self);
        let mut summary = TickSummary {
            tick: self.get_ticks_completed(),
            ..TickSummary::default()
        };
        for person_id in self.iter_people() {
            let state = snapshot.disease_state(person_id);
            let rule = state.update_rule();
            if let Some(new_state) = rule(self, &snapshot, person_id)? {
                summary.record(state, new_state);
            }
        }
        self.check_tick_boundary(&snapshot)?;
        self.get_data_container_mut(SimulationPlugin).ticks_completed += 1;
        debug!(
            "tick {}: {} infections, {} hospitalizations, {} recoveries, {} discharges",
            summary.tick,
            summary.new_infections,
            summary.hospitalizations,
            summary.recoveries,
            summary.discharges
        );
        Ok(summary)
    }

    fn check_tick_boundary(&self, snapshot: &TickSnapshot) -> Result<(), ModelError> {
        for person_id in self.iter_people() {
            let state = self.get_disease_state(person_id);
            if state.is_infected() != self.get_pathogen(person_id).is_some() {
                return Err(ModelError::BoundaryViolation {
                    person_id,
                    reason: format!("is {state} but pathogen attachment disagrees"),
                });
            }
            if state == DiseaseState::InfectedHospitalized
                && snapshot.disease_state(person_id) == DiseaseState::InfectedHospitalized
                && self.get_location(person_id) != Location::Hospital
            {
                return Err(ModelError::BoundaryViolation {
                    person_id,
                    reason: format!("is hospitalized but at {}", self.get_location(person_id)),
                });
            }
        }
        Ok(())
    }

    fn get_ticks_completed(&self) -> usize {
        self.get_data_container(SimulationPlugin)
            .map_or(0, |data| data.ticks_completed)
    }

    fn take_fatal_error(&mut self) -> Option<ModelError> {
        self.get_data_container_mut(SimulationPlugin).fatal_error.take()
    }

    fn run_simulation(&mut self, ticks: usize) -> Result<(), ModelError> {
        self.schedule_ticks(ticks)?;
        self.execute();
        match self.take_fatal_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
