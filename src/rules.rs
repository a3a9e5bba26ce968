//! Per-tick update rules, one for each disease state.
//!
//! Each rule is invoked for a single person whose start-of-tick state matches
//! the rule. It always reassigns that person's location, may change their
//! state, and returns the new state if it did. All rules draw from `ModelRng`.
use log::trace;

use crate::context::Context;
use crate::define_rng;
use crate::error::ModelError;
use crate::infection_log::ContextInfectionLogExt;
use crate::location::{ContextLocationExt, Location};
use crate::neighbor_sampler::ContextInfectorSelectionExt;
use crate::parameters::{ContextParametersExt, DISCHARGE_INFECTED, PROB_HOSPITALIZATION, PROB_RECOVERY};
use crate::people::PersonId;
use crate::population::{ContextPopulationExt, DiseaseState};
use crate::random::ContextRandomExt;
use crate::snapshot::TickSnapshot;

define_rng!(pub ModelRng);

/// Chance that an infected, non-hospitalized person spends the tick in the
/// community rather than at home.
pub const COMMUNITY_PROBABILITY: f64 = 0.5;

// Outcome indices of the infected rule's roulette draw.
const OUTCOME_HOSPITALIZED: usize = 0;
const OUTCOME_RECOVERED: usize = 1;

pub type UpdateRule =
    fn(&mut Context, &TickSnapshot, PersonId) -> Result<Option<DiseaseState>, ModelError>;

impl DiseaseState {
    /// The rule that updates a person who starts the tick in this state.
    #[must_use]
    pub fn update_rule(self) -> UpdateRule {
        match self {
            DiseaseState::Susceptible => update_susceptible,
            DiseaseState::Infected => update_infected,
            DiseaseState::InfectedHospitalized => update_hospitalized,
        }
    }
}

fn expect_state(
    context: &Context,
    person_id: PersonId,
    expected: DiseaseState,
) -> Result<(), ModelError> {
    let found = context.get_disease_state(person_id);
    if found == expected {
        Ok(())
    } else {
        Err(ModelError::InvariantViolation {
            person_id,
            expected,
            found,
        })
    }
}

/// Moves the person to a uniformly drawn location, then looks for an infector
/// among neighbors who were infected and at that location when the tick began.
/// On infection the event is logged and the person is hospitalized with
/// probability `Prob hospitalization`.
///
/// # Errors
///
/// Returns `ModelError::InvariantViolation` if the person is no longer
/// susceptible, `ModelError::BoundaryViolation` if the infector carries no
/// pathogen, and `ModelError` if a parameter is missing.
pub fn update_susceptible(
    context: &mut Context,
    snapshot: &TickSnapshot,
    person_id: PersonId,
) -> Result<Option<DiseaseState>, ModelError> {
    expect_state(context, person_id, DiseaseState::Susceptible)?;
    let prob_hospitalization = context.par(PROB_HOSPITALIZATION)?;

    let location = Location::sample_uniform(context, ModelRng);
    context.set_location(person_id, location);

    let Some(infector) = context.select_infector(snapshot, person_id, location) else {
        return Ok(None);
    };
    let pathogen = snapshot
        .pathogen(infector)
        .ok_or_else(|| ModelError::BoundaryViolation {
            person_id: infector,
            reason: "is Infected but carries no pathogen".to_string(),
        })?;

    context.record_infection(person_id, infector, location);
    let state = if context.sample_bool(ModelRng, prob_hospitalization) {
        DiseaseState::InfectedHospitalized
    } else {
        DiseaseState::Infected
    };
    context.infect(person_id, pathogen, state)?;
    trace!("{person_id} infected by {infector} at {location}; now {state}");
    Ok(Some(state))
}

/// Sends the person to the community or home, then makes one roulette draw
/// over `[Prob hospitalization, Prob recovery]`. The leftover probability
/// leaves the state unchanged.
///
/// # Errors
///
/// Returns `ModelError::InvariantViolation` if the person is not `Infected`,
/// and `ModelError` for missing parameters or unusable weights.
pub fn update_infected(
    context: &mut Context,
    _snapshot: &TickSnapshot,
    person_id: PersonId,
) -> Result<Option<DiseaseState>, ModelError> {
    expect_state(context, person_id, DiseaseState::Infected)?;
    let weights = [context.par(PROB_HOSPITALIZATION)?, context.par(PROB_RECOVERY)?];

    let location = if context.sample_bool(ModelRng, COMMUNITY_PROBABILITY) {
        Location::Community
    } else {
        Location::Home
    };
    context.set_location(person_id, location);

    match context.sample_roulette(ModelRng, &weights)? {
        Some(OUTCOME_HOSPITALIZED) => {
            context.set_disease_state(person_id, DiseaseState::InfectedHospitalized)?;
            trace!("{person_id} hospitalized");
            Ok(Some(DiseaseState::InfectedHospitalized))
        }
        Some(OUTCOME_RECOVERED) => {
            context.clear_infection(person_id);
            trace!("{person_id} recovered at {location}");
            Ok(Some(DiseaseState::Susceptible))
        }
        _ => Ok(None),
    }
}

/// Keeps the person in hospital. Recovery is tried first; only if it fails is
/// discharge (still infected) tried.
///
/// # Errors
///
/// Returns `ModelError::InvariantViolation` if the person is not hospitalized,
/// and `ModelError` for missing parameters.
pub fn update_hospitalized(
    context: &mut Context,
    _snapshot: &TickSnapshot,
    person_id: PersonId,
) -> Result<Option<DiseaseState>, ModelError> {
    expect_state(context, person_id, DiseaseState::InfectedHospitalized)?;
    let prob_recovery = context.par(PROB_RECOVERY)?;
    let discharge_infected = context.par(DISCHARGE_INFECTED)?;

    context.set_location(person_id, Location::Hospital);

    if context.sample_bool(ModelRng, prob_recovery) {
        context.clear_infection(person_id);
        trace!("{person_id} recovered in hospital");
        return Ok(Some(DiseaseState::Susceptible));
    }
    if context.sample_bool(ModelRng, discharge_infected) {
        context.set_disease_state(person_id, DiseaseState::Infected)?;
        trace!("{person_id} discharged while infected");
        return Ok(Some(DiseaseState::Infected));
    }
    Ok(None)
}

#[cfg(test)]
mod test {
    use std::rc::Rc;

    use super::*;
    use crate::neighbor_sampler::InfectorSelection;
    use crate::network::ContextNetworkExt;
    use crate::pathogen::Pathogen;
    use crate::people::ContextPeopleExt;

    fn setup(hospitalization: f64, recovery: f64, discharge: f64, population: usize) -> Context {
        let mut context = Context::new();
        context.init_random(1231);
        context.add_param(PROB_HOSPITALIZATION, hospitalization).unwrap();
        context.add_param(PROB_RECOVERY, recovery).unwrap();
        context.add_param(DISCHARGE_INFECTED, discharge).unwrap();
        context.add_people(population);
        context
    }

    fn infect(context: &mut Context, person_id: PersonId, state: DiseaseState) {
        context
            .infect(person_id, Rc::new(Pathogen::new("MRSA")), state)
            .unwrap();
    }

    fn apply(context: &mut Context, person_id: PersonId) -> Option<DiseaseState> {
        let snapshot = TickSnapshot::capture(context);
        let rule = snapshot.disease_state(person_id).update_rule();
        rule(context, &snapshot, person_id).unwrap()
    }

    #[test]
    fn dispatch_matches_state() {
        let mut context = setup(0.0, 0.0, 0.0, 1);
        let person = PersonId::new(0);
        infect(&mut context, person, DiseaseState::InfectedHospitalized);
        apply(&mut context, person);
        assert_eq!(context.get_location(person), Location::Hospital);
    }

    #[test]
    fn wrong_rule_is_an_invariant_violation() {
        let mut context = setup(0.0, 0.0, 0.0, 1);
        let person = PersonId::new(0);
        let snapshot = TickSnapshot::capture(&context);
        infect(&mut context, person, DiseaseState::Infected);
        let result = update_susceptible(&mut context, &snapshot, person);
        assert!(matches!(
            result,
            Err(ModelError::InvariantViolation {
                expected: DiseaseState::Susceptible,
                found: DiseaseState::Infected,
                ..
            })
        ));
        // Nothing was touched.
        assert_eq!(context.get_location(person), Location::Community);
        assert!(context.get_infection_log().is_empty());
    }

    #[test]
    fn susceptible_without_neighbors_only_moves() {
        let mut context = setup(1.0, 0.0, 0.0, 1);
        let person = PersonId::new(0);
        let mut seen = Vec::new();
        for _ in 0..60 {
            assert_eq!(apply(&mut context, person), None);
            seen.push(context.get_location(person));
        }
        assert_eq!(context.get_disease_state(person), DiseaseState::Susceptible);
        for location in [Location::Community, Location::Hospital, Location::Home] {
            assert!(seen.contains(&location));
        }
    }

    #[test]
    fn infection_logs_event_and_adopts_infector_pathogen() {
        let mut context = setup(0.0, 0.0, 0.0, 2);
        let (susceptible, infector) = (PersonId::new(0), PersonId::new(1));
        context.add_edge_bidi(susceptible, infector).unwrap();
        infect(&mut context, infector, DiseaseState::Infected);
        let pathogen = context.get_pathogen(infector).unwrap();

        // Keep the infector everywhere the susceptible might go until it
        // catches the pathogen.
        let mut ticks = 0;
        while context.get_disease_state(susceptible) == DiseaseState::Susceptible {
            for location in [Location::Community, Location::Hospital, Location::Home] {
                context.set_location(infector, location);
                let snapshot = TickSnapshot::capture(&context);
                if update_susceptible(&mut context, &snapshot, susceptible)
                    .unwrap()
                    .is_some()
                {
                    break;
                }
            }
            ticks += 1;
            assert!(ticks < 1000, "no infection after many attempts");
        }

        assert_eq!(context.get_disease_state(susceptible), DiseaseState::Infected);
        assert!(Rc::ptr_eq(&context.get_pathogen(susceptible).unwrap(), &pathogen));
        let log = context.get_infection_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].infected, susceptible);
        assert_eq!(log[0].infector, infector);
        assert_eq!(log[0].location, context.get_location(susceptible));
        assert_eq!(log[0].location, context.get_location(infector));
    }

    #[test]
    fn certain_hospitalization_skips_plain_infected() {
        let mut context = setup(1.0, 0.0, 0.0, 4);
        let susceptible = PersonId::new(0);
        for neighbor in 1..4 {
            let neighbor = PersonId::new(neighbor);
            context.add_edge_bidi(susceptible, neighbor).unwrap();
            infect(&mut context, neighbor, DiseaseState::Infected);
        }
        context.set_infector_selection(InfectorSelection::Uniform);
        context.set_location(PersonId::new(1), Location::Community);
        context.set_location(PersonId::new(2), Location::Hospital);
        context.set_location(PersonId::new(3), Location::Home);

        // Under uniform selection a same-location neighbor always transmits,
        // and every location has one.
        let state = apply(&mut context, susceptible);
        assert_eq!(state, Some(DiseaseState::InfectedHospitalized));
        assert_eq!(
            context.get_disease_state(susceptible),
            DiseaseState::InfectedHospitalized
        );
    }

    #[test]
    fn infected_with_no_outcome_mass_only_moves() {
        let mut context = setup(0.0, 0.0, 0.0, 1);
        let person = PersonId::new(0);
        infect(&mut context, person, DiseaseState::Infected);
        let mut seen = Vec::new();
        for _ in 0..50 {
            assert_eq!(apply(&mut context, person), None);
            seen.push(context.get_location(person));
        }
        assert_eq!(context.get_disease_state(person), DiseaseState::Infected);
        assert!(seen.contains(&Location::Community));
        assert!(seen.contains(&Location::Home));
        assert!(!seen.contains(&Location::Hospital));
    }

    #[test]
    fn infected_hospitalization_keeps_pathogen() {
        let mut context = setup(1.0, 0.0, 0.0, 1);
        let person = PersonId::new(0);
        infect(&mut context, person, DiseaseState::Infected);
        assert_eq!(
            apply(&mut context, person),
            Some(DiseaseState::InfectedHospitalized)
        );
        assert!(context.get_pathogen(person).is_some());
        // The move to hospital happens on the next update.
        assert_ne!(context.get_location(person), Location::Hospital);
    }

    #[test]
    fn infected_recovery_detaches_pathogen() {
        let mut context = setup(0.0, 1.0, 0.0, 1);
        let person = PersonId::new(0);
        infect(&mut context, person, DiseaseState::Infected);
        assert_eq!(apply(&mut context, person), Some(DiseaseState::Susceptible));
        assert!(context.get_pathogen(person).is_none());
    }

    #[test]
    fn infected_outcome_rates_follow_weights() {
        let mut context = setup(0.2, 0.3, 0.0, 1);
        let person = PersonId::new(0);
        let mut counts = [0usize; 3];
        for _ in 0..10_000 {
            infect(&mut context, person, DiseaseState::Infected);
            match apply(&mut context, person) {
                Some(DiseaseState::InfectedHospitalized) => counts[0] += 1,
                Some(DiseaseState::Susceptible) => counts[1] += 1,
                _ => counts[2] += 1,
            }
        }
        assert!((1800..2200).contains(&counts[0]));
        assert!((2800..3200).contains(&counts[1]));
        assert!((4800..5200).contains(&counts[2]));
    }

    #[test]
    fn hospitalized_recovery_wins_over_discharge() {
        let mut context = setup(0.0, 1.0, 1.0, 1);
        let person = PersonId::new(0);
        infect(&mut context, person, DiseaseState::InfectedHospitalized);
        assert_eq!(apply(&mut context, person), Some(DiseaseState::Susceptible));
        assert!(context.get_pathogen(person).is_none());
        assert_eq!(context.get_location(person), Location::Hospital);
    }

    #[test]
    fn hospitalized_discharge_keeps_pathogen() {
        let mut context = setup(0.0, 0.0, 1.0, 1);
        let person = PersonId::new(0);
        infect(&mut context, person, DiseaseState::InfectedHospitalized);
        assert_eq!(apply(&mut context, person), Some(DiseaseState::Infected));
        assert!(context.get_pathogen(person).is_some());
    }

    #[test]
    fn hospitalized_without_outcomes_stays() {
        let mut context = setup(0.0, 0.0, 0.0, 1);
        let person = PersonId::new(0);
        infect(&mut context, person, DiseaseState::InfectedHospitalized);
        for _ in 0..20 {
            assert_eq!(apply(&mut context, person), None);
            assert_eq!(context.get_location(person), Location::Hospital);
        }
    }

    #[test]
    fn missing_parameter_is_reported() {
        let mut context = Context::new();
        context.init_random(1);
        let person = context.add_person();
        let snapshot = TickSnapshot::capture(&context);
        assert!(matches!(
            update_susceptible(&mut context, &snapshot, person),
            Err(ModelError::ConfigurationError(_))
        ));
    }
}
