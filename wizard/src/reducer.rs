//! The wizard state machine.
//!
//! Navigation, gating and completion are decided synchronously here. The
//! only I/O is the save effect (through [`DraftRepository`]) and the cache
//! mirror on edit; their results come back as [`WizardAction::Saved`] and
//! [`WizardAction::SaveFailed`].

use crate::gate;
use crate::types::{
    Command, InFlight, RejectReason, RequestId, SaveIntent, Transition, WizardAction, WizardState,
};
use event_wizard_core::draft::{DraftPatch, EventDraft, EventStatus};
use event_wizard_core::effect::Effect;
use event_wizard_core::reducer::Reducer;
use event_wizard_core::step::StepId;
use event_wizard_core::{SmallVec, async_effect, save_draft, smallvec};
use event_wizard_runtime::repository::{DraftError, DraftRepository};
use tracing::{debug, info, warn};

type Effects = SmallVec<[Effect<WizardAction>; 4]>;

// ============================================================================
// Environment
// ============================================================================

/// Dependencies of the wizard reducer.
#[derive(Clone, Debug)]
pub struct WizardEnvironment {
    /// Save and cache path for drafts
    pub repository: DraftRepository,
}

impl WizardEnvironment {
    /// Creates a new `WizardEnvironment`
    #[must_use]
    pub const fn new(repository: DraftRepository) -> Self {
        Self { repository }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for a wizard session.
#[derive(Clone, Copy, Debug, Default)]
pub struct WizardReducer;

impl WizardReducer {
    /// Creates a new `WizardReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_idle(state: &WizardState) -> Result<(), RejectReason> {
        if state.is_saving() {
            return Err(RejectReason::SaveInFlight);
        }
        Ok(())
    }

    /// Nothing past design opens before the first save.
    fn validate_reachable(working: &EventDraft, step: StepId) -> Result<(), RejectReason> {
        if step > StepId::DESIGN && !working.is_persisted() {
            return Err(RejectReason::DraftNotPersisted(step));
        }
        Ok(())
    }

    /// Resolve a jump target to the step that will actually be shown.
    fn jump_destination(state: &WizardState, target: StepId) -> Result<StepId, RejectReason> {
        let topology = state.topology();

        if !target.is_sub_step() && topology.has_sub_steps(target.major()) {
            if state.current.major() == target.major() {
                return Ok(state.current);
            }
            return topology
                .first_sub_step_of(target.major())
                .ok_or(RejectReason::NotInTopology(target));
        }

        if !topology.contains(target) {
            return Err(RejectReason::NotInTopology(target));
        }
        Ok(target)
    }

    fn jump_to(state: &mut WizardState, target: StepId) -> Result<(), RejectReason> {
        let destination = Self::jump_destination(state, target)?;
        let working = state.working();
        Self::validate_reachable(&working, destination)?;
        if destination > state.current {
            gate::check_forward(&working)?;
        }

        state.current = destination;
        Ok(())
    }

    fn back(state: &mut WizardState) -> Result<(), RejectReason> {
        let previous = state
            .topology()
            .predecessor(state.current)
            .ok_or(RejectReason::AtBoundary)?;
        Self::validate_reachable(&state.working(), previous)?;

        state.current = previous;
        Ok(())
    }

    fn mark_complete(state: &mut WizardState, step: StepId) -> Result<(), RejectReason> {
        if !state.topology().contains(step) {
            return Err(RejectReason::NotInTopology(step));
        }
        state.completed.insert(step);
        Ok(())
    }

    fn edit(state: &mut WizardState, patch: DraftPatch, env: &WizardEnvironment) -> Effects {
        state.pending = patch.merged_over(std::mem::take(&mut state.pending));
        Self::relocate(state);

        let repository = env.repository.clone();
        let working = state.working();
        smallvec![async_effect! {
            repository.stash(&working);
            None
        }]
    }

    fn next(
        state: &mut WizardState,
        request: RequestId,
        env: &WizardEnvironment,
    ) -> Result<Effects, RejectReason> {
        Self::validate_idle(state)?;
        if state.topology().successor(state.current).is_none() {
            return Err(RejectReason::AtBoundary);
        }
        gate::check_forward(&state.working())?;

        let from = state.current;
        Ok(smallvec![Self::begin_save(
            state,
            request,
            SaveIntent::Advance { from },
            env
        )])
    }

    fn save(
        state: &mut WizardState,
        request: RequestId,
        patch: DraftPatch,
        env: &WizardEnvironment,
    ) -> Result<Effects, RejectReason> {
        Self::validate_idle(state)?;
        state.pending = patch.merged_over(std::mem::take(&mut state.pending));
        Self::relocate(state);

        Ok(smallvec![Self::begin_save(state, request, SaveIntent::Stay, env)])
    }

    fn finish(
        state: &mut WizardState,
        request: RequestId,
        env: &WizardEnvironment,
    ) -> Result<Effects, RejectReason> {
        Self::validate_idle(state)?;
        if state.topology().last() != Some(state.current) {
            return Err(RejectReason::NotAtTerminal(state.current));
        }
        gate::check_forward(&state.working())?;

        Ok(smallvec![Self::begin_save(state, request, SaveIntent::Publish, env)])
    }

    /// Move the pending edits into flight and describe the save.
    fn begin_save(
        state: &mut WizardState,
        request: RequestId,
        intent: SaveIntent,
        env: &WizardEnvironment,
    ) -> Effect<WizardAction> {
        let patch = std::mem::take(&mut state.pending);
        let outgoing = match intent {
            SaveIntent::Publish => DraftPatch::new()
                .status(EventStatus::Published)
                .merged_over(patch.clone()),
            SaveIntent::Advance { .. } | SaveIntent::Stay => patch.clone(),
        };
        state.in_flight = Some(InFlight {
            request,
            patch,
            intent,
        });

        save_draft! {
            repository: env.repository.clone(),
            base: state.draft.clone(),
            patch: outgoing,
            on_success: |draft| Some(WizardAction::Saved { request, draft }),
            on_error: |error| Some(WizardAction::SaveFailed { request, error })
        }
    }

    fn apply_saved(state: &mut WizardState, flight: &InFlight, draft: EventDraft) {
        state.draft = draft;
        state.last_error = None;

        let topology = state.topology();
        match flight.intent {
            SaveIntent::Advance { from } => {
                state.completed.insert(from);
                if state.current == from {
                    if let Some(successor) = topology.successor(from) {
                        state.current = successor;
                    }
                }
            },
            SaveIntent::Publish => {
                if let Some(last) = topology.last() {
                    state.completed.insert(last);
                }
                info!(draft_id = ?state.draft.id, "Event published");
            },
            SaveIntent::Stay => {},
        }
        Self::relocate(state);
    }

    fn apply_failed(state: &mut WizardState, flight: InFlight, error: &DraftError) {
        // Edits made while the save was running win over the ones it carried
        state.pending = std::mem::take(&mut state.pending).merged_over(flight.patch);
        state.last_error = Some(error.to_string());
        warn!(request = flight.request, error = %error, "Draft save failed; edits kept");
    }

    /// Keep `current` inside the topology after a category switch.
    fn relocate(state: &mut WizardState) {
        let topology = state.topology();
        if topology.contains(state.current) {
            return;
        }
        if let Some(step) = topology
            .nearest_at_or_after(state.current)
            .or_else(|| topology.last())
        {
            debug!(from = %state.current, to = %step, "Current step left the topology");
            state.current = step;
        }
    }

    fn record(state: &mut WizardState, request: RequestId, transition: Transition) {
        match &transition {
            Transition::Accepted => {
                metrics::counter!("wizard.transitions.accepted").increment(1);
            },
            Transition::Rejected(reason) => {
                metrics::counter!("wizard.transitions.rejected").increment(1);
                debug!(request, current = %state.current, reason = %reason, "Command rejected");
            },
        }
        state.outcomes.insert(request, Ok(transition));
    }

    /// Take the running save if `request` is it.
    fn land(state: &mut WizardState, request: RequestId) -> Option<InFlight> {
        if !state.mounted {
            debug!(request, "Save result ignored after unmount");
            return None;
        }
        if !state.awaits(request) {
            debug!(request, "Stale save result ignored");
            return None;
        }
        state.in_flight.take()
    }
}

impl Reducer for WizardReducer {
    type State = WizardState;
    type Action = WizardAction;
    type Environment = WizardEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            WizardAction::Command { request, command } => {
                if !state.mounted {
                    return SmallVec::new();
                }

                let result = match command {
                    Command::JumpTo(step) => Self::jump_to(state, step).map(|()| SmallVec::new()),
                    Command::Back => Self::back(state).map(|()| SmallVec::new()),
                    Command::MarkComplete(step) => {
                        Self::mark_complete(state, step).map(|()| SmallVec::new())
                    },
                    Command::Edit(patch) => Ok(Self::edit(state, patch, env)),
                    Command::Next => Self::next(state, request, env),
                    Command::Save(patch) => Self::save(state, request, patch, env),
                    Command::Finish => Self::finish(state, request, env),
                };

                match result {
                    Ok(effects) => {
                        // Saving commands report once the result lands
                        if !state.awaits(request) {
                            Self::record(state, request, Transition::Accepted);
                        }
                        effects
                    },
                    Err(reason) => {
                        Self::record(state, request, Transition::Rejected(reason));
                        SmallVec::new()
                    },
                }
            },

            WizardAction::Saved { request, draft } => {
                if let Some(flight) = Self::land(state, request) {
                    Self::apply_saved(state, &flight, draft);
                    Self::record(state, request, Transition::Accepted);
                }
                SmallVec::new()
            },

            WizardAction::SaveFailed { request, error } => {
                if let Some(flight) = Self::land(state, request) {
                    Self::apply_failed(state, flight, &error);
                    state.outcomes.insert(request, Err(error));
                }
                SmallVec::new()
            },

            WizardAction::Acknowledge { request } => {
                state.outcomes.remove(&request);
                SmallVec::new()
            },

            WizardAction::Unmount => {
                state.mounted = false;
                state.outcomes.clear();
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::gate::GateViolation;
    use chrono::{TimeZone, Utc};
    use event_wizard_core::draft::{DraftId, Monetization, OwnerId};
    use event_wizard_core::persistence::PersistenceError;
    use event_wizard_runtime::cache::InMemoryDraftCache;
    use event_wizard_testing::{InMemoryDraftStore, ReducerTest, assertions, test_clock};
    use std::sync::Arc;

    fn create_test_env() -> WizardEnvironment {
        WizardEnvironment::new(DraftRepository::new(
            Arc::new(InMemoryDraftStore::new()),
            Arc::new(InMemoryDraftCache::new()),
            Arc::new(test_clock()),
        ))
    }

    fn scheduled_patch() -> DraftPatch {
        DraftPatch::new().name("Launch Party").schedule(
            Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 6, 1, 23, 0, 0).unwrap(),
        )
    }

    fn unsaved() -> WizardState {
        WizardState::new(EventDraft::new(OwnerId::generate()))
    }

    fn persisted(monetization: Monetization) -> WizardState {
        let mut draft = EventDraft::new(OwnerId::generate()).with_patch(
            &scheduled_patch().monetization(monetization),
        );
        draft.id = Some(DraftId::generate());
        WizardState::new(draft)
    }

    fn on(mut state: WizardState, step: StepId) -> WizardState {
        state.current = step;
        state
    }

    fn command(request: RequestId, command: Command) -> WizardAction {
        WizardAction::Command { request, command }
    }

    fn rejected(state: &WizardState, request: RequestId) -> Option<RejectReason> {
        match state.outcomes.get(&request) {
            Some(Ok(Transition::Rejected(reason))) => Some(reason.clone()),
            _ => None,
        }
    }

    // ========== Navigation ==========

    #[test]
    fn test_back_at_first_step_is_rejected() {
        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(unsaved())
            .when_action(command(1, Command::Back))
            .then_state(|state| {
                assert_eq!(state.current, StepId::BASICS);
                assert_eq!(rejected(state, 1), Some(RejectReason::AtBoundary));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_back_moves_to_predecessor() {
        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(on(persisted(Monetization::Free), StepId::REGISTRATION_FORM))
            .when_action(command(1, Command::Back))
            .then_state(|state| {
                assert_eq!(state.current, StepId::DESIGN);
                assert!(matches!(state.outcomes.get(&1), Some(Ok(Transition::Accepted))));
            })
            .run();
    }

    #[test]
    fn test_next_at_last_step_is_rejected() {
        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(on(persisted(Monetization::Paid), StepId::LAUNCH))
            .when_action(command(1, Command::Next))
            .then_state(|state| {
                assert_eq!(state.current, StepId::LAUNCH);
                assert!(!state.is_saving());
                assert_eq!(rejected(state, 1), Some(RejectReason::AtBoundary));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_next_gates_on_name_before_first_save() {
        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(unsaved())
            .when_action(command(1, Command::Next))
            .then_state(|state| {
                assert_eq!(state.current, StepId::BASICS);
                assert_eq!(
                    rejected(state, 1),
                    Some(RejectReason::Gate(GateViolation::MissingName))
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_next_starts_a_save_without_moving() {
        let mut state = unsaved();
        state.pending = scheduled_patch();

        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(command(1, Command::Next))
            .then_state(|state| {
                assert_eq!(state.current, StepId::BASICS);
                assert!(state.pending.is_empty());
                let flight = state.in_flight.as_ref().unwrap();
                assert_eq!(flight.intent, SaveIntent::Advance { from: StepId::BASICS });
                assert_eq!(flight.patch, scheduled_patch());
                assert!(state.outcomes.is_empty());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_save_effect_feeds_back_the_stored_record() {
        let mut state = unsaved();
        state.pending = scheduled_patch();

        let mut effects =
            WizardReducer::new().reduce(&mut state, command(4, Command::Next), &create_test_env());
        let feedback = assertions::feedback(effects.remove(0));

        match feedback {
            Some(WizardAction::Saved { request, draft }) => {
                assert_eq!(request, 4);
                assert!(draft.is_persisted());
                assert_eq!(draft.name, "Launch Party");
            },
            other => panic!("Expected Saved, got {other:?}"),
        }
    }

    #[test]
    fn test_second_save_while_in_flight_is_rejected() {
        let mut state = persisted(Monetization::Free);
        state.in_flight = Some(InFlight {
            request: 1,
            patch: DraftPatch::new(),
            intent: SaveIntent::Stay,
        });

        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(command(2, Command::Save(DraftPatch::new().name("Other"))))
            .then_state(|state| {
                assert_eq!(rejected(state, 2), Some(RejectReason::SaveInFlight));
                assert!(state.pending.is_empty());
                assert!(state.awaits(1));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_jump_outside_topology_is_rejected() {
        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(on(persisted(Monetization::Free), StepId::DESIGN))
            .when_action(command(1, Command::JumpTo(StepId::TICKETS)))
            .then_state(|state| {
                assert_eq!(state.current, StepId::DESIGN);
                assert_eq!(
                    rejected(state, 1),
                    Some(RejectReason::NotInTopology(StepId::TICKETS))
                );
            })
            .run();
    }

    #[test]
    fn test_jump_to_major_step_opens_first_sub_step() {
        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(on(persisted(Monetization::Free), StepId::DESIGN))
            .when_action(command(1, Command::JumpTo(StepId::REGISTRATION)))
            .then_state(|state| {
                assert_eq!(state.current, StepId::REGISTRATION_FORM);
            })
            .run();
    }

    #[test]
    fn test_jump_to_major_step_keeps_current_sub_step() {
        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(on(persisted(Monetization::Paid), StepId::EMAILS))
            .when_action(command(1, Command::JumpTo(StepId::REGISTRATION)))
            .then_state(|state| {
                assert_eq!(state.current, StepId::EMAILS);
                assert!(matches!(state.outcomes.get(&1), Some(Ok(Transition::Accepted))));
            })
            .run();
    }

    #[test]
    fn test_sub_steps_need_a_persisted_draft() {
        let mut state = unsaved();
        state.pending = scheduled_patch();

        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(command(1, Command::JumpTo(StepId::CAPACITY)))
            .then_state(|state| {
                assert_eq!(state.current, StepId::BASICS);
                assert_eq!(
                    rejected(state, 1),
                    Some(RejectReason::DraftNotPersisted(StepId::CAPACITY))
                );
            })
            .run();
    }

    #[test]
    fn test_jump_past_design_needs_a_persisted_draft() {
        let mut state = unsaved();
        state.pending = scheduled_patch();

        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .given_actions([command(1, Command::JumpTo(StepId::DESIGN))])
            .when_action(command(2, Command::JumpTo(StepId::LAUNCH)))
            .then_state(|state| {
                assert_eq!(state.current, StepId::DESIGN);
                assert!(matches!(state.outcomes.get(&1), Some(Ok(Transition::Accepted))));
                assert_eq!(
                    rejected(state, 2),
                    Some(RejectReason::DraftNotPersisted(StepId::LAUNCH))
                );
                assert!(!state.draft.is_persisted());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_forward_jump_checks_waitlist() {
        let mut state = on(persisted(Monetization::Free), StepId::BASICS);
        state.pending = DraftPatch::new().capacity(Some(10)).waitlist(true, Some(20));

        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(command(1, Command::JumpTo(StepId::LAUNCH)))
            .then_state(|state| {
                assert_eq!(state.current, StepId::BASICS);
                assert_eq!(
                    rejected(state, 1),
                    Some(RejectReason::Gate(GateViolation::WaitlistExceedsCapacity {
                        waitlist: 20,
                        capacity: 10
                    }))
                );
            })
            .run();
    }

    // ========== Completion ==========

    #[test]
    fn test_mark_complete_is_idempotent() {
        let mut state = persisted(Monetization::Free);
        state.completed.insert(StepId::DESIGN);

        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(command(1, Command::MarkComplete(StepId::DESIGN)))
            .then_state(|state| {
                assert_eq!(state.completed.len(), 1);
                assert!(matches!(state.outcomes.get(&1), Some(Ok(Transition::Accepted))));
            })
            .run();
    }

    #[test]
    fn test_mark_complete_outside_topology_is_rejected() {
        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(persisted(Monetization::Free))
            .when_action(command(1, Command::MarkComplete(StepId::Sub(3, 12))))
            .then_state(|state| {
                assert!(state.completed.is_empty());
                assert_eq!(
                    rejected(state, 1),
                    Some(RejectReason::NotInTopology(StepId::Sub(3, 12)))
                );
            })
            .run();
    }

    // ========== Edits ==========

    #[test]
    fn test_switch_to_free_relocates_off_tickets() {
        let mut state = on(persisted(Monetization::Paid), StepId::TICKETS);
        state.completed.insert(StepId::TICKETS);

        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(command(
                1,
                Command::Edit(DraftPatch::new().monetization(Monetization::Free)),
            ))
            .then_state(|state| {
                assert_eq!(state.current, StepId::REGISTRATION_FORM);
                assert!(state.completed.contains(&StepId::TICKETS));
                assert_eq!(state.completion().total, 11);
                assert_eq!(state.completion().completed, 0);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    // ========== Save results ==========

    #[test]
    fn test_saved_advances_and_marks_complete() {
        let mut state = unsaved();
        let saved = {
            let mut draft = state.draft.clone().with_patch(&scheduled_patch());
            draft.id = Some(DraftId::generate());
            draft
        };
        state.in_flight = Some(InFlight {
            request: 7,
            patch: scheduled_patch(),
            intent: SaveIntent::Advance { from: StepId::BASICS },
        });

        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(WizardAction::Saved {
                request: 7,
                draft: saved,
            })
            .then_state(|state| {
                assert_eq!(state.current, StepId::DESIGN);
                assert!(state.completed.contains(&StepId::BASICS));
                assert!(state.draft.is_persisted());
                assert!(!state.is_saving());
                assert!(matches!(state.outcomes.get(&7), Some(Ok(Transition::Accepted))));
            })
            .run();
    }

    #[test]
    fn test_save_failure_restores_pending_edits() {
        let mut state = unsaved();
        state.pending = DraftPatch::new().location(Some("Hall B".into()));
        state.in_flight = Some(InFlight {
            request: 3,
            patch: scheduled_patch(),
            intent: SaveIntent::Advance { from: StepId::BASICS },
        });
        let error = DraftError::Persistence(PersistenceError::Other("connection reset".into()));

        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(WizardAction::SaveFailed {
                request: 3,
                error: error.clone(),
            })
            .then_state(move |state| {
                assert_eq!(state.current, StepId::BASICS);
                assert!(state.completed.is_empty());
                assert_eq!(
                    state.pending,
                    DraftPatch::new()
                        .location(Some("Hall B".into()))
                        .merged_over(scheduled_patch())
                );
                assert_eq!(state.outcomes.get(&3), Some(&Err(error)));
                assert!(state.last_error.is_some());
            })
            .run();
    }

    #[test]
    fn test_unmounted_session_ignores_save_result() {
        let mut state = unsaved();
        state.mounted = false;
        state.in_flight = Some(InFlight {
            request: 1,
            patch: scheduled_patch(),
            intent: SaveIntent::Advance { from: StepId::BASICS },
        });
        let mut saved = state.draft.clone();
        saved.id = Some(DraftId::generate());

        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(WizardAction::Saved { request: 1, draft: saved })
            .then_state(|state| {
                assert_eq!(state.current, StepId::BASICS);
                assert!(!state.draft.is_persisted());
                assert!(state.outcomes.is_empty());
            })
            .run();
    }

    #[test]
    fn test_finish_requires_terminal_step() {
        ReducerTest::new(WizardReducer::new())
            .with_env(create_test_env())
            .given_state(on(persisted(Monetization::Free), StepId::CHECKLIST))
            .when_action(command(1, Command::Finish))
            .then_state(|state| {
                assert_eq!(
                    rejected(state, 1),
                    Some(RejectReason::NotAtTerminal(StepId::CHECKLIST))
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
