//! Completion tracking.
//!
//! Progress is `round(100 * |completed ∩ topology| / |topology|)`. Completed
//! ids outside the topology (a ticket step marked complete before the event
//! became free) neither inflate the numerator nor change the denominator.

use crate::step::StepId;
use crate::topology::StepTopology;
use serde::Serialize;
use std::collections::BTreeSet;

/// Completion counts for display ("5 of 11 steps").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Completed steps that are in the topology
    pub completed: usize,
    /// Steps in the topology
    pub total: usize,
}

impl Completion {
    /// Count the completed members of `topology`.
    #[must_use]
    pub fn of(topology: &StepTopology, completed: &BTreeSet<StepId>) -> Self {
        Self::of_steps(topology.steps(), completed)
    }

    /// Count the completed members of an explicit step list.
    #[must_use]
    pub fn of_steps(steps: &[StepId], completed: &BTreeSet<StepId>) -> Self {
        Self {
            completed: steps.iter().filter(|step| completed.contains(*step)).count(),
            total: steps.len(),
        }
    }

    /// Rounded percentage in `0..=100`; an empty topology counts as 0.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        // Half-up rounding in integers: round(100 * c / t)
        let scaled = (200 * self.completed + self.total) / (2 * self.total);
        u8::try_from(scaled.min(100)).unwrap_or(100)
    }

    /// Whether every step in the topology is complete.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Completion percentage of `completed` against `topology`.
///
/// # Examples
///
/// ```
/// use event_wizard_core::completion::percentage;
/// use event_wizard_core::draft::Monetization;
/// use event_wizard_core::step::StepId;
/// use event_wizard_core::topology::resolve;
/// use std::collections::BTreeSet;
///
/// let completed: BTreeSet<_> = [StepId::BASICS, StepId::DESIGN].into();
/// assert_eq!(percentage(&resolve(Monetization::Free), &completed), 18);
/// ```
#[must_use]
pub fn percentage(topology: &StepTopology, completed: &BTreeSet<StepId>) -> u8 {
    Completion::of(topology, completed).percentage()
}
