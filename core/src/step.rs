//! Wizard step identifiers.
//!
//! A step is either a major step (`1`, `2`, `3`, `4`) or a dotted sub-step of
//! the registration major step (`3.1` … `3.9`). Both are represented by the
//! single [`StepId`] type so ordering and parsing are defined in one place.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for `StepId` parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid step id: {0:?}")]
pub struct ParseStepIdError(String);

/// Identifier of a wizard step.
///
/// # Ordering
///
/// Sub-steps sort after their parent major step and before the next major
/// step: `2 < 3 < 3.1 < 3.9 < 4`.
///
/// # Examples
///
/// ```
/// use event_wizard_core::step::StepId;
///
/// let tickets: StepId = "3.1".parse().unwrap();
/// assert_eq!(tickets, StepId::TICKETS);
/// assert_eq!(tickets.to_string(), "3.1");
/// assert!(StepId::DESIGN < tickets && tickets < StepId::LAUNCH);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StepId {
    /// A top-level step
    Major(u8),
    /// A sub-step `major.minor`
    Sub(u8, u8),
}

impl StepId {
    /// `1`: event basics (name, dates, location)
    pub const BASICS: Self = Self::Major(1);
    /// `2`: design and branding
    pub const DESIGN: Self = Self::Major(2);
    /// `3`: registration (only reachable through its sub-steps)
    pub const REGISTRATION: Self = Self::Major(3);
    /// `3.1`: tickets (absent for free events)
    pub const TICKETS: Self = Self::Sub(3, 1);
    /// `3.2`: registration form
    pub const REGISTRATION_FORM: Self = Self::Sub(3, 2);
    /// `3.3`: attendee capacity
    pub const CAPACITY: Self = Self::Sub(3, 3);
    /// `3.4`: waitlist
    pub const WAITLIST: Self = Self::Sub(3, 4);
    /// `3.5`: check-in
    pub const CHECK_IN: Self = Self::Sub(3, 5);
    /// `3.6`: badges
    pub const BADGES: Self = Self::Sub(3, 6);
    /// `3.7`: emails
    pub const EMAILS: Self = Self::Sub(3, 7);
    /// `3.8`: attendees
    pub const ATTENDEES: Self = Self::Sub(3, 8);
    /// `3.9`: checklist
    pub const CHECKLIST: Self = Self::Sub(3, 9);
    /// `4`: launch / review (terminal)
    pub const LAUNCH: Self = Self::Major(4);

    /// The major step number.
    #[must_use]
    pub const fn major(self) -> u8 {
        match self {
            Self::Major(major) | Self::Sub(major, _) => major,
        }
    }

    /// The sub-step number, if this is a sub-step.
    #[must_use]
    pub const fn minor(self) -> Option<u8> {
        match self {
            Self::Major(_) => None,
            Self::Sub(_, minor) => Some(minor),
        }
    }

    /// Whether this is a sub-step.
    #[must_use]
    pub const fn is_sub_step(self) -> bool {
        matches!(self, Self::Sub(..))
    }

    /// The major step this id belongs to (itself for a major step).
    #[must_use]
    pub const fn parent(self) -> Self {
        Self::Major(self.major())
    }

    /// Human readable name of a known step.
    ///
    /// Returns `None` for ids outside the wizard.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Major(1) => Some("basics"),
            Self::Major(2) => Some("design"),
            Self::Major(3) => Some("registration"),
            Self::Sub(3, 1) => Some("tickets"),
            Self::Sub(3, 2) => Some("registration form"),
            Self::Sub(3, 3) => Some("attendee capacity"),
            Self::Sub(3, 4) => Some("waitlist"),
            Self::Sub(3, 5) => Some("check-in"),
            Self::Sub(3, 6) => Some("badges"),
            Self::Sub(3, 7) => Some("emails"),
            Self::Sub(3, 8) => Some("attendees"),
            Self::Sub(3, 9) => Some("checklist"),
            Self::Major(4) => Some("launch"),
            _ => None,
        }
    }

    // Major steps sort before their own sub-steps.
    const fn sort_key(self) -> (u8, u8, u8) {
        match self {
            Self::Major(major) => (major, 0, 0),
            Self::Sub(major, minor) => (major, 1, minor),
        }
    }
}

impl Ord for StepId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for StepId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major(major) => write!(f, "{major}"),
            Self::Sub(major, minor) => write!(f, "{major}.{minor}"),
        }
    }
}

impl FromStr for StepId {
    type Err = ParseStepIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseStepIdError(s.to_string());
        let trimmed = s.trim();

        match trimmed.split_once('.') {
            None => trimmed.parse().map(Self::Major).map_err(|_| invalid()),
            Some((major, minor)) => {
                let major = major.parse().map_err(|_| invalid())?;
                let minor = minor.parse().map_err(|_| invalid())?;
                Ok(Self::Sub(major, minor))
            },
        }
    }
}

impl TryFrom<String> for StepId {
    type Error = ParseStepIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StepId> for String {
    fn from(id: StepId) -> Self {
        id.to_string()
    }
}
