//! # Event Wizard Testing
//!
//! In-memory doubles for the draft store and clock, the [`ReducerTest`]
//! harness, and proptest strategies over wizard types.
//!
//! ```ignore
//! use event_wizard_testing::{InMemoryDraftStore, test_clock};
//!
//! #[tokio::test]
//! async fn test_first_save() {
//!     let store = InMemoryDraftStore::new();
//!     let repository = DraftRepository::new(
//!         Arc::new(store.clone()),
//!         Arc::new(InMemoryDraftCache::new()),
//!         Arc::new(test_clock()),
//!     );
//!
//!     repository.save(&draft, DraftPatch::new().name("Gala")).await?;
//!     assert_eq!(store.insert_count(), 2); // referential failure, then success
//!     assert_eq!(store.create_owner_calls(), 1);
//! }
//! ```

use chrono::{DateTime, TimeZone, Utc};
use event_wizard_core::environment::Clock;

pub mod draft_store;

/// Test doubles for injected collaborators.
pub mod mocks {
    use super::{Clock, DateTime, TimeZone, Utc};

    /// A clock that never moves, so saved timestamps are predictable.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use event_wizard_core::environment::Clock;
    /// use event_wizard_testing::mocks::FixedClock;
    ///
    /// let noon = Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap();
    /// let clock = FixedClock::new(noon);
    /// assert_eq!(clock.now(), noon);
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FixedClock(DateTime<Utc>);

    impl FixedClock {
        /// Stopped at `time`.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self(time)
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    /// The clock every fixture uses: midnight UTC, 1 January 2026.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        let new_year = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single();
        FixedClock::new(new_year.unwrap_or_default())
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use event_wizard_core::draft::{DraftPatch, Monetization};
    use event_wizard_core::step::StepId;
    use event_wizard_core::topology::MASTER_SEQUENCE;
    use proptest::prelude::*;

    /// Any monetization category.
    pub fn monetization() -> impl Strategy<Value = Monetization> {
        prop_oneof![
            Just(Monetization::Free),
            Just(Monetization::Paid),
            Just(Monetization::Continuous),
        ]
    }

    /// A step id from the master sequence.
    pub fn known_step() -> impl Strategy<Value = StepId> {
        proptest::sample::select(MASTER_SEQUENCE.to_vec())
    }

    /// Known ids mixed with arbitrary, mostly unknown ones.
    pub fn step_id() -> impl Strategy<Value = StepId> {
        prop_oneof![
            known_step(),
            (0u8..10).prop_map(StepId::Major),
            (0u8..10, 0u8..15).prop_map(|(major, minor)| StepId::Sub(major, minor)),
        ]
    }

    /// Name-only patches, including blank and padded names.
    pub fn name_patch() -> impl Strategy<Value = DraftPatch> {
        prop_oneof![
            Just(DraftPatch::new()),
            "[ ]{0,3}".prop_map(|name| DraftPatch::new().name(name)),
            "[ ]{0,2}[A-Za-z][A-Za-z ]{0,20}".prop_map(|name| DraftPatch::new().name(name)),
        ]
    }
}

pub use draft_store::InMemoryDraftStore;
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
