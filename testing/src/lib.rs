//! # Railseat Testing
//!
//! Testing utilities for reducers and stores built on `railseat-core`.
//!
//! This crate provides:
//! - A fixed clock for deterministic timestamps
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Effect assertions (cancellable timers, cancellations, futures)
//!
//! ## Example
//!
//! ```ignore
//! use railseat_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(SeatMapReducer::new())
//!     .with_env(test_environment())
//!     .given_state(SeatMapState::default())
//!     .when_action(SeatMapAction::Mount)
//!     .then_state(|state| assert_eq!(state.status(), SeatMapStatus::Loading))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use railseat_core::environment::Clock;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use railseat_testing::mocks::FixedClock;
    /// use railseat_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which cannot happen.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

mod reducer_test;

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::{assertions, ReducerTest};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
