//! # Railseat Core
//!
//! Core traits and types for the seat-booking client.
//!
//! Everything the client does is expressed as a reducer over a small state
//! value. The reducer never performs I/O itself; it returns [`Effect`]
//! descriptions which the runtime executes, feeding resulting actions back in.
//!
//! ## Core Concepts
//!
//! - **State**: what the view currently knows (seat snapshot, errors, flags)
//! - **Action**: user intents and effect results (`BookSeats`, `SeatsLoaded`)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a side effect description, possibly cancellable by id
//! - **Environment**: injected dependencies (backend API, clock, session)
//!
//! ## Example
//!
//! ```ignore
//! use railseat_core::*;
//!
//! impl Reducer for SeatMapReducer {
//!     type State = SeatMapState;
//!     type Action = SeatMapAction;
//!     type Environment = SeatMapEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut SeatMapState,
//!         action: SeatMapAction,
//!         env: &SeatMapEnvironment,
//!     ) -> SmallVec<[Effect<SeatMapAction>; 4]> {
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

// Re-export commonly used types
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - the core trait for client logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They are deterministic and testable without a runtime.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for client logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Most actions produce zero to two effects, so the inline
        /// capacity of four avoids a heap allocation per action.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values, not execution. When wrapped in [`Effect::Cancellable`]
/// they can be cancelled later by id.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Identifier used to cancel a group of running effects
    ///
    /// Ids are static names chosen by the reducer, e.g. `"seat-map-poll"`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EffectId(&'static str);

    impl EffectId {
        /// Create an effect id from a static name
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(name)
        }

        /// The name this id was created with
        #[must_use]
        pub const fn name(&self) -> &'static str {
            self.0
        }
    }

    impl std::fmt::Display for EffectId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Delayed action (poll timers, timeouts)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Run `effect` so that it can later be stopped with [`Effect::Cancel`]
        Cancellable {
            /// Group the running effect is registered under
            id: EffectId,
            /// The effect to run
            effect: Box<Effect<Action>>,
        },

        /// Abort every running effect registered under the id
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Register this effect under `id` so it can be cancelled
        #[must_use]
        pub fn cancellable(self, id: EffectId) -> Effect<Action> {
            Effect::Cancellable {
                id,
                effect: Box::new(self),
            }
        }

        /// Whether this is the no-op effect
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock used outside tests
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::{Effect, EffectId};
    use super::environment::{Clock, SystemClock};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Tick,
    }

    #[test]
    fn test_cancellable_wraps_effect() {
        let id = EffectId::new("poll");
        let effect = Effect::Delay {
            duration: Duration::from_millis(1500),
            action: Box::new(TestAction::Tick),
        }
        .cancellable(id);

        match effect {
            Effect::Cancellable { id: got, effect } => {
                assert_eq!(got, id);
                assert!(matches!(*effect, Effect::Delay { .. }));
            },
            other => panic!("expected cancellable, got {other:?}"),
        }
    }

    #[test]
    fn test_debug_hides_future() {
        let effect: Effect<TestAction> = Effect::Future(Box::pin(async { None }));
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");

        let cancel: Effect<TestAction> = Effect::Cancel(EffectId::new("poll"));
        assert!(format!("{cancel:?}").contains("poll"));
    }

    #[test]
    fn test_is_none() {
        assert!(Effect::<TestAction>::None.is_none());
        assert!(!Effect::<TestAction>::Cancel(EffectId::new("poll")).is_none());
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
