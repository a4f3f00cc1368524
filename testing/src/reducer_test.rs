//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use railseat_core::{effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// Several actions may be given with [`ReducerTest::when_action`]; they are
/// reduced in order and the effect assertions see the effects of the last one.
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an action to reduce (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the effects of the last action (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use railseat_core::effect::{Effect, EffectId};

    fn flatten<A>(effects: &[Effect<A>]) -> Vec<&Effect<A>> {
        let mut out = Vec::new();
        for effect in effects {
            match effect {
                Effect::Cancellable { effect, .. } => {
                    out.extend(flatten(std::slice::from_ref(effect.as_ref())));
                },
                other => out.push(other),
            }
        }
        out
    }

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if effects contains anything other than `Effect::None`.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one Future effect, cancellable or not
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            flatten(effects)
                .iter()
                .any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }

    /// Count Future effects, cancellable or not
    #[must_use]
    pub fn count_future_effects<A>(effects: &[Effect<A>]) -> usize {
        flatten(effects)
            .iter()
            .filter(|e| matches!(e, Effect::Future(_)))
            .count()
    }

    /// Assert that an effect is registered as cancellable under `id`
    ///
    /// # Panics
    ///
    /// Panics if no `Cancellable` effect with that id is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_cancellable<A>(effects: &[Effect<A>], id: EffectId) {
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, Effect::Cancellable { id: got, .. } if *got == id)),
            "Expected a cancellable effect registered under {id}"
        );
    }

    /// Assert that effects cancel `id`
    ///
    /// # Panics
    ///
    /// Panics if no `Cancel` effect for that id is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_cancels<A>(effects: &[Effect<A>], id: EffectId) {
        assert!(
            flatten(effects)
                .iter()
                .any(|e| matches!(e, Effect::Cancel(got) if *got == id)),
            "Expected a cancellation of {id}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railseat_core::effect::{Effect, EffectId};
    use railseat_core::reducer::Reducer;
    use railseat_core::{smallvec, SmallVec};
    use std::time::Duration;

    const TIMER: EffectId = EffectId::new("timer");

    #[derive(Clone, Debug)]
    struct TestState {
        ticks: u32,
        running: bool,
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Start,
        Tick,
        Stop,
    }

    struct TestReducer;

    struct TestEnv;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Start => {
                    state.running = true;
                    smallvec![Effect::Delay {
                        duration: Duration::from_secs(1),
                        action: Box::new(TestAction::Tick),
                    }
                    .cancellable(TIMER)]
                },
                TestAction::Tick => {
                    state.ticks += 1;
                    smallvec![Effect::Future(Box::pin(async { None }))]
                },
                TestAction::Stop => {
                    state.running = false;
                    smallvec![Effect::Cancel(TIMER)]
                },
            }
        }
    }

    #[test]
    fn test_start_registers_timer() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { ticks: 0, running: false })
            .when_action(TestAction::Start)
            .then_state(|state| assert!(state.running))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_cancellable(effects, TIMER);
            })
            .run();
    }

    #[test]
    fn test_actions_reduce_in_order() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { ticks: 0, running: false })
            .when_action(TestAction::Start)
            .when_action(TestAction::Tick)
            .when_action(TestAction::Stop)
            .then_state(|state| {
                assert_eq!(state.ticks, 1);
                assert!(!state.running);
            })
            .then_effects(|effects| assertions::assert_cancels(effects, TIMER))
            .run();
    }

    #[test]
    fn test_future_assertions() {
        let effects = vec![
            Effect::Future(Box::pin(async { Some(TestAction::Tick) })).cancellable(TIMER),
            Effect::<TestAction>::None,
        ];
        assertions::assert_has_future_effect(&effects);
        assert_eq!(assertions::count_future_effects(&effects), 1);
    }

    #[test]
    fn test_assertions_no_effects() {
        assertions::assert_no_effects::<TestAction>(&[Effect::None]);
        assertions::assert_no_effects::<TestAction>(&[]);
    }
}
