//! Given-When-Then harness for reducers
//!
//! Runs a reducer directly (no Store, no runtime) against a starting state
//! and a sequence of actions, then checks the final state and the effects
//! returned by the last action.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use lexicon_core::{effect::Effect, reducer::Reducer};

type StateAssertion<S> = Box<dyn FnOnce(&S)>;
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers
///
/// # Example
///
/// ```ignore
/// ReducerTest::new(PageReducer)
///     .with_env(test_environment())
///     .given_state(PageState::default())
///     .when_action(PageAction::AuthStateChanged(AuthState::SignedOut))
///     .then_state(|state| assert!(state.notices.is_empty()))
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
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

    /// Append an action (When). May be called repeatedly.
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Append several actions, reduced in order
    #[must_use]
    pub fn when_actions(mut self, actions: impl IntoIterator<Item = A>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Add an assertion about the final state (Then)
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
    /// Panics if initial state, environment or at least one action is not
    /// set, or if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

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
    use lexicon_core::effect::Effect;
    use std::time::Duration;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if any effect other than [`Effect::None`] is present.
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

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }

    /// Return the first delayed action and its duration
    ///
    /// # Panics
    ///
    /// Panics if no Delay effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn expect_delay<A>(effects: &[Effect<A>]) -> (Duration, &A) {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::Delay { duration, action } => Some((*duration, action.as_ref())),
                _ => None,
            })
            .unwrap_or_else(|| panic!("Expected a Delay effect, but none found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexicon_core::{SmallVec, smallvec};
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Flash(&'static str),
        Clear,
    }

    #[derive(Clone, Debug, Default)]
    struct TestState {
        banner: Option<&'static str>,
    }

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = Duration;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            ttl: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Flash(text) => {
                    state.banner = Some(text);
                    smallvec![Effect::Delay {
                        duration: *ttl,
                        action: Box::new(TestAction::Clear),
                    }]
                },
                TestAction::Clear => {
                    state.banner = None;
                    smallvec![Effect::None]
                },
            }
        }
    }

    #[test]
    fn test_single_action_with_delay() {
        ReducerTest::new(TestReducer)
            .with_env(Duration::from_secs(3))
            .given_state(TestState::default())
            .when_action(TestAction::Flash("saved"))
            .then_state(|state| assert_eq!(state.banner, Some("saved")))
            .then_effects(|effects| {
                let (duration, action) = assertions::expect_delay(effects);
                assert_eq!(duration, Duration::from_secs(3));
                assert_eq!(action, &TestAction::Clear);
            })
            .run();
    }

    #[test]
    fn test_action_sequence_reports_last_effects() {
        ReducerTest::new(TestReducer)
            .with_env(Duration::from_secs(1))
            .given_state(TestState::default())
            .when_actions([TestAction::Flash("a"), TestAction::Clear])
            .then_state(|state| assert!(state.banner.is_none()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_assertions_effects_count() {
        assertions::assert_effects_count(&[Effect::<TestAction>::None], 1);
        assertions::assert_effects_count::<TestAction>(&[], 0);
        assertions::assert_has_future_effect(&[Effect::<TestAction>::future(async { None })]);
    }
}
