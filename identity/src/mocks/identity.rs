//! Mock identity provider with simulated latency and failures.

use crate::error::{AuthError, Result};
use crate::holder::AuthStateHolder;
use crate::mocks::demo_user;
use crate::providers::IdentityProvider;
use crate::registry::{Listener, Subscription};
use crate::state::{AuthState, User};
use lexicon_core::Logger;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::time::Duration;

const COMPONENT: &str = "MockIdentity";

/// Message of the simulated sign-in failure.
pub const SIMULATED_FAILURE: &str = "Mock sign-in failed (simulated network error)";

/// How the mock decides whether a sign-in fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureInjection {
    /// Fail with probability [`MockConfig::failure_rate`].
    #[default]
    Random,
    /// Every sign-in fails.
    AlwaysFail,
    /// Every sign-in succeeds.
    NeverFail,
}

/// Mock provider configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MockConfig {
    /// Simulated sign-in latency.
    ///
    /// Default: 1000 ms
    pub sign_in_delay: Duration,

    /// Simulated sign-out latency.
    ///
    /// Default: 500 ms
    pub sign_out_delay: Duration,

    /// Probability in `[0, 1]` that a random sign-in fails.
    ///
    /// Default: 0.1
    pub failure_rate: f64,

    /// User returned by a successful sign-in.
    pub user: User,

    /// RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Failure decision mode.
    ///
    /// Default: [`FailureInjection::Random`]
    pub failure_injection: FailureInjection,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            sign_in_delay: Duration::from_millis(1000),
            sign_out_delay: Duration::from_millis(500),
            failure_rate: 0.1,
            user: demo_user(),
            seed: None,
            failure_injection: FailureInjection::Random,
        }
    }
}

impl MockConfig {
    /// Set the sign-in latency.
    #[must_use]
    pub const fn with_sign_in_delay(mut self, delay: Duration) -> Self {
        self.sign_in_delay = delay;
        self
    }

    /// Set the sign-out latency.
    #[must_use]
    pub const fn with_sign_out_delay(mut self, delay: Duration) -> Self {
        self.sign_out_delay = delay;
        self
    }

    /// Remove all simulated latency.
    #[must_use]
    pub const fn without_latency(self) -> Self {
        self.with_sign_in_delay(Duration::ZERO)
            .with_sign_out_delay(Duration::ZERO)
    }

    /// Set the random failure probability (clamped to `[0, 1]`).
    #[must_use]
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        self
    }

    /// Set the user a successful sign-in yields.
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }

    /// Seed the RNG for reproducible failure sequences.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Force the failure path (or its absence).
    #[must_use]
    pub const fn with_failure_injection(mut self, injection: FailureInjection) -> Self {
        self.failure_injection = injection;
        self
    }
}

/// In-process [`IdentityProvider`] for development and tests.
///
/// Sign-in waits `sign_in_delay` and then succeeds with the configured user
/// or fails as [`AuthError::Network`]. Sign-out waits `sign_out_delay` and
/// always succeeds. Delays use `tokio::time`, so paused-clock tests run
/// instantly.
pub struct MockIdentityProvider {
    config: MockConfig,
    injection: Mutex<FailureInjection>,
    rng: Mutex<StdRng>,
    holder: AuthStateHolder,
    log: Logger,
}

impl MockIdentityProvider {
    /// Create a signed-out mock.
    #[must_use]
    pub fn new(config: MockConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Self {
            injection: Mutex::new(config.failure_injection),
            rng: Mutex::new(rng),
            config,
            holder: AuthStateHolder::new(COMPONENT),
            log: Logger::new(COMPONENT),
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Switch the failure mode at runtime.
    pub fn set_failure_injection(&self, injection: FailureInjection) {
        *self.injection.lock() = injection;
    }

    /// Number of live registrations.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.holder.listener_count()
    }

    /// Back to signed out **without notifying**; all registrations are
    /// dropped and their handles become inert.
    pub fn reset(&self) {
        self.holder.reset();
        self.log.info("Mock state reset");
    }

    /// Flip between signed out and the configured user immediately,
    /// notifying listeners. Returns the new state.
    pub fn toggle_auth_state(&self) -> AuthState {
        let user = self.config.user.clone();
        let next = self.holder.replace_with(move |current| {
            if current.is_signed_in() {
                AuthState::SignedOut
            } else {
                AuthState::SignedIn(user)
            }
        });

        self.log.info_with(
            "Auth state toggled",
            &json!({ "signed_in": next.is_signed_in() }),
        );
        next
    }

    fn should_fail(&self) -> bool {
        match *self.injection.lock() {
            FailureInjection::AlwaysFail => true,
            FailureInjection::NeverFail => false,
            FailureInjection::Random => self.rng.lock().r#gen::<f64>() < self.config.failure_rate,
        }
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn current_user(&self) -> Option<User> {
        self.holder.current_user()
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.holder.subscribe(listener)
    }

    async fn sign_in_with_google(&self) -> Result<User> {
        self.log.info_with(
            "Mock Google sign-in started",
            &json!({
                "delay_ms": u64::try_from(self.config.sign_in_delay.as_millis()).unwrap_or(u64::MAX)
            }),
        );

        tokio::time::sleep(self.config.sign_in_delay).await;

        if self.should_fail() {
            self.log.error(SIMULATED_FAILURE);
            return Err(AuthError::network(SIMULATED_FAILURE));
        }

        let user = self.config.user.clone();
        self.holder.transition(AuthState::SignedIn(user.clone()));
        self.log.info_with(
            "Mock Google sign-in succeeded",
            &json!({ "user_id": user.id.as_str() }),
        );
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        self.log.info("Mock sign-out started");

        tokio::time::sleep(self.config.sign_out_delay).await;

        if self.holder.set_if_changed(AuthState::SignedOut) {
            self.log.info("Mock sign-out succeeded");
        } else {
            self.log.debug("Mock sign-out while already signed out");
        }
        Ok(())
    }
}

impl std::fmt::Debug for MockIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockIdentityProvider")
            .field("config", &self.config)
            .field("holder", &self.holder)
            .finish_non_exhaustive()
    }
}
