//! Scripted identity backend.

use crate::error::{AuthError, Result};
use crate::mocks::demo_user;
use crate::providers::IdentityBackend;
use crate::state::User;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// [`IdentityBackend`] that replays queued results.
///
/// Sign-in results are consumed in order; once the queue is empty every
/// sign-in succeeds with [`demo_user`].
#[derive(Debug, Default)]
pub struct MockIdentityBackend {
    sign_in_results: Mutex<VecDeque<Result<User>>>,
    sign_out_error: Mutex<Option<AuthError>>,
    persisted: Mutex<Option<Result<Option<User>>>>,
    sign_in_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl MockIdentityBackend {
    /// Backend with no persisted session whose sign-ins all succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a session for `user` survived from a previous run.
    #[must_use]
    pub fn with_session(self, user: User) -> Self {
        *self.persisted.lock() = Some(Ok(Some(user)));
        self
    }

    /// Make session restore fail with `error`.
    #[must_use]
    pub fn with_restore_error(self, error: AuthError) -> Self {
        *self.persisted.lock() = Some(Err(error));
        self
    }

    /// Queue the result of the next unscripted sign-in.
    #[must_use]
    pub fn then_sign_in(self, result: Result<User>) -> Self {
        self.sign_in_results.lock().push_back(result);
        self
    }

    /// Make every sign-out fail with `error`.
    #[must_use]
    pub fn with_sign_out_error(self, error: AuthError) -> Self {
        *self.sign_out_error.lock() = Some(error);
        self
    }

    /// Number of sign-in calls so far.
    #[must_use]
    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    /// Number of sign-out calls so far.
    #[must_use]
    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

impl IdentityBackend for MockIdentityBackend {
    async fn sign_in_with_google(&self) -> Result<User> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.sign_in_results.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(demo_user()))
    }

    async fn sign_out(&self) -> Result<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        let error = self.sign_out_error.lock().clone();
        error.map_or(Ok(()), Err)
    }

    async fn restore_session(&self) -> Result<Option<User>> {
        let persisted = self.persisted.lock().take();
        persisted.unwrap_or(Ok(None))
    }
}
