//! Identity provider backed by an external platform.

use crate::error::{AuthError, Result};
use crate::holder::AuthStateHolder;
use crate::providers::{IdentityBackend, IdentityProvider};
use crate::registry::{Listener, Subscription};
use crate::state::{AuthState, User};
use futures::FutureExt;
use lexicon_core::Logger;
use serde_json::json;
use std::future::Future;
use std::panic::AssertUnwindSafe;

const COMPONENT: &str = "HostedIdentity";

/// [`IdentityProvider`] over an [`IdentityBackend`].
///
/// The backend performs the remote calls; this type owns the auth state
/// and turns backend results into transitions. A panic inside the backend
/// is caught, logged, and returned as [`AuthError::Internal`].
///
/// # Example
///
/// ```no_run
/// # async fn demo() -> lexicon_identity::Result<()> {
/// use lexicon_identity::{IdentityProvider, IdentityToolkitConfig};
/// use lexicon_identity::providers::{HostedIdentityProvider, IdentityToolkitBackend, StaticIdToken};
///
/// let backend = IdentityToolkitBackend::new(
///     IdentityToolkitConfig::from_env()?,
///     StaticIdToken::new("google-id-token"),
/// )?;
/// let provider = HostedIdentityProvider::connect(backend).await;
/// let user = provider.sign_in_with_google().await?;
/// println!("signed in as {}", user.id);
/// # Ok(())
/// # }
/// ```
pub struct HostedIdentityProvider<B: IdentityBackend> {
    backend: B,
    holder: AuthStateHolder,
    log: Logger,
}

impl<B: IdentityBackend> HostedIdentityProvider<B> {
    /// Wrap `backend` and establish the first state from any persisted
    /// session.
    ///
    /// A failed restore is logged and treated as signed out.
    pub async fn connect(backend: B) -> Self {
        let log = Logger::new(COMPONENT);

        let initial = match guard(&log, "restore_session", backend.restore_session()).await {
            Ok(Some(user)) => {
                log.info_with(
                    "Restored persisted session",
                    &json!({ "user_id": user.id.as_str() }),
                );
                AuthState::SignedIn(user)
            },
            Ok(None) => {
                log.debug("No persisted session");
                AuthState::SignedOut
            },
            Err(error) => {
                log.warn_with(
                    "Session restore failed; starting signed out",
                    &json!({ "error": error.to_string() }),
                );
                AuthState::SignedOut
            },
        };

        Self {
            backend,
            holder: AuthStateHolder::with_state(COMPONENT, initial),
            log,
        }
    }

    /// The wrapped backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply a state pushed by the platform (session expiry, revocation).
    ///
    /// Listeners are only notified if the state actually changed. Returns
    /// `true` when it did.
    pub fn apply_external_state(&self, state: AuthState) -> bool {
        let changed = self.holder.set_if_changed(state);
        if changed {
            self.log.info_with(
                "Applied external auth state",
                &json!({ "signed_in": self.holder.current().is_signed_in() }),
            );
        }
        changed
    }
}

impl<B: IdentityBackend> IdentityProvider for HostedIdentityProvider<B> {
    fn current_user(&self) -> Option<User> {
        self.holder.current_user()
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.holder.subscribe(listener)
    }

    async fn sign_in_with_google(&self) -> Result<User> {
        self.log.info("Google sign-in started");

        match guard(&self.log, "sign_in_with_google", self.backend.sign_in_with_google()).await {
            Ok(user) => {
                self.holder.transition(AuthState::SignedIn(user.clone()));
                self.log.info_with(
                    "Google sign-in succeeded",
                    &json!({ "user_id": user.id.as_str() }),
                );
                Ok(user)
            },
            Err(error) => {
                self.log.error_with(
                    "Google sign-in failed",
                    &json!({ "error": error.to_string(), "kind": format!("{:?}", error.kind()) }),
                );
                Err(error)
            },
        }
    }

    async fn sign_out(&self) -> Result<()> {
        match guard(&self.log, "sign_out", self.backend.sign_out()).await {
            Ok(()) => {
                self.holder.set_if_changed(AuthState::SignedOut);
                self.log.info("Signed out");
                Ok(())
            },
            Err(error) => {
                self.log
                    .error_with("Sign-out failed", &json!({ "error": error.to_string() }));
                Err(error)
            },
        }
    }
}

impl<B: IdentityBackend + std::fmt::Debug> std::fmt::Debug for HostedIdentityProvider<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedIdentityProvider")
            .field("backend", &self.backend)
            .field("holder", &self.holder)
            .finish_non_exhaustive()
    }
}

/// Run a backend call, converting a panic into [`AuthError::Internal`].
async fn guard<T, F>(log: &Logger, operation: &'static str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(_) => {
            log.error_with(
                "Identity backend panicked",
                &json!({ "operation": operation }),
            );
            Err(AuthError::internal(format!("identity backend panicked in {operation}")))
        },
    }
}
