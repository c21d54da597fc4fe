//! Identity provider traits.
//!
//! [`IdentityProvider`] is what the page layer depends on. Both the hosted
//! adapter and the mock implement it; callers are generic over it so tests
//! substitute the mock without touching call sites.
//!
//! [`IdentityBackend`] is the narrower seam beneath the hosted adapter: the
//! calls that actually reach the external identity platform.
//!
//! ```text
//! PageController ──► IdentityProvider
//!                     ├── HostedIdentityProvider ──► IdentityBackend
//!                     │                               └── IdentityToolkitBackend (reqwest)
//!                     └── MockIdentityProvider
//! ```

use crate::error::Result;
use crate::registry::{Listener, Subscription, listener};
use crate::state::{AuthState, User};
use parking_lot::Mutex;
use std::future::Future;
use tokio::sync::oneshot;

pub mod hosted;
pub mod toolkit;

pub use hosted::HostedIdentityProvider;
pub use toolkit::{GoogleCredentialSource, IdentityToolkitBackend, StaticIdToken};

/// Authentication adapter.
///
/// # Contract
///
/// - [`subscribe`](Self::subscribe) invokes the listener synchronously with
///   the current state (even `SignedOut`) before returning, then once per
///   transition, in order.
/// - A successful sign-in or sign-out has notified every listener before
///   its future resolves.
/// - A failed operation leaves the state untouched and notifies nobody.
pub trait IdentityProvider: Send + Sync {
    /// Synchronous snapshot of the signed-in user.
    fn current_user(&self) -> Option<User>;

    /// Whether somebody is signed in right now.
    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Register `listener` for the current state and every later transition.
    fn subscribe(&self, listener: Listener) -> Subscription;

    /// Run the Google sign-in flow.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`](crate::AuthError) describing why the flow
    /// failed (network, cancelled consent, rejected credential, ...).
    fn sign_in_with_google(&self) -> impl Future<Output = Result<User>> + Send;

    /// End the session.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`](crate::AuthError) if the platform refused.
    fn sign_out(&self) -> impl Future<Output = Result<()>> + Send;

    /// Resolve with the first state delivered to a fresh subscription.
    ///
    /// The internal subscription is released when the future resolves or
    /// is dropped, whichever comes first.
    fn wait_for_auth_state(&self) -> impl Future<Output = AuthState> + Send {
        let (tx, rx) = oneshot::channel();
        let slot = Mutex::new(Some(tx));

        let guard = UnsubscribeOnDrop(self.subscribe(listener(move |state| {
            if let Some(tx) = slot.lock().take() {
                // Receiver gone means the waiter was dropped.
                let _ = tx.send(state.clone());
            }
        })));

        async move {
            let state = rx.await.unwrap_or_default();
            drop(guard);
            state
        }
    }
}

/// Cancels the wrapped subscription when dropped.
struct UnsubscribeOnDrop(Subscription);

impl Drop for UnsubscribeOnDrop {
    fn drop(&mut self) {
        self.0.unsubscribe();
    }
}

/// Calls that reach the external identity platform.
///
/// Implementations only talk to the platform; they never touch listeners.
/// [`HostedIdentityProvider`] turns their results into transitions.
pub trait IdentityBackend: Send + Sync + 'static {
    /// Obtain a Google credential and exchange it for a platform session.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`](crate::AuthError) on any failure.
    fn sign_in_with_google(&self) -> impl Future<Output = Result<User>> + Send;

    /// Terminate the platform session.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`](crate::AuthError) on any failure.
    fn sign_out(&self) -> impl Future<Output = Result<()>> + Send;

    /// Look up a persisted session, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`](crate::AuthError) if the lookup failed.
    fn restore_session(&self) -> impl Future<Output = Result<Option<User>>> + Send;
}
