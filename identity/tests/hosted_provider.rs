//! Tests for the hosted provider over a scripted backend.

#![allow(clippy::unwrap_used, clippy::panic)]

use lexicon_identity::mocks::{MockIdentityBackend, demo_user};
use lexicon_identity::providers::HostedIdentityProvider;
use lexicon_identity::{
    AuthError, AuthState, IdentityBackend, IdentityProvider, Listener, Result, User, listener,
};
use lexicon_testing::LogCapture;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::Level;

fn recorder() -> (Listener, Arc<Mutex<Vec<AuthState>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (listener(move |state| sink.lock().push(state.clone())), seen)
}

fn ann() -> User {
    User::new("ann-1").with_display_name("Ann").with_email("ann@example.com")
}

#[tokio::test]
async fn connect_restores_persisted_session() {
    let provider = HostedIdentityProvider::connect(MockIdentityBackend::new().with_session(ann())).await;
    let (callback, seen) = recorder();

    let _sub = provider.subscribe(callback);

    assert_eq!(*seen.lock(), vec![AuthState::SignedIn(ann())]);
    assert!(provider.is_authenticated());
}

#[tokio::test]
async fn failed_restore_starts_signed_out_and_warns() {
    let logs = LogCapture::new();
    let _guard = logs.install();

    let provider = HostedIdentityProvider::connect(
        MockIdentityBackend::new().with_restore_error(AuthError::network("offline")),
    )
    .await;

    assert!(provider.current_user().is_none());
    assert!(logs.contains(Level::WARN, "HostedIdentity", "restore failed"));
}

#[tokio::test]
async fn sign_in_transitions_and_notifies_before_resolving() {
    let provider = HostedIdentityProvider::connect(MockIdentityBackend::new()).await;
    let (callback, seen) = recorder();
    let _sub = provider.subscribe(callback);

    let user = provider.sign_in_with_google().await.unwrap();

    assert_eq!(user, demo_user());
    assert_eq!(
        *seen.lock(),
        vec![AuthState::SignedOut, AuthState::SignedIn(demo_user())]
    );
    assert_eq!(provider.backend().sign_in_calls(), 1);
}

#[tokio::test]
async fn backend_failure_is_returned_without_notification() {
    let backend = MockIdentityBackend::new().then_sign_in(Err(AuthError::PopupClosed));
    let provider = HostedIdentityProvider::connect(backend).await;
    let (callback, seen) = recorder();
    let _sub = provider.subscribe(callback);

    let error = provider.sign_in_with_google().await.unwrap_err();

    assert_eq!(error, AuthError::PopupClosed);
    assert_eq!(seen.lock().len(), 1);
    assert!(!provider.is_authenticated());

    // The script is exhausted; the next attempt succeeds.
    provider.sign_in_with_google().await.unwrap();
    assert!(provider.is_authenticated());
}

#[tokio::test]
async fn failed_sign_out_keeps_the_session() {
    let backend = MockIdentityBackend::new()
        .with_session(ann())
        .with_sign_out_error(AuthError::network("offline"));
    let provider = HostedIdentityProvider::connect(backend).await;

    assert!(provider.sign_out().await.is_err());
    assert_eq!(provider.current_user(), Some(ann()));
}

#[tokio::test]
async fn sign_out_while_signed_out_emits_nothing() {
    let provider = HostedIdentityProvider::connect(MockIdentityBackend::new()).await;
    let (callback, seen) = recorder();
    let _sub = provider.subscribe(callback);

    provider.sign_out().await.unwrap();

    assert_eq!(seen.lock().len(), 1);
    assert_eq!(provider.backend().sign_out_calls(), 1);
}

#[tokio::test]
async fn external_state_only_notifies_on_change() {
    let provider = HostedIdentityProvider::connect(MockIdentityBackend::new().with_session(ann())).await;
    let (callback, seen) = recorder();
    let _sub = provider.subscribe(callback);

    assert!(!provider.apply_external_state(AuthState::SignedIn(ann())));
    assert!(provider.apply_external_state(AuthState::SignedOut));
    assert!(!provider.apply_external_state(AuthState::SignedOut));

    assert_eq!(
        *seen.lock(),
        vec![AuthState::SignedIn(ann()), AuthState::SignedOut]
    );
}

struct PanickingBackend;

impl IdentityBackend for PanickingBackend {
    async fn sign_in_with_google(&self) -> Result<User> {
        panic!("backend bug");
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }

    async fn restore_session(&self) -> Result<Option<User>> {
        Ok(None)
    }
}

#[tokio::test]
async fn backend_panic_becomes_internal_error() {
    let logs = LogCapture::new();
    let _guard = logs.install();
    let provider = HostedIdentityProvider::connect(PanickingBackend).await;

    let error = provider.sign_in_with_google().await.unwrap_err();

    assert!(matches!(error, AuthError::Internal(_)));
    assert_eq!(error.user_message(), "Something went wrong. Please try again.");
    assert!(!provider.is_authenticated());
    assert!(logs.contains(Level::ERROR, "HostedIdentity", "panicked"));
}
