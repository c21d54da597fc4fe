//! Observer registry for auth-state listeners.
//!
//! Listeners are kept in registration order with stable ids. Fan-out runs
//! over a snapshot taken with the registry lock released, so callbacks may
//! subscribe or unsubscribe re-entrantly.
//!
//! Cancellation is immediate: each entry carries an `active` flag that is
//! checked right before every delivery, including deliveries still pending
//! in a fan-out that is already running.

use crate::state::AuthState;
use lexicon_core::Logger;
use parking_lot::Mutex;
use serde_json::json;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Callback invoked with every auth state a listener observes.
pub type Listener = Arc<dyn Fn(&AuthState) + Send + Sync>;

/// Wrap a closure as a [`Listener`].
pub fn listener<F>(callback: F) -> Listener
where
    F: Fn(&AuthState) + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Stable identity of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Numeric value (monotonically increasing per registry).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Clone)]
struct Entry {
    id: ListenerId,
    /// Broadcasts with a sequence number at or below this predate the
    /// registration and are skipped.
    since: u64,
    active: Arc<AtomicBool>,
    callback: Listener,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Ordered collection of listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    inner: Mutex<RegistryInner>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Append a listener that should only see broadcasts after `since`.
    pub fn register(self: &Arc<Self>, callback: Listener, since: u64) -> Subscription {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = ListenerId(inner.next_id);
        let active = Arc::new(AtomicBool::new(true));

        inner.entries.push(Entry {
            id,
            since,
            active: Arc::clone(&active),
            callback,
        });

        Subscription {
            id,
            active,
            registry: Arc::downgrade(self),
        }
    }

    /// Remove a listener; returns `false` if it was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|entry| {
            if entry.id == id {
                entry.active.store(false, Ordering::SeqCst);
                false
            } else {
                true
            }
        });
        inner.entries.len() != before
    }

    /// Deactivate and drop every listener; returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.lock();
        for entry in &inner.entries {
            entry.active.store(false, Ordering::SeqCst);
        }
        let removed = inner.entries.len();
        inner.entries.clear();
        removed
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns `true` if nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a broadcast with sequence number `seq` to every listener
    /// registered before it. Returns the number of successful deliveries.
    pub fn broadcast(&self, seq: u64, state: &AuthState, log: &Logger) -> usize {
        let snapshot: Vec<Entry> = self.inner.lock().entries.clone();

        snapshot
            .iter()
            .filter(|entry| entry.since < seq)
            .filter(|entry| deliver(entry, state, log))
            .count()
    }

    /// Deliver `state` to a single listener (subscribe-time replay).
    pub fn deliver_to(&self, id: ListenerId, state: &AuthState, log: &Logger) -> bool {
        let entry = self
            .inner
            .lock()
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .cloned();

        entry.is_some_and(|entry| deliver(&entry, state, log))
    }
}

/// Invoke one callback, isolating panics.
fn deliver(entry: &Entry, state: &AuthState, log: &Logger) -> bool {
    if !entry.active.load(Ordering::SeqCst) {
        return false;
    }

    let callback = Arc::clone(&entry.callback);
    match catch_unwind(AssertUnwindSafe(|| callback(state))) {
        Ok(()) => true,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());

            log.error_with(
                "Auth state listener failed; skipping it",
                &json!({
                    "listener_id": entry.id.get(),
                    "signed_in": state.is_signed_in(),
                    "reason": reason,
                }),
            );
            false
        },
    }
}

/// Handle returned by `subscribe`; its only operation is cancellation.
///
/// Dropping the handle does **not** cancel the registration, call
/// [`Subscription::unsubscribe`] explicitly.
#[must_use = "keep the subscription to be able to cancel it"]
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    active: Arc<AtomicBool>,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    /// Registration id.
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// Returns `true` until cancelled (or until the provider was reset).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop all further notifications. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            if let Some(registry) = self.registry.upgrade() {
                registry.remove(self.id);
            }
        }
    }
}
