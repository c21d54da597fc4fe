//! Owned auth-state holder shared by every adapter.
//!
//! The holder keeps exactly one current [`AuthState`] and fans every
//! transition out to the [`ListenerRegistry`].
//!
//! # Ordering
//!
//! Transitions and subscribe-time replays are serialized by a re-entrant
//! delivery lock and a sequenced delivery queue:
//!
//! - A thread that holds the delivery lock drains the queue to completion,
//!   so other threads never interleave their transitions into a fan-out.
//! - A transition requested from inside a listener callback (same thread,
//!   lock re-entered) is appended to the queue instead of being delivered
//!   nested. Every listener therefore finishes observing state `n` before
//!   any listener observes state `n + 1`.
//! - A listener registered while transition `n` is pending only receives
//!   its replay (already reflecting `n`) and transitions after `n`.

use crate::registry::{Listener, ListenerId, ListenerRegistry, Subscription};
use crate::state::{AuthState, User};
use lexicon_core::Logger;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;

enum Delivery {
    Broadcast { seq: u64, state: AuthState },
    Replay { id: ListenerId, state: AuthState },
}

#[derive(Default)]
struct DeliveryQueue {
    seq: u64,
    draining: bool,
    pending: VecDeque<Delivery>,
}

/// Current auth state plus its listeners.
///
/// Adapters compose one holder each; there is no process-wide instance.
pub struct AuthStateHolder {
    current: RwLock<AuthState>,
    registry: Arc<ListenerRegistry>,
    delivery: ReentrantMutex<()>,
    queue: Mutex<DeliveryQueue>,
    log: Logger,
}

impl AuthStateHolder {
    /// Create a holder starting in `SignedOut`, logging as `component`.
    #[must_use]
    pub fn new(component: &'static str) -> Self {
        Self::with_state(component, AuthState::SignedOut)
    }

    /// Create a holder starting in `initial`.
    #[must_use]
    pub fn with_state(component: &'static str, initial: AuthState) -> Self {
        Self {
            current: RwLock::new(initial),
            registry: ListenerRegistry::new(),
            delivery: ReentrantMutex::new(()),
            queue: Mutex::new(DeliveryQueue::default()),
            log: Logger::new(component),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> AuthState {
        self.current.read().clone()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.current.read().user().cloned()
    }

    /// Number of live registrations.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    /// Register `listener` and replay the current state to it.
    ///
    /// When called from inside a callback the replay is queued behind the
    /// deliveries already pending and runs before this call's caller
    /// regains control of the outermost fan-out.
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let _delivery = self.delivery.lock();

        let (subscription, start) = {
            let mut queue = self.queue.lock();
            let subscription = self.registry.register(listener, queue.seq);
            let state = self.current.read().clone();
            queue.pending.push_back(Delivery::Replay {
                id: subscription.id(),
                state,
            });
            (subscription, Self::claim(&mut queue))
        };

        self.log.debug_with(
            "Listener registered",
            &json!({ "listener_id": subscription.id().get() }),
        );

        if start {
            self.drain();
        }
        subscription
    }

    /// Store `next` and notify every listener, even if unchanged.
    pub fn transition(&self, next: AuthState) {
        self.update(|_| Some(next));
    }

    /// Store `next` and notify only if it differs from the current state.
    ///
    /// Returns `true` if a transition happened.
    pub fn set_if_changed(&self, next: AuthState) -> bool {
        self.update(|current| (*current != next).then_some(next))
            .is_some()
    }

    /// Compute the next state from the current one and notify.
    ///
    /// The read and the write happen atomically with respect to other
    /// transitions.
    pub fn replace_with<F>(&self, next: F) -> AuthState
    where
        F: FnOnce(&AuthState) -> AuthState,
    {
        self.update(|current| Some(next(current)))
            .unwrap_or_default()
    }

    /// Back to `SignedOut` without notifying; every registration is dropped.
    pub fn reset(&self) {
        let _delivery = self.delivery.lock();
        let mut queue = self.queue.lock();
        *self.current.write() = AuthState::SignedOut;
        queue.pending.clear();
        let removed = self.registry.clear();
        drop(queue);

        self.log
            .debug_with("State reset", &json!({ "listeners_removed": removed }));
    }

    fn update<F>(&self, decide: F) -> Option<AuthState>
    where
        F: FnOnce(&AuthState) -> Option<AuthState>,
    {
        let _delivery = self.delivery.lock();

        let (state, start) = {
            let mut queue = self.queue.lock();
            let next = {
                let mut current = self.current.write();
                let next = decide(&current)?;
                *current = next.clone();
                next
            };
            queue.seq += 1;
            let seq = queue.seq;
            queue.pending.push_back(Delivery::Broadcast {
                seq,
                state: next.clone(),
            });
            (next, Self::claim(&mut queue))
        };

        self.log.debug_with(
            "Auth state transition",
            &json!({
                "signed_in": state.is_signed_in(),
                "user_id": state.user().map(|user| user.id.as_str()),
            }),
        );

        if start {
            self.drain();
        }
        Some(state)
    }

    /// Take the drain role if nobody on this thread holds it yet.
    fn claim(queue: &mut DeliveryQueue) -> bool {
        if queue.draining {
            false
        } else {
            queue.draining = true;
            true
        }
    }

    fn drain(&self) {
        loop {
            let next = {
                let mut queue = self.queue.lock();
                if let Some(delivery) = queue.pending.pop_front() {
                    delivery
                } else {
                    queue.draining = false;
                    return;
                }
            };

            match next {
                Delivery::Broadcast { seq, state } => {
                    self.registry.broadcast(seq, &state, &self.log);
                },
                Delivery::Replay { id, state } => {
                    self.registry.deliver_to(id, &state, &self.log);
                },
            }
        }
    }
}

impl std::fmt::Debug for AuthStateHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStateHolder")
            .field("current", &*self.current.read())
            .field("listeners", &self.registry.len())
            .finish_non_exhaustive()
    }
}
