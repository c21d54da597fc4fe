//! Property tests over random sign-in/sign-out sequences.

#![allow(clippy::unwrap_used)]

use lexicon_identity::mocks::{FailureInjection, MockConfig, MockIdentityProvider, demo_user};
use lexicon_identity::{AuthState, IdentityProvider, listener};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum Op {
    SignIn { succeeds: bool },
    SignOut,
    Toggle,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(|succeeds| Op::SignIn { succeeds }),
        Just(Op::SignOut),
        Just(Op::Toggle),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn last_successful_transition_wins(ops in prop::collection::vec(op(), 0..24)) {
        let mock = MockIdentityProvider::new(MockConfig::default().with_seed(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = mock.subscribe(listener(move |state| sink.lock().push(state.clone())));

        let mut expected = None;
        runtime().block_on(async {
            for op in &ops {
                match *op {
                    Op::SignIn { succeeds } => {
                        mock.set_failure_injection(if succeeds {
                            FailureInjection::NeverFail
                        } else {
                            FailureInjection::AlwaysFail
                        });
                        if mock.sign_in_with_google().await.is_ok() {
                            expected = Some(demo_user());
                        }
                    },
                    Op::SignOut => {
                        mock.sign_out().await.unwrap();
                        expected = None;
                    },
                    Op::Toggle => {
                        expected = mock.toggle_auth_state().into_user();
                    },
                }
            }
        });

        prop_assert_eq!(mock.current_user(), expected.clone());

        // First observation is the replay, the last one is the current state.
        let seen = seen.lock();
        prop_assert_eq!(seen.first(), Some(&AuthState::SignedOut));
        prop_assert_eq!(seen.last(), Some(&AuthState::from(expected)));
    }
}
