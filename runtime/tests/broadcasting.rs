//! Integration tests for Store action broadcasting
//!
//! Observers of effect-produced actions (the page's notice region, for one)
//! rely on two things: every fed-back action is announced, and it is
//! announced only after the store has reduced it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code

use lexicon_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use lexicon_runtime::Store;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Raise a banner that expires after `ttl`
    Raise { id: u64, ttl: Duration },
    /// Banner expired
    Expired { id: u64 },
    /// Emit `n` follow-up actions at once
    Flood { n: u64 },
    /// Follow-up of `Flood`
    Ping { seq: u64 },
}

#[derive(Debug, Clone, Default)]
struct TestState {
    visible: Vec<u64>,
    pings: u64,
}

#[derive(Clone)]
struct TestReducer;

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::Raise { id, ttl } => {
                state.visible.push(id);
                smallvec![Effect::Delay {
                    duration: ttl,
                    action: Box::new(TestAction::Expired { id }),
                }]
            },
            TestAction::Expired { id } => {
                state.visible.retain(|visible| *visible != id);
                smallvec![Effect::None]
            },
            TestAction::Flood { n } => smallvec![Effect::merge(
                (0..n)
                    .map(|seq| Effect::future(async move { Some(TestAction::Ping { seq }) }))
                    .collect()
            )],
            TestAction::Ping { .. } => {
                state.pings += 1;
                smallvec![Effect::None]
            },
        }
    }
}

fn store() -> Store<TestState, TestAction, (), TestReducer> {
    Store::new(TestState::default(), TestReducer, ())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_observer_sees_state_after_reduction() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store
        .send(TestAction::Raise {
            id: 7,
            ttl: Duration::from_secs(5),
        })
        .unwrap();
    assert_eq!(store.state(|s| s.visible.clone()), vec![7]);

    let action = rx.recv().await.unwrap();

    assert_eq!(action, TestAction::Expired { id: 7 });
    assert!(store.state(|s| s.visible.is_empty()));
}

#[tokio::test]
async fn test_directly_sent_actions_are_not_broadcast() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store.send(TestAction::Ping { seq: 0 }).unwrap();

    assert_eq!(store.state(|s| s.pings), 1);
    assert!(matches!(
        rx.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn test_every_subscriber_receives_every_action() {
    let store = store();
    let mut first = store.subscribe_actions();
    let mut second = store.subscribe_actions();

    let mut handle = store.send(TestAction::Flood { n: 3 }).unwrap();
    handle.wait().await;

    for rx in [&mut first, &mut second] {
        let mut seqs = Vec::new();
        for _ in 0..3 {
            match rx.recv().await.unwrap() {
                TestAction::Ping { seq } => seqs.push(seq),
                other => panic!("unexpected action {other:?}"),
            }
        }
        seqs.sort_unstable();
        assert_eq!(seqs, vec![0, 1, 2]);
    }
}

#[tokio::test]
async fn test_lagging_subscriber_is_told_and_recovers() {
    let store = Store::with_broadcast_capacity(TestState::default(), TestReducer, (), 2);
    let mut rx = store.subscribe_actions();

    let mut handle = store.send(TestAction::Flood { n: 5 }).unwrap();
    handle.wait().await;

    assert_eq!(store.state(|s| s.pings), 5);
    assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
    assert!(matches!(rx.recv().await, Ok(TestAction::Ping { .. })));
    assert!(matches!(rx.recv().await, Ok(TestAction::Ping { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_no_broadcast_after_shutdown() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store
        .send(TestAction::Raise {
            id: 1,
            ttl: Duration::from_secs(1),
        })
        .unwrap();
    // Delay is still pending, so shutdown times out but does reject new work
    let _ = store.shutdown(Duration::from_millis(100)).await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(store.state(|s| s.visible.clone()), vec![1]);
    assert!(matches!(
        rx.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}
