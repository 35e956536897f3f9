//! Contract Test: Propagation Waiting
//!
//! Constraints verified:
//! - The wait ends on the first INSYNC status, with no further polls
//! - No more than max_attempts status reads happen before PropagationTimeout
//! - The default budget is 120 reads, 5 seconds apart
//! - A failing status read is reported as PropagationStatus, not as a timeout
//! - The sleep between polls can be cancelled

mod common;

use common::*;
use dns01_core::traits::ChangeStatus;
use dns01_core::{Error, PropagationPolicy, PropagationWatcher};
use std::sync::Arc;
use std::time::Duration;

fn fast_policy(max_attempts: u32) -> PropagationPolicy {
    PropagationPolicy {
        poll_interval: Duration::from_millis(1),
        max_attempts,
    }
}

#[tokio::test]
async fn returns_on_first_insync() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()).with_statuses([
        ChangeStatus::Pending,
        ChangeStatus::Pending,
        ChangeStatus::InSync,
        ChangeStatus::Pending,
    ]));
    let watcher = PropagationWatcher::new(provider.clone(), fast_policy(10));

    watcher.wait("C1").await.unwrap();
    assert_eq!(provider.status_calls(), 3);
}

#[tokio::test]
async fn already_insync_needs_one_read() {
    let provider =
        Arc::new(ScriptedProvider::new(Vec::new()).with_statuses([ChangeStatus::InSync]));
    let watcher = PropagationWatcher::new(provider.clone(), fast_policy(10));

    watcher.wait("C1").await.unwrap();
    assert_eq!(provider.status_calls(), 1);
}

#[tokio::test]
async fn times_out_after_max_attempts() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let watcher = PropagationWatcher::new(provider.clone(), fast_policy(4));

    match watcher.wait("C1").await {
        Err(Error::PropagationTimeout {
            change_id,
            attempts,
        }) => {
            assert_eq!(change_id, "C1");
            assert_eq!(attempts, 4);
        }
        other => panic!("expected PropagationTimeout, got {:?}", other),
    }
    assert_eq!(provider.status_calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn default_budget_is_ten_minutes() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let watcher = PropagationWatcher::new(provider.clone(), PropagationPolicy::default());

    let started = tokio::time::Instant::now();
    let result = watcher.wait("C1").await;

    assert!(matches!(result, Err(Error::PropagationTimeout { .. })));
    assert_eq!(provider.status_calls(), 120);
    // 119 sleeps: none after the final read
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(5 * 119));
    assert!(elapsed < Duration::from_secs(5 * 120));
}

#[tokio::test]
async fn status_failure_is_not_a_timeout() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()).with_status_error("connection reset"));
    let watcher = PropagationWatcher::new(provider.clone(), fast_policy(10));

    let result = watcher.wait("C1").await;
    assert!(matches!(result, Err(Error::PropagationStatus { .. })));
    assert_eq!(provider.status_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_the_sleep() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let watcher = PropagationWatcher::new(provider.clone(), PropagationPolicy::default());

    let (cancel_tx, cancel_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { watcher.wait_with_cancel("C1", cancel_rx).await });

    tokio::time::sleep(Duration::from_secs(12)).await;
    cancel_tx.send(()).unwrap();

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(Error::Cancelled { .. })));
    assert_eq!(provider.status_calls(), 3, "reads at 0s, 5s and 10s");
}

#[tokio::test]
async fn dropped_cancel_sender_cancels() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let watcher = PropagationWatcher::new(provider, PropagationPolicy::default());

    let (cancel_tx, cancel_rx) = tokio::sync::oneshot::channel::<()>();
    drop(cancel_tx);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        watcher.wait_with_cancel("C1", cancel_rx),
    )
    .await
    .expect("cancelled wait returns promptly");
    assert!(matches!(result, Err(Error::Cancelled { .. })));
}
