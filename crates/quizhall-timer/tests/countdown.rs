//! Integration tests for the per-question countdown.
//!
//! Every test runs with the Tokio clock paused; sleeps auto-advance time
//! so expiry is deterministic.

use std::time::Duration;

use quizhall_timer::{Countdown, Expiry};
use tokio::time::{self, Instant};

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[test]
fn test_new_countdown_is_disarmed() {
    let countdown = Countdown::default();
    assert!(!countdown.is_armed());
    assert_eq!(countdown.armed_for(), None);
    assert_eq!(countdown.remaining(), None);
    assert_eq!(countdown.armed_total(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_expired_fires_after_duration() {
    let mut countdown = Countdown::default();
    let start = Instant::now();
    countdown.arm(0, secs(10));

    let expiry = countdown.expired().await;

    assert_eq!(expiry.question_index, 0);
    assert_eq!(Instant::now() - start, secs(10));
    assert!(!countdown.is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_expired_disarmed_never_fires() {
    let mut countdown = Countdown::default();
    let result = time::timeout(secs(3600), countdown.expired()).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_prevents_expiry() {
    let mut countdown = Countdown::default();
    countdown.arm(2, secs(5));
    assert_eq!(countdown.cancel(), Some(2));

    let result = time::timeout(secs(60), countdown.expired()).await;
    assert!(result.is_err());
}

#[test]
fn test_cancel_twice_second_is_noop() {
    let mut countdown = Countdown::default();
    countdown.arm(1, secs(5));
    assert_eq!(countdown.cancel(), Some(1));
    assert_eq!(countdown.cancel(), None);
}

#[tokio::test(start_paused = true)]
async fn test_arm_replaces_previous_deadline() {
    let mut countdown = Countdown::default();
    let start = Instant::now();
    countdown.arm(0, secs(30));
    assert_eq!(countdown.arm(1, secs(5)), Some(0));

    let expiry = countdown.expired().await;
    assert_eq!(expiry.question_index, 1);
    assert_eq!(Instant::now() - start, secs(5));
    assert_eq!(countdown.armed_total(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_expired_dropped_future_keeps_deadline() {
    let mut countdown = Countdown::default();
    countdown.arm(3, secs(10));

    // Another branch wins first; the countdown must survive.
    tokio::select! {
        _ = countdown.expired() => panic!("fired too early"),
        _ = time::sleep(secs(4)) => {}
    }
    assert_eq!(countdown.armed_for(), Some(3));
    assert_eq!(countdown.remaining(), Some(secs(6)));

    let expiry = countdown.expired().await;
    assert_eq!(expiry.question_index, 3);
}

#[tokio::test(start_paused = true)]
async fn test_expired_reports_lateness() {
    let mut countdown = Countdown::default();
    countdown.arm(0, secs(1));

    // Let the deadline pass without polling.
    time::advance(secs(3)).await;

    let Expiry { late_by, .. } = countdown.expired().await;
    assert!(late_by >= secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_remaining_counts_down() {
    let mut countdown = Countdown::default();
    countdown.arm(0, secs(10));
    time::advance(secs(4)).await;
    assert_eq!(countdown.remaining(), Some(secs(6)));
    assert_eq!(countdown.armed_duration(), Some(secs(10)));
}

#[tokio::test(start_paused = true)]
async fn test_take_due_only_reports_passed_deadline() {
    let mut countdown = Countdown::default();
    assert!(countdown.take_due().is_none());

    countdown.arm(2, secs(10));
    time::advance(secs(9)).await;
    assert!(countdown.take_due().is_none());
    assert!(countdown.is_armed());

    time::advance(secs(2)).await;
    let expiry = countdown.take_due().expect("deadline passed");
    assert_eq!(expiry.question_index, 2);
    assert_eq!(expiry.late_by, secs(1));
    assert!(!countdown.is_armed());
    assert!(countdown.take_due().is_none());
}
