//! Producer and simulated clock working together.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use timerlab_clock::{Clock, SimulatedClock};
use timerlab_engine::resolve_after;
use timerlab_types::{DeferredState, RESOLVED, SimInstant, TimerError, TimerMode};

const DELAY: Duration = Duration::from_millis(1000);

#[tokio::test]
async fn advance_by_resolves_exactly_at_the_deadline() {
    let clock = Clock::new(TimerMode::Simulated);
    let mut value = resolve_after(&clock, DELAY);

    assert_eq!(clock.advance_by(Duration::from_millis(999)).await, Ok(0));
    assert!((&mut value).now_or_never().is_none());

    assert_eq!(clock.advance_by(Duration::from_millis(1)).await, Ok(1));
    assert_eq!(value.await, Ok(RESOLVED));
}

#[tokio::test]
async fn advance_to_next_resolves_producers_one_at_a_time() {
    let clock = Clock::new(TimerMode::Simulated);
    let first = resolve_after(&clock, DELAY);
    let second = resolve_after(&clock, DELAY * 3);

    assert_eq!(clock.advance_to_next().await, Ok(1));
    assert_eq!(first.state(), DeferredState::Completed);
    assert_eq!(second.state(), DeferredState::DelayRegistered);

    assert_eq!(clock.run_only_pending().await, Ok(1));
    assert_eq!(second.state(), DeferredState::Completed);
}

#[tokio::test]
async fn advance_all_follows_a_chain_of_producers() {
    let clock = Clock::new(TimerMode::Simulated);
    let worker_clock = clock.clone();
    let worker = tokio::spawn(async move {
        let mut values = Vec::new();
        for _ in 0..3 {
            values.push(resolve_after(&worker_clock, DELAY).await?);
        }
        Ok::<_, TimerError>(values)
    });
    tokio::task::yield_now().await;

    assert_eq!(clock.advance_all().await, Ok(3));
    assert_eq!(worker.await.unwrap(), Ok(vec![RESOLVED; 3]));
    assert_eq!(
        clock.as_simulated().map(SimulatedClock::now),
        Some(SimInstant::from_millis(3000))
    );
}

#[tokio::test]
async fn callbacks_and_producers_share_one_queue() {
    let simulated = SimulatedClock::new();
    let clock = Clock::Simulated(simulated.clone());
    let ran = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&ran);
    simulated.set_timeout(Duration::from_millis(500), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let value = resolve_after(&clock, DELAY);

    assert_eq!(simulated.pending_count(), 2);
    assert_eq!(simulated.next_deadline(), Some(SimInstant::from_millis(500)));
    assert_eq!(clock.advance_all().await, Ok(2));
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert_eq!(value.await, Ok(RESOLVED));
}

#[tokio::test]
async fn independent_clocks_do_not_share_timers() {
    let first = Clock::new(TimerMode::Simulated);
    let second = Clock::new(TimerMode::Simulated);
    let mut value = resolve_after(&first, DELAY);

    assert_eq!(second.advance_all().await, Ok(0));
    assert!((&mut value).now_or_never().is_none());
    assert_eq!(first.pending_count(), Some(1));
}
