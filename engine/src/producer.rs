//! The deferred producer: a value that shows up after a delay.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use timerlab_clock::{Clock, Delay};
use timerlab_types::{DEFAULT_DELAY, DeferredState, RESOLVED, TimerError, TimerId};

/// A pending `"resolved"`.
///
/// Created by [`resolve_after`]. The delay is already registered with the clock
/// when this value exists; awaiting it only observes the completion.
#[derive(Debug)]
#[must_use = "the delay is registered either way; drop it and the value is never observed"]
pub struct DeferredValue {
    delay: Delay,
    observed: bool,
}

impl DeferredValue {
    #[must_use]
    pub fn state(&self) -> DeferredState {
        if self.observed {
            DeferredState::Observed
        } else if self.delay.is_elapsed() {
            DeferredState::Completed
        } else {
            DeferredState::DelayRegistered
        }
    }

    /// The simulated timer this value waits on, if any.
    #[must_use]
    pub fn timer_id(&self) -> Option<TimerId> {
        self.delay.timer_id()
    }
}

impl Future for DeferredValue {
    type Output = Result<&'static str, TimerError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.observed {
            return Poll::Ready(Ok(RESOLVED));
        }
        match Pin::new(&mut this.delay).poll(cx) {
            Poll::Ready(Ok(())) => {
                this.observed = true;
                Poll::Ready(Ok(RESOLVED))
            }
            Poll::Ready(Err(err)) => Poll::Ready(Err(err)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Resolve to `"resolved"` once `delay` has passed on `clock`.
///
/// The timer is registered before this returns, so a sweep started after this
/// call will see it. Under a simulated clock nothing completes it except an
/// advance operation.
pub fn resolve_after(clock: &Clock, delay: Duration) -> DeferredValue {
    let delay_future = clock.delay(delay);
    tracing::debug!(
        mode = %clock.mode(),
        timer = ?delay_future.timer_id(),
        ?delay,
        "deferred value registered"
    );
    DeferredValue {
        delay: delay_future,
        observed: false,
    }
}

/// [`resolve_after`] with the standard one-second delay.
pub fn produce(clock: &Clock) -> DeferredValue {
    resolve_after(clock, DEFAULT_DELAY)
}
