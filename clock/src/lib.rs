//! Clock capability for timerlab.
//!
//! Code that waits on time takes a [`Clock`] instead of reaching for a global
//! timer. `Clock::Real` delegates to the tokio timer; `Clock::Simulated` wraps a
//! [`SimulatedClock`], whose timers only fire while an advance operation is
//! awaited.
//!
//! ```text
//! Clock::delay(d) ──registers now──> Delay ──.await──> Ok(())
//!                                      │
//!            Simulated: pending until advance_all()/advance_by() fires it
//! ```

#![allow(clippy::missing_errors_doc)]

mod simulated;
mod sleep;

pub use simulated::SimulatedClock;
pub use sleep::Sleep;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use timerlab_types::{TimerError, TimerId, TimerMode};
use tokio::time;

/// The timer capability handed to code that waits.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Wall-clock delays via the tokio timer.
    Real,
    /// Virtual delays that need an explicit advance.
    Simulated(SimulatedClock),
}

impl Clock {
    /// A fresh clock for `mode`. Simulated clocks start at virtual time zero with
    /// no pending timers.
    #[must_use]
    pub fn new(mode: TimerMode) -> Self {
        match mode {
            TimerMode::Real => Clock::Real,
            TimerMode::Simulated => Clock::Simulated(SimulatedClock::new()),
        }
    }

    #[must_use]
    pub fn simulated_with_loop_limit(loop_limit: usize) -> Self {
        Clock::Simulated(SimulatedClock::with_loop_limit(loop_limit))
    }

    #[must_use]
    pub fn mode(&self) -> TimerMode {
        match self {
            Clock::Real => TimerMode::Real,
            Clock::Simulated(_) => TimerMode::Simulated,
        }
    }

    #[must_use]
    pub fn as_simulated(&self) -> Option<&SimulatedClock> {
        match self {
            Clock::Real => None,
            Clock::Simulated(clock) => Some(clock),
        }
    }

    /// Register a delay with this clock and return a future for its completion.
    ///
    /// The delay is registered before this returns. For `Clock::Real` this must
    /// be called from within a tokio runtime.
    pub fn delay(&self, duration: Duration) -> Delay {
        match self {
            Clock::Real => Delay::Real(Box::pin(time::sleep(duration))),
            Clock::Simulated(clock) => Delay::Simulated(clock.sleep(duration)),
        }
    }

    /// Pending simulated timers, or `None` for a real clock.
    #[must_use]
    pub fn pending_count(&self) -> Option<usize> {
        self.as_simulated().map(SimulatedClock::pending_count)
    }

    /// The advance operation: run all pending simulated timers.
    ///
    /// Fails with [`TimerError::NotSimulated`] on a real clock.
    pub async fn advance_all(&self) -> Result<usize, TimerError> {
        match self {
            Clock::Real => Err(TimerError::NotSimulated),
            Clock::Simulated(clock) => clock.advance_all().await,
        }
    }

    pub async fn advance_by(&self, delta: Duration) -> Result<usize, TimerError> {
        match self {
            Clock::Real => Err(TimerError::NotSimulated),
            Clock::Simulated(clock) => clock.advance_by(delta).await,
        }
    }

    pub async fn advance_to_next(&self) -> Result<usize, TimerError> {
        match self {
            Clock::Real => Err(TimerError::NotSimulated),
            Clock::Simulated(clock) => Ok(clock.advance_to_next().await),
        }
    }

    pub async fn run_only_pending(&self) -> Result<usize, TimerError> {
        match self {
            Clock::Real => Err(TimerError::NotSimulated),
            Clock::Simulated(clock) => clock.run_only_pending().await,
        }
    }
}

/// A delay registered with a [`Clock`].
#[derive(Debug)]
#[must_use = "delays do nothing unless awaited"]
pub enum Delay {
    Real(Pin<Box<time::Sleep>>),
    Simulated(Sleep),
}

impl Delay {
    /// Whether the delay has completed, observed or not.
    #[must_use]
    pub fn is_elapsed(&self) -> bool {
        match self {
            Delay::Real(sleep) => sleep.is_elapsed(),
            Delay::Simulated(sleep) => sleep.is_elapsed(),
        }
    }

    /// The simulated timer backing this delay.
    #[must_use]
    pub fn timer_id(&self) -> Option<TimerId> {
        match self {
            Delay::Real(_) => None,
            Delay::Simulated(sleep) => Some(sleep.id()),
        }
    }
}

impl Future for Delay {
    type Output = Result<(), TimerError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.get_mut() {
            Delay::Real(sleep) => sleep.as_mut().poll(cx).map(Ok),
            Delay::Simulated(sleep) => Pin::new(sleep).poll(cx),
        }
    }
}
