//! Core domain types for timerlab.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! The clock, engine and CLI crates all speak in these terms.

mod ids;
mod instant;

pub use ids::TimerId;
pub use instant::SimInstant;

use std::fmt;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// The value every deferred producer resolves with.
pub const RESOLVED: &str = "resolved";

/// Delay the producer waits before resolving.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Per-scenario time budget enforced by the runner.
pub const DEFAULT_SCENARIO_TIMEOUT: Duration = Duration::from_millis(5000);

/// Maximum number of timers a single `advance_all` may fire.
pub const DEFAULT_LOOP_LIMIT: usize = 10_000;

// ============================================================================
// Timer mode
// ============================================================================

/// Which clock drives delayed work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimerMode {
    /// Delayed work completes after genuine elapsed time.
    #[default]
    Real,
    /// Delayed work completes only when an advance operation fires it.
    Simulated,
}

impl TimerMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TimerMode::Real => "real",
            TimerMode::Simulated => "simulated",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Deferred value lifecycle
// ============================================================================

/// Lifecycle of one deferred value.
///
/// ```text
/// NotStarted -> DelayRegistered -> Completed -> Observed
/// ```
///
/// `NotStarted` has no representation: the delay is registered in the same
/// call that creates the value. Under simulated time the
/// `DelayRegistered -> Completed` edge is only taken by an advance operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredState {
    DelayRegistered,
    Completed,
    Observed,
}

impl DeferredState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DeferredState::DelayRegistered => "delay-registered",
            DeferredState::Completed => "completed",
            DeferredState::Observed => "observed",
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// An advance operation was requested on a real clock.
    #[error("timers are not simulated; use a simulated clock before advancing time")]
    NotSimulated,
    /// `advance_all` kept finding new timers.
    #[error("aborting after running {limit} timers, assuming an infinite loop")]
    LoopLimitExceeded { limit: usize },
    /// The timer was removed from the clock before it fired.
    #[error("{id} was cleared before it fired")]
    Cleared { id: TimerId },
}
