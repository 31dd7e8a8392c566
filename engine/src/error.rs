use std::time::Duration;

use thiserror::Error;
use timerlab_types::TimerError;

/// Why a scenario did not produce `"resolved"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// The scenario exceeded the runner's time budget.
    #[error("scenario timed out in {}ms", after.as_millis())]
    Timeout { after: Duration },
    /// The producer resolved with something unexpected.
    #[error("expected {expected:?}, got {actual:?}")]
    Assertion { expected: String, actual: String },
    /// An awaited advance fired no timers, so the producer was never registered
    /// in time.
    #[error("advance operation fired no timers")]
    NothingAdvanced,
    #[error(transparent)]
    Timer(#[from] TimerError),
}

impl ScenarioError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, ScenarioError::Timeout { .. })
    }
}
