use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// A point in virtual time, measured from the creation of a simulated clock.
///
/// Virtual time starts at zero and only moves while an advance operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(Duration);

impl SimInstant {
    pub const ZERO: SimInstant = SimInstant(Duration::ZERO);

    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Virtual time elapsed since the clock was created.
    #[must_use]
    pub const fn elapsed(self) -> Duration {
        self.0
    }

    /// Time from `earlier` to `self`, or zero if `earlier` is later.
    #[must_use]
    pub fn saturating_duration_since(self, earlier: SimInstant) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for SimInstant {
    type Output = SimInstant;

    // Saturating: a `Duration::MAX` delay lands at the end of virtual time.
    fn add(self, rhs: Duration) -> Self::Output {
        SimInstant(self.0.saturating_add(rhs))
    }
}

impl fmt::Display for SimInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}
