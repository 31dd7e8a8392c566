//! The four timer scenarios.
//!
//! | scenario               | mode      | call order                              | documented outcome |
//! |------------------------|-----------|-----------------------------------------|--------------------|
//! | `real-timer`           | real      | await producer                          | passes             |
//! | `await-then-advance`   | simulated | await producer, await advance           | times out          |
//! | `detached-advance`     | simulated | spawn advance, await producer           | passes, fragile    |
//! | `advance-then-observe` | simulated | start producer, await advance, observe  | passes, fragile    |
//!
//! The fragile pair only pass because the producer registers its timer before
//! the sweep looks at the queue. The detached sweep is spawned on a
//! [`LocalSet`] so it is first polled on the scenario's own thread, after the
//! producer has registered, whatever runtime flavor drives the scenario.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use timerlab_clock::Clock;
use timerlab_types::{DeferredState, RESOLVED, TimerMode};
use tokio::task::{self, LocalSet};

use crate::error::ScenarioError;
use crate::producer::resolve_after;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    RealTimer,
    AwaitThenAdvance,
    DetachedAdvance,
    AdvanceThenObserve,
}

/// What a scenario is documented to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Passes,
    TimesOut,
    /// Passes, but only because of incidental scheduling order.
    PassesFragile,
}

impl Expectation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Expectation::Passes => "passes",
            Expectation::TimesOut => "times out",
            Expectation::PassesFragile => "passes (fragile)",
        }
    }

    #[must_use]
    pub fn is_met_by(self, outcome: &Result<Observation, ScenarioError>) -> bool {
        match self {
            Expectation::Passes | Expectation::PassesFragile => outcome.is_ok(),
            Expectation::TimesOut => outcome.as_ref().is_err_and(ScenarioError::is_timeout),
        }
    }
}

/// What a passing scenario saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub value: &'static str,
    /// Timers fired by an awaited advance, when the scenario awaited one.
    pub advanced: Option<usize>,
}

#[derive(Debug, Clone, Error)]
#[error("unknown scenario: {0}")]
pub struct UnknownScenario(String);

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::RealTimer,
        Scenario::AwaitThenAdvance,
        Scenario::DetachedAdvance,
        Scenario::AdvanceThenObserve,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Scenario::RealTimer => "real-timer",
            Scenario::AwaitThenAdvance => "await-then-advance",
            Scenario::DetachedAdvance => "detached-advance",
            Scenario::AdvanceThenObserve => "advance-then-observe",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Scenario::RealTimer => "using a real timer",
            Scenario::AwaitThenAdvance => "using a simulated timer",
            Scenario::DetachedAdvance => "run all simulated timers without awaiting the sweep",
            Scenario::AdvanceThenObserve => {
                "let the producer run detached and await the sweep before observing it"
            }
        }
    }

    #[must_use]
    pub const fn mode(self) -> TimerMode {
        match self {
            Scenario::RealTimer => TimerMode::Real,
            Scenario::AwaitThenAdvance
            | Scenario::DetachedAdvance
            | Scenario::AdvanceThenObserve => TimerMode::Simulated,
        }
    }

    #[must_use]
    pub const fn expectation(self) -> Expectation {
        match self {
            Scenario::RealTimer => Expectation::Passes,
            Scenario::AwaitThenAdvance => Expectation::TimesOut,
            Scenario::DetachedAdvance | Scenario::AdvanceThenObserve => {
                Expectation::PassesFragile
            }
        }
    }

    pub fn parse(value: &str) -> Result<Self, UnknownScenario> {
        let wanted = value.trim().to_ascii_lowercase();
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == wanted)
            .ok_or_else(|| UnknownScenario(value.to_string()))
    }

    /// Run the scenario body against `clock`. No timeout is applied here.
    ///
    /// The returned future is not `Send`: `detached-advance` owns a
    /// [`LocalSet`]. Await it in place rather than handing it to `tokio::spawn`.
    pub async fn run(self, clock: &Clock, delay: Duration) -> Result<Observation, ScenarioError> {
        match self {
            Scenario::RealTimer => real_timer(clock, delay).await,
            Scenario::AwaitThenAdvance => await_then_advance(clock, delay).await,
            Scenario::DetachedAdvance => detached_advance(clock, delay).await,
            Scenario::AdvanceThenObserve => advance_then_observe(clock, delay).await,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn expect_resolved(value: &str) -> Result<(), ScenarioError> {
    if value == RESOLVED {
        Ok(())
    } else {
        Err(ScenarioError::Assertion {
            expected: RESOLVED.to_string(),
            actual: value.to_string(),
        })
    }
}

async fn real_timer(clock: &Clock, delay: Duration) -> Result<Observation, ScenarioError> {
    let value = resolve_after(clock, delay).await?;
    expect_resolved(value)?;
    Ok(Observation {
        value,
        advanced: None,
    })
}

async fn await_then_advance(clock: &Clock, delay: Duration) -> Result<Observation, ScenarioError> {
    // Suspends here with the timer registered and nothing left to fire it.
    let value = resolve_after(clock, delay).await?;
    let advanced = clock.advance_all().await?;
    expect_resolved(value)?;
    Ok(Observation {
        value,
        advanced: Some(advanced),
    })
}

async fn detached_advance(clock: &Clock, delay: Duration) -> Result<Observation, ScenarioError> {
    // `run_until` polls the body before any local task, so the producer below
    // registers before the sweep first runs.
    let local = LocalSet::new();
    local
        .run_until(async {
            let sweeper = clock.clone();
            // Not awaited.
            drop(task::spawn_local(async move { sweeper.advance_all().await }));

            let value = resolve_after(clock, delay).await?;
            expect_resolved(value)?;
            Ok::<_, ScenarioError>(Observation {
                value,
                advanced: None,
            })
        })
        .await
}

async fn advance_then_observe(
    clock: &Clock,
    delay: Duration,
) -> Result<Observation, ScenarioError> {
    let pending = resolve_after(clock, delay);
    let advanced = clock.advance_all().await?;
    if advanced == 0 {
        return Err(ScenarioError::NothingAdvanced);
    }
    if pending.state() != DeferredState::Completed {
        tracing::warn!(
            state = pending.state().as_str(),
            "advance finished but the producer is not complete"
        );
    }

    let value = pending.await?;
    expect_resolved(value)?;
    Ok(Observation {
        value,
        advanced: Some(advanced),
    })
}
