//! Runs scenarios one at a time under the scenario timeout.

use std::time::Duration;

use timerlab_clock::Clock;
use timerlab_config::Settings;
use timerlab_types::TimerMode;
use tokio::time::{self, Instant};
use tracing::Instrument;

use crate::error::ScenarioError;
use crate::report::{ScenarioReport, SuiteReport};
use crate::scenario::Scenario;

/// Runs scenarios with a fresh clock each and the configured timeout.
///
/// Works on either runtime flavor. The futures returned by [`Runner::run`] and
/// friends are not `Send`, so await them directly or inside a `LocalSet`.
#[derive(Debug, Clone)]
pub struct Runner {
    settings: Settings,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Runner {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// A fresh clock for one scenario. Nothing carries over between scenarios.
    fn clock_for(&self, mode: TimerMode) -> Clock {
        match mode {
            TimerMode::Real => Clock::Real,
            TimerMode::Simulated => Clock::simulated_with_loop_limit(self.settings.loop_limit),
        }
    }

    pub async fn run(&self, scenario: Scenario) -> ScenarioReport {
        let clock = self.clock_for(scenario.mode());
        let timeout = self.settings.timeout;
        let span = tracing::info_span!("scenario", name = scenario.name(), mode = %scenario.mode());

        let started = Instant::now();
        let outcome = time::timeout(timeout, scenario.run(&clock, self.settings.delay))
            .instrument(span.clone())
            .await
            .unwrap_or(Err(ScenarioError::Timeout { after: timeout }));
        let elapsed = started.elapsed();

        let report = ScenarioReport::new(scenario, outcome, elapsed);
        span.in_scope(|| log_report(&report, clock.pending_count()));
        report
    }

    /// Run `scenarios` in order.
    pub async fn run_all(&self, scenarios: &[Scenario]) -> SuiteReport {
        let mut reports = Vec::with_capacity(scenarios.len());
        for &scenario in scenarios {
            reports.push(self.run(scenario).await);
        }
        SuiteReport::new(reports)
    }

    pub async fn run_suite(&self) -> SuiteReport {
        self.run_all(&Scenario::ALL).await
    }
}

fn log_report(report: &ScenarioReport, pending_timers: Option<usize>) {
    let elapsed_ms = millis(report.elapsed);
    match &report.outcome {
        Ok(observation) => tracing::info!(
            elapsed_ms,
            value = observation.value,
            advanced = ?observation.advanced,
            matched = report.matches_expectation(),
            "scenario resolved"
        ),
        Err(err) => tracing::warn!(
            elapsed_ms,
            error = %err,
            ?pending_timers,
            matched = report.matches_expectation(),
            "scenario failed"
        ),
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
