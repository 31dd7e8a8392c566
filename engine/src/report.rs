//! Scenario outcomes and their text rendering.
//!
//! Markers follow the demonstration's legend:
//!
//! - ✅ should not fail and does not fail
//! - ❌ should not fail, but does fail
//! - ⚠️ does not fail, but looks unsafe

use std::fmt::Write as _;
use std::time::Duration;

use crate::error::ScenarioError;
use crate::runner::millis;
use crate::scenario::{Expectation, Observation, Scenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerStyle {
    #[default]
    Emoji,
    Ascii,
}

impl MarkerStyle {
    #[must_use]
    pub const fn from_ascii_only(ascii_only: bool) -> Self {
        if ascii_only {
            MarkerStyle::Ascii
        } else {
            MarkerStyle::Emoji
        }
    }
}

/// How a scenario's observed outcome reads against the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
    Fragile,
}

impl Verdict {
    #[must_use]
    pub const fn marker(self, style: MarkerStyle) -> &'static str {
        match (self, style) {
            (Verdict::Passed, MarkerStyle::Emoji) => "✅",
            (Verdict::Failed, MarkerStyle::Emoji) => "❌",
            (Verdict::Fragile, MarkerStyle::Emoji) => "⚠️",
            (Verdict::Passed, MarkerStyle::Ascii) => "[ok]",
            (Verdict::Failed, MarkerStyle::Ascii) => "[FAIL]",
            (Verdict::Fragile, MarkerStyle::Ascii) => "[warn]",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub outcome: Result<Observation, ScenarioError>,
    pub elapsed: Duration,
}

impl ScenarioReport {
    #[must_use]
    pub fn new(
        scenario: Scenario,
        outcome: Result<Observation, ScenarioError>,
        elapsed: Duration,
    ) -> Self {
        Self {
            scenario,
            outcome,
            elapsed,
        }
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        match (&self.outcome, self.scenario.expectation()) {
            (Err(_), _) => Verdict::Failed,
            (Ok(_), Expectation::PassesFragile) => Verdict::Fragile,
            (Ok(_), Expectation::Passes | Expectation::TimesOut) => Verdict::Passed,
        }
    }

    #[must_use]
    pub fn matches_expectation(&self) -> bool {
        self.scenario.expectation().is_met_by(&self.outcome)
    }

    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.outcome.as_ref().is_err_and(ScenarioError::is_timeout)
    }

    fn outcome_text(&self) -> String {
        match &self.outcome {
            Ok(Observation {
                value,
                advanced: Some(advanced),
            }) => format!("{value:?} after advancing {advanced} timer(s)"),
            Ok(Observation {
                value,
                advanced: None,
            }) => format!("{value:?}"),
            Err(err) => err.to_string(),
        }
    }

    #[must_use]
    pub fn render(&self, style: MarkerStyle) -> String {
        let note = if self.matches_expectation() {
            "as documented"
        } else {
            "UNEXPECTED"
        };
        format!(
            "{} {:<22} {:<9} {} [{}ms, {}]",
            self.verdict().marker(style),
            self.scenario.name(),
            self.scenario.mode().as_str(),
            self.outcome_text(),
            millis(self.elapsed),
            note,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub reports: Vec<ScenarioReport>,
}

impl SuiteReport {
    #[must_use]
    pub fn new(reports: Vec<ScenarioReport>) -> Self {
        Self { reports }
    }

    /// Scenarios whose outcome differs from what they are documented to do.
    pub fn deviations(&self) -> impl Iterator<Item = &ScenarioReport> {
        self.reports
            .iter()
            .filter(|report| !report.matches_expectation())
    }

    #[must_use]
    pub fn all_as_documented(&self) -> bool {
        self.deviations().next().is_none()
    }

    #[must_use]
    pub fn count(&self, verdict: Verdict) -> usize {
        self.reports
            .iter()
            .filter(|report| report.verdict() == verdict)
            .count()
    }

    #[must_use]
    pub fn render(&self, style: MarkerStyle) -> String {
        let mut out = String::new();
        for report in &self.reports {
            out.push_str(&report.render(style));
            out.push('\n');
        }

        let deviations = self.deviations().count();
        let _ = write!(
            out,
            "{} scenario(s): {} passed, {} fragile, {} failed; ",
            self.reports.len(),
            self.count(Verdict::Passed),
            self.count(Verdict::Fragile),
            self.count(Verdict::Failed),
        );
        if deviations == 0 {
            out.push_str("all as documented\n");
        } else {
            let _ = writeln!(out, "{deviations} deviated from the documented outcome");
        }
        out
    }
}
