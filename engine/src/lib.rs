//! Timer scenarios for timerlab.
//!
//! A single producer ([`resolve_after`]) resolves to `"resolved"` after a delay
//! on an injected [`Clock`](timerlab_clock::Clock). Four [`Scenario`]s await it
//! under real and simulated clocks in different orders; the [`Runner`] gives
//! each a fresh clock and the scenario timeout and collects a [`SuiteReport`].

#![allow(clippy::missing_errors_doc)]

mod error;
mod producer;
mod report;
mod runner;
mod scenario;


pub use error::ScenarioError;
pub use producer::{DeferredValue, produce, resolve_after};
pub use report::{MarkerStyle, ScenarioReport, SuiteReport, Verdict};
pub use runner::Runner;
pub use scenario::{Expectation, Observation, Scenario, UnknownScenario};

pub use timerlab_config::Settings;
