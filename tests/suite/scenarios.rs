//! Scenario runs end to end through the runner.

use std::time::Duration;

use timerlab_clock::Clock;
use timerlab_engine::{
    Expectation, MarkerStyle, Runner, Scenario, ScenarioError, Verdict, resolve_after,
};
use timerlab_types::{RESOLVED, TimerMode};
use tokio::time;

use crate::common::fast_settings;

#[tokio::test(start_paused = true)]
async fn every_scenario_behaves_as_documented() {
    let suite = Runner::default().run_suite().await;

    for report in &suite.reports {
        assert!(
            report.matches_expectation(),
            "{} deviated: {:?}",
            report.scenario,
            report.outcome
        );
    }

    let expectations: Vec<_> = suite
        .reports
        .iter()
        .map(|report| report.scenario.expectation())
        .collect();
    assert_eq!(
        expectations,
        vec![
            Expectation::Passes,
            Expectation::TimesOut,
            Expectation::PassesFragile,
            Expectation::PassesFragile,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn rendered_suite_uses_the_legend() {
    let suite = Runner::default().run_suite().await;
    let text = suite.render(MarkerStyle::Emoji);
    let lines: Vec<_> = text.lines().collect();

    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("✅ real-timer"));
    assert!(lines[1].starts_with("❌ await-then-advance"));
    assert!(lines[2].starts_with("⚠️ detached-advance"));
    assert!(lines[3].starts_with("⚠️ advance-then-observe"));
    assert_eq!(
        lines[4],
        "4 scenario(s): 1 passed, 2 fragile, 1 failed; all as documented"
    );
}

#[tokio::test]
async fn real_clock_run_stays_within_delay_plus_margin() {
    let settings = fast_settings();
    let report = Runner::new(settings).run(Scenario::RealTimer).await;

    assert_eq!(report.verdict(), Verdict::Passed);
    assert!(report.elapsed >= settings.delay);
    assert!(report.elapsed < settings.timeout);
}

#[tokio::test]
async fn simulated_await_then_advance_exhausts_the_real_budget() {
    let settings = fast_settings();
    let report = Runner::new(settings)
        .run(Scenario::AwaitThenAdvance)
        .await;

    assert_eq!(
        report.outcome,
        Err(ScenarioError::Timeout {
            after: settings.timeout
        })
    );
    assert!(report.elapsed >= settings.timeout);
}

#[tokio::test(start_paused = true)]
async fn selected_scenarios_run_in_the_given_order() {
    let suite = Runner::default()
        .run_all(&[Scenario::AdvanceThenObserve, Scenario::RealTimer])
        .await;

    let names: Vec<_> = suite.reports.iter().map(|r| r.scenario.name()).collect();
    assert_eq!(names, vec!["advance-then-observe", "real-timer"]);
    assert!(suite.all_as_documented());
}

#[tokio::test(start_paused = true)]
async fn detached_sweep_that_runs_first_loses_the_race() {
    let clock = Clock::new(TimerMode::Simulated);
    let sweeper = clock.clone();
    let sweep = tokio::spawn(async move { sweeper.advance_all().await });

    // Let the sweep finish before the producer is invoked.
    assert_eq!(sweep.await.unwrap(), Ok(0));

    let producer = resolve_after(&clock, Duration::from_millis(1000));
    assert!(
        time::timeout(Duration::from_millis(5000), producer)
            .await
            .is_err()
    );
}

#[tokio::test(start_paused = true)]
async fn detached_sweep_spawned_first_still_sees_a_synchronous_registration() {
    let clock = Clock::new(TimerMode::Simulated);
    let sweeper = clock.clone();
    let sweep = tokio::spawn(async move { sweeper.advance_all().await });

    let value = resolve_after(&clock, Duration::from_millis(1000)).await;
    assert_eq!(value, Ok(RESOLVED));
    assert_eq!(sweep.await.unwrap(), Ok(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn detached_advance_resolves_on_a_multi_thread_runtime() {
    let runner = Runner::new(fast_settings());
    let mut failures = Vec::new();
    for _ in 0..200 {
        let report = runner.run(Scenario::DetachedAdvance).await;
        if report.outcome.is_err() {
            failures.push(report.outcome);
        }
    }
    assert!(failures.is_empty(), "{} failures: {:?}", failures.len(), failures.first());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn full_suite_is_as_documented_on_a_multi_thread_runtime() {
    let suite = Runner::new(fast_settings()).run_suite().await;
    assert!(suite.all_as_documented(), "{}", suite.render(MarkerStyle::Ascii));
}
