//! Configuration flowing into the runner.

use std::time::Duration;

use timerlab_config::{ConfigError, Settings, TimerlabConfig};
use timerlab_engine::{Runner, Scenario, ScenarioError};

use crate::common::write_config;

#[tokio::test(start_paused = true)]
async fn configured_timeout_bounds_the_failing_scenario() {
    let (_dir, path) = write_config(
        r"
[timers]
delay_ms = 250
timeout_ms = 750
",
    );
    let config = TimerlabConfig::load_from(&path).unwrap();
    let settings = Settings::from_config(config.as_ref()).unwrap();
    let runner = Runner::new(settings);

    let report = runner.run(Scenario::AwaitThenAdvance).await;
    assert_eq!(
        report.outcome,
        Err(ScenarioError::Timeout {
            after: Duration::from_millis(750)
        })
    );

    let report = runner.run(Scenario::RealTimer).await;
    assert!(report.matches_expectation());
    assert!(report.elapsed >= Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn configured_loop_limit_reaches_the_clock() {
    let (_dir, path) = write_config("[timers]\nloop_limit = 1\n");
    let config = TimerlabConfig::load_from(&path).unwrap();
    let settings = Settings::from_config(config.as_ref()).unwrap();
    assert_eq!(settings.loop_limit, 1);

    // One producer timer fits within a limit of one.
    let report = Runner::new(settings).run(Scenario::AdvanceThenObserve).await;
    assert!(report.matches_expectation());
}

#[test]
fn invalid_config_is_rejected_before_running() {
    let (_dir, path) = write_config("[timers]\ntimeout_ms = 0\n");
    let config = TimerlabConfig::load_from(&path).unwrap();

    assert!(matches!(
        Settings::from_config(config.as_ref()),
        Err(ConfigError::Invalid { .. })
    ));
}

#[test]
fn ascii_only_is_read_from_app_section() {
    let (_dir, path) = write_config("[app]\nascii_only = true\n");
    let config = TimerlabConfig::load_from(&path).unwrap();

    assert!(Settings::from_config(config.as_ref()).unwrap().ascii_only);
}
