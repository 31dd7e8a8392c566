//! timerlab CLI - runs the timer scenarios and prints what happened.
//!
//! ```text
//! main() -> init_tracing() -> Settings (config file) -> Runner::run_all() -> SuiteReport
//! ```
//!
//! Exit status is non-zero when any scenario deviates from its documented
//! outcome.

mod args;

use anyhow::{Context as _, Result};
use clap::Parser as _;
use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use timerlab_config::{Settings, TimerlabConfig};
use timerlab_engine::{MarkerStyle, Runner, Scenario, SuiteReport};

use crate::args::CliArgs;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // The report owns stdout; logs go to stderr when no file is available.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.timerlab/logs/timerlab.log
    if let Some(config_path) = TimerlabConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("timerlab.log"));
    }

    // Fallback: ./.timerlab/logs/timerlab.log
    candidates.push(PathBuf::from(".timerlab").join("logs").join("timerlab.log"));

    candidates
}

fn print_list(out: &mut impl Write) -> io::Result<()> {
    for scenario in Scenario::ALL {
        writeln!(
            out,
            "{:<22} {:<9} {:<17} {}",
            scenario.name(),
            scenario.mode().as_str(),
            scenario.expectation().as_str(),
            scenario.description(),
        )?;
    }
    Ok(())
}

/// 0 when every scenario did what it is documented to do, 1 otherwise.
fn exit_status(suite: &SuiteReport) -> u8 {
    u8::from(!suite.all_as_documented())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = CliArgs::parse();

    let mut stdout = io::stdout().lock();
    if args.list {
        print_list(&mut stdout)?;
        return Ok(ExitCode::SUCCESS);
    }

    init_tracing();

    let config = TimerlabConfig::load().context("loading configuration")?;
    let settings = Settings::from_config(config.as_ref()).context("validating configuration")?;
    let style = MarkerStyle::from_ascii_only(args.ascii || settings.ascii_only);
    tracing::info!(
        delay = ?settings.delay,
        timeout = ?settings.timeout,
        loop_limit = settings.loop_limit,
        "Running scenarios"
    );

    let scenarios = args.scenarios_or_all();
    let suite = Runner::new(settings).run_all(&scenarios).await;

    write!(stdout, "{}", suite.render(style))?;
    stdout.flush()?;

    Ok(ExitCode::from(exit_status(&suite)))
}
