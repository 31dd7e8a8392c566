use clap::Parser;
use timerlab_engine::Scenario;

#[derive(Debug, Parser)]
#[command(name = "timerlab")]
#[command(
    about = "Run the timer scenarios and report each outcome against its documented expectation"
)]
pub struct CliArgs {
    /// List scenarios and exit
    #[arg(long)]
    pub list: bool,
    /// Use [ok]/[FAIL]/[warn] instead of emoji markers
    #[arg(long)]
    pub ascii: bool,
    /// Scenarios to run (all of them by default)
    #[arg(value_name = "SCENARIO", value_parser = Scenario::parse)]
    pub scenarios: Vec<Scenario>,
}

impl CliArgs {
    /// Requested scenarios in command-line order without repeats, or every scenario.
    pub fn scenarios_or_all(&self) -> Vec<Scenario> {
        if self.scenarios.is_empty() {
            return Scenario::ALL.to_vec();
        }
        let mut scenarios = Vec::with_capacity(self.scenarios.len());
        for &scenario in &self.scenarios {
            if !scenarios.contains(&scenario) {
                scenarios.push(scenario);
            }
        }
        scenarios
    }
}
