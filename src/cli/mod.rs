// CLI module
// Command-line interface, argument parsing and scenario dispatch

mod args;
mod scenarios;

pub use args::{CliArgs, RunnerType, ScenarioType};
pub use scenarios::run_scenarios;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// If parsing fails (e.g., an unknown scenario, a malformed number, or the
/// --help flag), clap displays an error message or help text and exits the
/// process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
