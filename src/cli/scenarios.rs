//! Scenario dispatch for the binary
//!
//! Turns parsed arguments into configured workloads, runs them in order, and
//! writes each summary to the given output.

use super::args::{CliArgs, ScenarioType};
use crate::core::AuditSink;
use crate::io::{run_listing, write_balances_csv};
use crate::strategy::create_runner;
use crate::types::BankError;
use crate::workload::{
    run_pairwise, run_program, run_random_mix, run_stress, run_withdrawal_race, WorkloadContext,
    WorkloadReport,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use tracing::info;

/// Run every scenario selected by `args`
///
/// Workload summaries and the listing summary go to `out`; the audit trail
/// goes to `audit`. When `--balances-csv` is given, the final balances of the
/// last workload run are written there.
///
/// Returns the workload reports in run order.
pub fn run_scenarios(
    args: &CliArgs,
    audit: Arc<dyn AuditSink>,
    out: &mut dyn Write,
) -> Result<Vec<WorkloadReport>, BankError> {
    let runner = create_runner(args.runner, Some(args.to_pool_config()));
    let ctx = WorkloadContext::new(runner.as_ref(), args.to_transfer_config(), audit);
    let random = args.to_random();

    if let Some(seed) = random.seed() {
        info!(seed, "Using seeded random choices");
    }

    let mut reports = Vec::new();
    for scenario in args.scenario.expand() {
        info!(?scenario, runner = runner.name(), "Running scenario");

        let report = match scenario {
            ScenarioType::Program => run_program(&ctx, &args.to_program_config(), &random)?,
            ScenarioType::Mix => run_random_mix(&ctx, &args.to_mix_config(), &random)?,
            ScenarioType::Concurrency => run_withdrawal_race(&ctx, &args.to_race_config())?,
            ScenarioType::Synchronization => run_pairwise(&ctx, &args.to_pairwise_config())?,
            ScenarioType::Stress => run_stress(&ctx, &args.to_stress_config(), &random)?,
            ScenarioType::Listing => {
                let summary = run_listing(&args.listing_dir)?;
                writeln!(out, "{}", summary)?;
                continue;
            }
            ScenarioType::All => continue,
        };

        writeln!(out, "{}", report)?;
        reports.push(report);
    }

    if let (Some(path), Some(last)) = (&args.balances_csv, reports.last()) {
        let mut file = BufWriter::new(File::create(path)?);
        write_balances_csv(&last.balances, &mut file)?;
        file.flush()?;
        info!(path = %path.display(), "Wrote final balances");
    }

    Ok(reports)
}
