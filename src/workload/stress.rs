//! Many tasks transferring between random distinct accounts

use super::random::{RandomSource, RandomSourceFactory};
use super::{pause, OutcomeCounters, ReportInputs, WorkloadContext, WorkloadReport};
use crate::strategy::Task;
use crate::types::BankError;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Parameters for the stress scenario
#[derive(Debug, Clone, PartialEq)]
pub struct StressConfig {
    /// Must be at least 2
    pub accounts: usize,
    pub initial_balance: Decimal,
    pub tasks: usize,
    /// Transfers per task
    pub rounds: usize,
    pub amount: Decimal,
    pub pause: Duration,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            accounts: 20,
            initial_balance: Decimal::from(1000),
            tasks: 100,
            rounds: 5,
            amount: Decimal::from(50),
            pause: Duration::from_millis(10),
        }
    }
}

impl StressConfig {
    /// Zero task or round counts fall back to the defaults; the account
    /// count is checked when the scenario runs.
    pub fn new(accounts: usize, tasks: usize, rounds: usize, pause: Duration) -> Self {
        let defaults = Self::default();
        let tasks = if tasks == 0 {
            warn!(default = defaults.tasks, "Task count must be greater than 0, using default");
            defaults.tasks
        } else {
            tasks
        };
        let rounds = if rounds == 0 {
            warn!(default = defaults.rounds, "Round count must be greater than 0, using default");
            defaults.rounds
        } else {
            rounds
        };

        Self {
            accounts,
            tasks,
            rounds,
            pause,
            ..defaults
        }
    }
}

/// Run `tasks` tasks, each doing `rounds` transfers between two random
/// distinct accounts
///
/// # Errors
///
/// - `BankError::InvalidConfig` if fewer than two accounts are configured
pub fn run_stress<F>(
    ctx: &WorkloadContext<'_>,
    config: &StressConfig,
    random: &F,
) -> Result<WorkloadReport, BankError>
where
    F: RandomSourceFactory,
{
    if config.accounts < 2 {
        return Err(BankError::invalid_config(&format!(
            "stress needs at least 2 accounts, got {}",
            config.accounts
        )));
    }

    info!(
        accounts = config.accounts,
        tasks = config.tasks,
        rounds = config.rounds,
        "Starting stress test"
    );

    let registry = ctx.registry();
    let accounts = registry.open_many(config.accounts, config.initial_balance)?;
    let opening_total = registry.total_balance();
    let counters = Arc::new(OutcomeCounters::new());

    let tasks: Vec<Task> = (0..config.tasks)
        .map(|index| {
            let accounts = accounts.clone();
            let counters = Arc::clone(&counters);
            let coordinator = ctx.coordinator();
            let mut rng = random.for_task(index);
            let config = config.clone();

            Box::new(move || {
                for _ in 0..config.rounds {
                    let (from, to) = rng.pick_pair(accounts.len());
                    counters.record_transfer(coordinator.transfer(
                        &accounts[from],
                        &accounts[to],
                        config.amount,
                    ));
                    pause(config.pause);
                }
            }) as Task
        })
        .collect();

    let started = Instant::now();
    ctx.runner.run(tasks)?;

    let report = ReportInputs {
        scenario: "Stress test",
        runner: ctx.runner.name(),
        started,
        opening_total,
        accounts: &accounts,
        counters: &counters,
        deposit_amount: Decimal::ZERO,
        withdraw_amount: Decimal::ZERO,
    }
    .into_report();

    info!(
        elapsed_ms = report.elapsed.as_millis() as u64,
        committed = report.counts.transfers_committed,
        refused = report.counts.transfers_refused,
        timed_out = report.counts.transfers_timed_out,
        "Stress test finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MemoryAuditLog, TransferConfig};
    use crate::strategy::ThreadPerTaskRunner;
    use crate::workload::random::{ConstantRandom, SeededRandom};
    use rstest::rstest;

    fn context(log: Arc<MemoryAuditLog>) -> WorkloadContext<'static> {
        WorkloadContext::new(&ThreadPerTaskRunner, TransferConfig::default(), log)
    }

    #[rstest]
    #[case::none(0)]
    #[case::one(1)]
    fn test_rejects_too_few_accounts(#[case] accounts: usize) {
        let ctx = context(Arc::new(MemoryAuditLog::new()));
        let config = StressConfig::new(accounts, 4, 2, Duration::ZERO);

        let result = run_stress(&ctx, &config, &SeededRandom::seeded(1));

        assert!(matches!(result, Err(BankError::InvalidConfig { .. })));
    }

    #[test]
    fn test_constant_pair_drains_first_account() {
        let log = Arc::new(MemoryAuditLog::new());
        let ctx = context(log.clone());
        let config = StressConfig {
            initial_balance: Decimal::from(100),
            ..StressConfig::new(2, 5, 1, Duration::ZERO)
        };

        // Every task picks 0 -> 1; only two transfers of 50 fit
        let report = run_stress(&ctx, &config, &ConstantRandom { heads: true }).unwrap();

        assert_eq!(report.counts.transfers_committed, 2);
        assert_eq!(report.counts.transfers_refused, 3);
        assert_eq!(report.balance_of(0), Some(Decimal::ZERO));
        assert_eq!(report.balance_of(1), Some(Decimal::from(200)));
        assert_eq!(report.non_zero_accounts(), 1);
        assert_eq!(log.count_containing("Insufficient funds, available: $0"), 3);
    }

    #[test]
    fn test_random_stress_conserves() {
        let ctx = context(Arc::new(MemoryAuditLog::new()));
        let config = StressConfig::new(20, 40, 5, Duration::ZERO);

        let report = run_stress(&ctx, &config, &SeededRandom::seeded(2024)).unwrap();

        assert_eq!(report.counts.transfers(), 200);
        assert_eq!(report.counts.errors, 0);
        assert_eq!(report.closing_total, Decimal::from(20_000));
        assert!(report.conserved());
        assert!(!report.has_negative_balance());
    }
}
