//! Many tasks withdrawing from one account
//!
//! Exactly `min(tasks * rounds, balance / amount)` withdrawals can succeed
//! regardless of interleaving.

use super::{pause, OutcomeCounters, ReportInputs, WorkloadContext, WorkloadReport};
use crate::strategy::Task;
use crate::types::{AccountId, BankError};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

const ACCOUNT: AccountId = 1;

/// Parameters for the withdrawal race
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalRaceConfig {
    pub initial_balance: Decimal,
    pub tasks: usize,
    /// Withdrawals per task
    pub rounds: usize,
    pub amount: Decimal,
    pub pause: Duration,
}

impl Default for WithdrawalRaceConfig {
    fn default() -> Self {
        Self {
            initial_balance: Decimal::from(1000),
            tasks: 10,
            rounds: 3,
            amount: Decimal::from(100),
            pause: Duration::from_millis(10),
        }
    }
}

pub fn run_withdrawal_race(
    ctx: &WorkloadContext<'_>,
    config: &WithdrawalRaceConfig,
) -> Result<WorkloadReport, BankError> {
    info!(
        tasks = config.tasks,
        rounds = config.rounds,
        amount = %config.amount,
        "Starting withdrawal race"
    );

    let registry = ctx.registry();
    let account = registry.open(ACCOUNT, config.initial_balance)?;
    let opening_total = registry.total_balance();
    let counters = Arc::new(OutcomeCounters::new());

    let tasks: Vec<Task> = (0..config.tasks)
        .map(|_| {
            let account = Arc::clone(&account);
            let counters = Arc::clone(&counters);
            let (rounds, amount, interval) = (config.rounds, config.amount, config.pause);

            Box::new(move || {
                for _ in 0..rounds {
                    counters.record_withdraw(account.withdraw(amount));
                    pause(interval);
                }
            }) as Task
        })
        .collect();

    let started = Instant::now();
    ctx.runner.run(tasks)?;

    let accounts = [account];
    let report = ReportInputs {
        scenario: "Withdrawal race",
        runner: ctx.runner.name(),
        started,
        opening_total,
        accounts: &accounts,
        counters: &counters,
        deposit_amount: Decimal::ZERO,
        withdraw_amount: config.amount,
    }
    .into_report();

    info!(
        successful = report.counts.withdrawals,
        refused = report.counts.withdrawals_refused,
        "Withdrawal race finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MemoryAuditLog, TransferConfig};
    use crate::strategy::{PoolConfig, PooledRunner, TaskRunner, ThreadPerTaskRunner};
    use rstest::rstest;

    #[rstest]
    fn test_default_race_allows_exactly_ten(
        #[values(
            Box::new(ThreadPerTaskRunner) as Box<dyn TaskRunner>,
            Box::new(PooledRunner::new(PoolConfig::new(4))) as Box<dyn TaskRunner>
        )]
        runner: Box<dyn TaskRunner>,
    ) {
        let log = Arc::new(MemoryAuditLog::new());
        let ctx = WorkloadContext::new(runner.as_ref(), TransferConfig::default(), log.clone());
        let config = WithdrawalRaceConfig {
            pause: Duration::ZERO,
            ..WithdrawalRaceConfig::default()
        };

        let report = run_withdrawal_race(&ctx, &config).unwrap();

        assert_eq!(report.counts.withdrawals, 10);
        assert_eq!(report.counts.withdrawals_refused, 20);
        assert_eq!(report.balance_of(ACCOUNT), Some(Decimal::ZERO));
        assert!(report.conserved());
        assert_eq!(log.count_containing("Withdrawn $100"), 10);
        assert_eq!(log.count_containing("Insufficient funds for withdrawal"), 20);
    }

    #[rstest]
    #[case::plenty(5000, 30, 2000)]
    #[case::uneven(250, 2, 50)]
    fn test_race_final_balance(#[case] initial: i64, #[case] successes: u64, #[case] remaining: i64) {
        let ctx = WorkloadContext::new(
            &ThreadPerTaskRunner,
            TransferConfig::default(),
            Arc::new(MemoryAuditLog::new()),
        );
        let config = WithdrawalRaceConfig {
            initial_balance: Decimal::from(initial),
            pause: Duration::ZERO,
            ..WithdrawalRaceConfig::default()
        };

        let report = run_withdrawal_race(&ctx, &config).unwrap();

        assert_eq!(report.counts.withdrawals, successes);
        assert_eq!(report.balance_of(ACCOUNT), Some(Decimal::from(remaining)));
    }
}
