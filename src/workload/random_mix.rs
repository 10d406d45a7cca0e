//! Random deposit/withdraw mix, and the full demo program built on it

use super::random::{RandomSource, RandomSourceFactory};
use super::{pause, OutcomeCounters, ReportInputs, WorkloadContext, WorkloadReport};
use crate::core::{Account, TransferCoordinator};
use crate::strategy::Task;
use crate::types::BankError;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Parameters for the random deposit/withdraw mix
#[derive(Debug, Clone, PartialEq)]
pub struct RandomMixConfig {
    pub accounts: usize,
    pub initial_balance: Decimal,
    /// Operations per task
    pub rounds: usize,
    pub deposit_amount: Decimal,
    pub withdraw_amount: Decimal,
    /// Sleep between a task's operations
    pub pause: Duration,
}

impl Default for RandomMixConfig {
    fn default() -> Self {
        Self {
            accounts: 10,
            initial_balance: Decimal::from(1000),
            rounds: 5,
            deposit_amount: Decimal::from(100),
            withdraw_amount: Decimal::from(50),
            pause: Duration::from_millis(100),
        }
    }
}

impl RandomMixConfig {
    /// Mix over `accounts` accounts with `rounds` operations each
    ///
    /// Zero counts fall back to the defaults.
    pub fn new(accounts: usize, rounds: usize, pause: Duration) -> Self {
        let defaults = Self::default();
        let accounts = if accounts == 0 {
            warn!(default = defaults.accounts, "Account count must be greater than 0, using default");
            defaults.accounts
        } else {
            accounts
        };
        let rounds = if rounds == 0 {
            warn!(default = defaults.rounds, "Round count must be greater than 0, using default");
            defaults.rounds
        } else {
            rounds
        };

        Self {
            accounts,
            rounds,
            pause,
            ..defaults
        }
    }
}

/// Parameters for the demo program: the random mix plus a transfer chain
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramConfig {
    pub mix: RandomMixConfig,
    /// Amount of each chained transfer
    pub transfer_amount: Decimal,
    /// Transfers per chain link
    pub transfer_rounds: usize,
    pub transfer_pause: Duration,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            mix: RandomMixConfig::default(),
            transfer_amount: Decimal::from(100),
            transfer_rounds: 3,
            transfer_pause: Duration::from_millis(50),
        }
    }
}

impl ProgramConfig {
    /// Same pause applied to both the mix and the chain; zero keeps both at zero
    pub fn with_pause(mut self, pause: Option<Duration>) -> Self {
        if let Some(pause) = pause {
            self.mix.pause = pause;
            self.transfer_pause = pause;
        }
        self
    }
}

/// One task per account, each doing random deposits and withdrawals
///
/// The result conserves money in the sense of [`WorkloadReport::conserved`]
/// and never shows a negative balance.
pub fn run_random_mix<F>(
    ctx: &WorkloadContext<'_>,
    config: &RandomMixConfig,
    random: &F,
) -> Result<WorkloadReport, BankError>
where
    F: RandomSourceFactory,
{
    info!(accounts = config.accounts, rounds = config.rounds, "Starting random mix");

    let registry = ctx.registry();
    let accounts = registry.open_many(config.accounts, config.initial_balance)?;
    let opening_total = registry.total_balance();
    let counters = Arc::new(OutcomeCounters::new());

    let tasks = mix_tasks(&accounts, config, random, &counters);

    let started = Instant::now();
    ctx.runner.run(tasks)?;

    let report = ReportInputs {
        scenario: "Random mix",
        runner: ctx.runner.name(),
        started,
        opening_total,
        accounts: &accounts,
        counters: &counters,
        deposit_amount: config.deposit_amount,
        withdraw_amount: config.withdraw_amount,
    }
    .into_report();

    info!(elapsed_ms = report.elapsed.as_millis() as u64, "Random mix finished");
    Ok(report)
}

/// The demo program
///
/// Runs the random mix on every account while a chain of tasks moves money
/// from account `i` to `i + 1`, all at the same time.
pub fn run_program<F>(
    ctx: &WorkloadContext<'_>,
    config: &ProgramConfig,
    random: &F,
) -> Result<WorkloadReport, BankError>
where
    F: RandomSourceFactory,
{
    let mix = &config.mix;
    info!(
        accounts = mix.accounts,
        rounds = mix.rounds,
        transfer_rounds = config.transfer_rounds,
        "Starting program"
    );

    let registry = ctx.registry();
    let accounts = registry.open_many(mix.accounts, mix.initial_balance)?;
    let opening_total = registry.total_balance();
    let counters = Arc::new(OutcomeCounters::new());
    let coordinator = ctx.coordinator();

    let mut tasks = mix_tasks(&accounts, mix, random, &counters);
    for link in accounts.windows(2) {
        tasks.push(chain_task(
            Arc::clone(&link[0]),
            Arc::clone(&link[1]),
            config,
            coordinator.clone(),
            Arc::clone(&counters),
        ));
    }

    let started = Instant::now();
    ctx.runner.run(tasks)?;

    let report = ReportInputs {
        scenario: "Program",
        runner: ctx.runner.name(),
        started,
        opening_total,
        accounts: &accounts,
        counters: &counters,
        deposit_amount: mix.deposit_amount,
        withdraw_amount: mix.withdraw_amount,
    }
    .into_report();

    info!(elapsed_ms = report.elapsed.as_millis() as u64, "Program finished");
    Ok(report)
}

fn mix_tasks<F>(
    accounts: &[Arc<Account>],
    config: &RandomMixConfig,
    random: &F,
    counters: &Arc<OutcomeCounters>,
) -> Vec<Task>
where
    F: RandomSourceFactory,
{
    accounts
        .iter()
        .enumerate()
        .map(|(index, account)| {
            let account = Arc::clone(account);
            let counters = Arc::clone(counters);
            let mut rng = random.for_task(index);
            let config = config.clone();

            Box::new(move || {
                for _ in 0..config.rounds {
                    if rng.coin() {
                        counters.record_deposit(account.deposit(config.deposit_amount));
                    } else {
                        counters.record_withdraw(account.withdraw(config.withdraw_amount));
                    }
                    pause(config.pause);
                }
            }) as Task
        })
        .collect()
}

fn chain_task(
    source: Arc<Account>,
    target: Arc<Account>,
    config: &ProgramConfig,
    coordinator: TransferCoordinator,
    counters: Arc<OutcomeCounters>,
) -> Task {
    let amount = config.transfer_amount;
    let rounds = config.transfer_rounds;
    let interval = config.transfer_pause;

    Box::new(move || {
        for _ in 0..rounds {
            counters.record_transfer(coordinator.transfer(&source, &target, amount));
            pause(interval);
        }
    })
}
