//! Workload drivers
//!
//! Each driver builds a fresh account population, turns a scenario into a
//! list of independent tasks, hands them to a [`TaskRunner`], and summarizes
//! the result in a [`WorkloadReport`]. Drivers never hold an account lock and
//! never coordinate tasks beyond spawning and joining them.
//!
//! - [`random_mix`] - Random deposits and withdrawals, plus the full demo program
//! - [`pairwise`] - Two opposing transfers over the same two accounts
//! - [`stress`] - Many tasks transferring between random distinct accounts
//! - [`withdrawal_race`] - Many tasks withdrawing from one account

pub mod pairwise;
pub mod random;
pub mod random_mix;
pub mod stress;
pub mod withdrawal_race;

pub use pairwise::{run_pairwise, PairwiseConfig};
pub use random::{RandomSource, RandomSourceFactory, SeededRandom};
pub use random_mix::{run_program, run_random_mix, ProgramConfig, RandomMixConfig};
pub use stress::{run_stress, StressConfig};
pub use withdrawal_race::{run_withdrawal_race, WithdrawalRaceConfig};

use crate::core::{Account, AccountRegistry, AuditSink, TransferConfig, TransferCoordinator};
use crate::strategy::TaskRunner;
use crate::types::{AccountSnapshot, BankError, TransferOutcome, WithdrawOutcome};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::error;

/// Shared collaborators for every driver
pub struct WorkloadContext<'a> {
    /// Runs and joins the driver's tasks
    pub runner: &'a dyn TaskRunner,
    /// Timing limits for transfers made by the driver
    pub transfer: TransferConfig,
    /// Sink for the audit trail
    pub audit: Arc<dyn AuditSink>,
}

impl<'a> WorkloadContext<'a> {
    pub fn new(runner: &'a dyn TaskRunner, transfer: TransferConfig, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            runner,
            transfer,
            audit,
        }
    }

    /// Fresh registry writing to this context's audit sink
    pub(crate) fn registry(&self) -> AccountRegistry {
        AccountRegistry::new(Arc::clone(&self.audit))
    }

    /// Transfer coordinator writing to this context's audit sink
    pub(crate) fn coordinator(&self) -> TransferCoordinator {
        TransferCoordinator::new(self.transfer.clone(), Arc::clone(&self.audit))
    }
}

/// Outcome counters shared by the tasks of one workload
#[derive(Debug, Default)]
pub struct OutcomeCounters {
    deposits: AtomicU64,
    withdrawals: AtomicU64,
    withdrawals_refused: AtomicU64,
    transfers_committed: AtomicU64,
    transfers_refused: AtomicU64,
    transfers_timed_out: AtomicU64,
    errors: AtomicU64,
}

impl OutcomeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_deposit(&self, result: Result<Decimal, BankError>) {
        match result {
            Ok(_) => {
                self.deposits.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => self.record_error(&e),
        }
    }

    pub fn record_withdraw(&self, result: Result<WithdrawOutcome, BankError>) {
        match result {
            Ok(outcome) if outcome.is_success() => {
                self.withdrawals.fetch_add(1, Ordering::Relaxed);
            }
            Ok(_) => {
                self.withdrawals_refused.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => self.record_error(&e),
        }
    }

    pub fn record_transfer(&self, result: Result<TransferOutcome, BankError>) {
        match result {
            Ok(TransferOutcome::Committed { .. }) => {
                self.transfers_committed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(TransferOutcome::InsufficientFunds { .. }) => {
                self.transfers_refused.fetch_add(1, Ordering::Relaxed);
            }
            Ok(TransferOutcome::TimedOut { .. }) => {
                self.transfers_timed_out.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => self.record_error(&e),
        }
    }

    fn record_error(&self, error: &BankError) {
        error!(%error, "Workload operation failed");
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Plain copy of the counters
    pub fn counts(&self) -> OutcomeCounts {
        OutcomeCounts {
            deposits: self.deposits.load(Ordering::Relaxed),
            withdrawals: self.withdrawals.load(Ordering::Relaxed),
            withdrawals_refused: self.withdrawals_refused.load(Ordering::Relaxed),
            transfers_committed: self.transfers_committed.load(Ordering::Relaxed),
            transfers_refused: self.transfers_refused.load(Ordering::Relaxed),
            transfers_timed_out: self.transfers_timed_out.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// How many operations ended in each outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub deposits: u64,
    pub withdrawals: u64,
    pub withdrawals_refused: u64,
    pub transfers_committed: u64,
    pub transfers_refused: u64,
    pub transfers_timed_out: u64,
    pub errors: u64,
}

impl OutcomeCounts {
    pub fn transfers(&self) -> u64 {
        self.transfers_committed + self.transfers_refused + self.transfers_timed_out
    }
}

/// Aggregate result of one workload run
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadReport {
    /// Scenario name
    pub scenario: String,
    /// Name of the task runner used
    pub runner: &'static str,
    /// Wall-clock time from first spawn to last join
    pub elapsed: Duration,
    /// Sum of balances when the accounts were opened
    pub opening_total: Decimal,
    /// Sum of balances after all tasks joined
    pub closing_total: Decimal,
    /// Total amount deposited by successful deposits
    pub deposited: Decimal,
    /// Total amount removed by successful withdrawals
    pub withdrawn: Decimal,
    /// Outcome counters
    pub counts: OutcomeCounts,
    /// Final balances in id order
    pub balances: Vec<AccountSnapshot>,
}

impl WorkloadReport {
    /// `true` if closing = opening + deposited - withdrawn
    ///
    /// Transfers are zero-sum and must not show up here.
    pub fn conserved(&self) -> bool {
        self.closing_total == self.opening_total + self.deposited - self.withdrawn
    }

    /// `true` if any final balance is below zero
    pub fn has_negative_balance(&self) -> bool {
        self.balances.iter().any(|b| b.balance < Decimal::ZERO)
    }

    pub fn non_zero_accounts(&self) -> usize {
        self.balances
            .iter()
            .filter(|b| b.balance > Decimal::ZERO)
            .count()
    }

    /// Balance of the account with `id`, if it took part
    pub fn balance_of(&self, id: u32) -> Option<Decimal> {
        self.balances.iter().find(|b| b.id == id).map(|b| b.balance)
    }
}

impl fmt::Display for WorkloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} completed in {:.3} seconds (runner: {})",
            self.scenario,
            self.elapsed.as_secs_f64(),
            self.runner
        )?;
        writeln!(
            f,
            "Deposits: {}, withdrawals: {} ({} refused)",
            self.counts.deposits, self.counts.withdrawals, self.counts.withdrawals_refused
        )?;
        writeln!(
            f,
            "Transfers: {} committed, {} refused, {} timed out",
            self.counts.transfers_committed,
            self.counts.transfers_refused,
            self.counts.transfers_timed_out
        )?;
        writeln!(
            f,
            "Total: ${} -> ${} (conserved: {})",
            self.opening_total,
            self.closing_total,
            self.conserved()
        )?;
        writeln!(
            f,
            "Total accounts with non-zero balance: {}",
            self.non_zero_accounts()
        )?;
        writeln!(f, "Final balances:")?;
        for snapshot in &self.balances {
            writeln!(f, "Account {}: ${}", snapshot.id, snapshot.balance)?;
        }
        Ok(())
    }
}

/// Inputs for assembling a report once every task has joined
pub(crate) struct ReportInputs<'a> {
    pub scenario: &'a str,
    pub runner: &'static str,
    pub started: Instant,
    pub opening_total: Decimal,
    pub accounts: &'a [Arc<Account>],
    pub counters: &'a OutcomeCounters,
    pub deposit_amount: Decimal,
    pub withdraw_amount: Decimal,
}

impl ReportInputs<'_> {
    pub fn into_report(self) -> WorkloadReport {
        let elapsed = self.started.elapsed();
        let counts = self.counters.counts();

        let mut balances: Vec<AccountSnapshot> =
            self.accounts.iter().map(|account| account.snapshot()).collect();
        balances.sort_by_key(|snapshot| snapshot.id);
        let closing_total = balances.iter().map(|s| s.balance).sum();

        WorkloadReport {
            scenario: self.scenario.to_string(),
            runner: self.runner,
            elapsed,
            opening_total: self.opening_total,
            closing_total,
            deposited: self.deposit_amount * Decimal::from(counts.deposits),
            withdrawn: self.withdraw_amount * Decimal::from(counts.withdrawals),
            counts,
            balances,
        }
    }
}

/// Sleep between rounds unless the pause is zero
pub(crate) fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
