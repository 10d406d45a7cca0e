//! Two opposing transfers over the same pair of accounts
//!
//! Accounts 1 and 2 start with equal balances; one task moves money 1 → 2
//! while another moves a different amount 2 → 1. Any interleaving must leave
//! the total unchanged, and neither task may wait forever on the other.

use super::{OutcomeCounters, ReportInputs, WorkloadContext, WorkloadReport};
use crate::strategy::Task;
use crate::types::{AccountId, BankError};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

const FIRST: AccountId = 1;
const SECOND: AccountId = 2;

/// Parameters for the pairwise transfer scenario
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseConfig {
    pub initial_balance: Decimal,
    /// Amount moved from account 1 to account 2
    pub forward: Decimal,
    /// Amount moved from account 2 to account 1
    pub backward: Decimal,
}

impl Default for PairwiseConfig {
    fn default() -> Self {
        Self {
            initial_balance: Decimal::from(500),
            forward: Decimal::from(300),
            backward: Decimal::from(200),
        }
    }
}

pub fn run_pairwise(
    ctx: &WorkloadContext<'_>,
    config: &PairwiseConfig,
) -> Result<WorkloadReport, BankError> {
    info!(
        forward = %config.forward,
        backward = %config.backward,
        "Starting pairwise transfers"
    );

    let registry = ctx.registry();
    let first = registry.open(FIRST, config.initial_balance)?;
    let second = registry.open(SECOND, config.initial_balance)?;
    let opening_total = registry.total_balance();
    let counters = Arc::new(OutcomeCounters::new());

    let legs = [
        (Arc::clone(&first), Arc::clone(&second), config.forward),
        (Arc::clone(&second), Arc::clone(&first), config.backward),
    ];
    let tasks: Vec<Task> = legs
        .into_iter()
        .map(|(source, target, amount)| {
            let coordinator = ctx.coordinator();
            let counters = Arc::clone(&counters);
            Box::new(move || {
                counters.record_transfer(coordinator.transfer(&source, &target, amount));
            }) as Task
        })
        .collect();

    let started = Instant::now();
    ctx.runner.run(tasks)?;

    let accounts = [first, second];
    let report = ReportInputs {
        scenario: "Pairwise transfers",
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
        committed = report.counts.transfers_committed,
        timed_out = report.counts.transfers_timed_out,
        "Pairwise transfers finished"
    );
    Ok(report)
}
