//! Rust Concurrent Accounts Library
//! # Overview
//!
//! This library models shared accounts accessed by many concurrent tasks. It
//! provides locked deposits and withdrawals, two-account transfers that can
//! never deadlock, a serialized audit trail, and workload drivers that
//! exercise all of it under contention.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (AccountId, snapshots, outcomes, errors)
//! - [`cli`] - CLI arguments parsing and scenario dispatch
//! - [`core`] - Account logic:
//!   - [`core::account`] - Lock-guarded balance with deposit and withdraw
//!   - [`core::transfer`] - Try-lock transfer protocol with bounded retry and timeout
//!   - [`core::audit_log`] - Audit sinks writing one complete line per record
//!   - [`core::registry`] - Id-indexed store handing out shared account handles
//! - [`strategy`] - Pluggable task runners (thread per task, bounded pool)
//! - [`workload`] - Scenario drivers and their reports
//! - [`io`] - Balance CSV output and the directory listing consumer
//!
//! # Operations
//!
//! - **Deposit**: Credit an account under its lock
//! - **Withdraw**: Debit an account under its lock if the balance covers it
//! - **Transfer**: Move funds between two accounts, holding both locks only
//!   together and never waiting on one while holding the other
//!
//! # Outcomes
//!
//! Contract violations (negative amounts, self-transfers, unknown ids) are
//! `Err(BankError)`. Insufficient funds and transfer timeouts are ordinary
//! outcomes, reported as `Ok` values and written to the audit trail. A failed
//! operation never changes a balance.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;
pub mod workload;

pub use crate::core::{
    Account, AccountRegistry, AuditSink, MemoryAuditLog, TransferConfig, TransferCoordinator,
    WriterAuditLog,
};
pub use io::write_balances_csv;
pub use types::{AccountId, AccountSnapshot, BankError, TransferOutcome, WithdrawOutcome};
pub use workload::WorkloadReport;
