//! Serialized audit trail
//!
//! This module provides the typed [`AuditEvent`] records written by accounts
//! and the transfer coordinator, plus the sinks that serialize them:
//!
//! - [`WriterAuditLog`]: any `Write` destination (stdout, a file, a buffer)
//!   behind a single mutex
//! - [`MemoryAuditLog`]: keeps lines in memory for tests and reports
//! - [`DiscardAuditLog`]: drops everything, for benchmarks
//!
//! # Line Integrity
//!
//! A line and its newline are assembled before the sink's lock is taken and
//! written with one `write_all` while the lock is held. Concurrent callers
//! therefore never interleave inside a line. Line breaks inside a record are
//! escaped as `\n` / `\r`.

use super::traits::AuditSink;
use crate::types::AccountId;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::fmt;
use std::fs::File;
use std::io::{self, Stdout, Write};
use std::path::Path;
use tracing::error;

/// One auditable operation
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    /// Account was created with its initial balance
    Opened { account: AccountId, amount: Decimal },

    /// Deposit applied; `balance` is the post-deposit balance
    Deposited {
        account: AccountId,
        amount: Decimal,
        balance: Decimal,
    },

    /// Withdrawal applied; `balance` is the post-withdrawal balance
    Withdrawn {
        account: AccountId,
        amount: Decimal,
        balance: Decimal,
    },

    /// Withdrawal refused for lack of funds
    WithdrawalRefused {
        account: AccountId,
        amount: Decimal,
        balance: Decimal,
    },

    /// Transfer committed on both accounts
    TransferCompleted {
        source: AccountId,
        target: AccountId,
        amount: Decimal,
    },

    /// Transfer refused for lack of funds on the source
    TransferRefused {
        source: AccountId,
        target: AccountId,
        amount: Decimal,
        available: Decimal,
    },

    /// Transfer gave up before holding both locks
    TransferTimedOut {
        source: AccountId,
        target: AccountId,
        amount: Decimal,
        attempts: u32,
    },
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::Opened { account, amount } => {
                write!(
                    f,
                    "Account {}: Created with ${} (Balance: ${})",
                    account, amount, amount
                )
            }
            AuditEvent::Deposited {
                account,
                amount,
                balance,
            } => write!(
                f,
                "Account {}: Deposited ${} (Balance: ${})",
                account, amount, balance
            ),
            AuditEvent::Withdrawn {
                account,
                amount,
                balance,
            } => write!(
                f,
                "Account {}: Withdrawn ${} (Balance: ${})",
                account, amount, balance
            ),
            AuditEvent::WithdrawalRefused {
                account,
                amount,
                balance,
            } => write!(
                f,
                "Account {}: Insufficient funds for withdrawal of ${} (Balance: ${})",
                account, amount, balance
            ),
            AuditEvent::TransferCompleted {
                source,
                target,
                amount,
            } => write!(
                f,
                "completed transfer: ${} from Account {} to Account {}",
                amount, source, target
            ),
            AuditEvent::TransferRefused {
                source,
                target,
                amount,
                available,
            } => write!(
                f,
                "transfer refused: ${} from Account {} to Account {} (Insufficient funds, available: ${})",
                amount, source, target, available
            ),
            AuditEvent::TransferTimedOut {
                source,
                target,
                amount,
                attempts,
            } => write!(
                f,
                "transfer timed out: ${} from Account {} to Account {} after {} attempts (DEADLOCK PREVENTED)",
                amount, source, target, attempts
            ),
        }
    }
}

/// Audit sink over any writer, serialized by one mutex
#[derive(Debug)]
pub struct WriterAuditLog<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterAuditLog<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Give the writer back, e.g. to inspect a buffer after a run
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl WriterAuditLog<Stdout> {
    /// Audit log that prints to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl WriterAuditLog<File> {
    /// Audit log that truncates and writes to a file
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write + Send> AuditSink for WriterAuditLog<W> {
    fn record(&self, line: &str) {
        let mut buffer = String::with_capacity(line.len() + 1);
        push_escaped(&mut buffer, line);
        buffer.push('\n');

        let mut writer = self.writer.lock();
        if let Err(e) = writer
            .write_all(buffer.as_bytes())
            .and_then(|_| writer.flush())
        {
            error!(error = %e, "Failed to write audit line");
        }
    }
}

/// Append `line` with line breaks escaped, so one record stays one physical line
fn push_escaped(buffer: &mut String, line: &str) {
    for c in line.chars() {
        match c {
            '\n' => buffer.push_str("\\n"),
            '\r' => buffer.push_str("\\r"),
            c => buffer.push(c),
        }
    }
}

/// Audit sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all recorded lines in arrival order
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Number of recorded lines
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Number of lines containing `needle`
    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines
            .lock()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// Audit sink that drops every line
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardAuditLog;

impl AuditSink for DiscardAuditLog {
    fn record(&self, _line: &str) {}
}
