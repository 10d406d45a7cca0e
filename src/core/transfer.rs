//! Two-account transfers without deadlock
//!
//! This module provides the [`TransferCoordinator`], which moves funds between
//! two [`Account`]s. A transfer needs both balance locks at once, so two
//! transfers running in opposite directions over the same pair could each
//! hold one lock and wait forever for the other. The coordinator avoids this
//! without a global lock order.
//!
//! # Protocol
//!
//! ```text
//! deadline = now + timeout      -- unbounded if it does not fit an Instant
//! loop:
//!     try_lock(source)            -- never blocks
//!     try_lock(target)            -- never blocks; on failure release source
//!     both held:
//!         funds suffice  -> move, release both, audit, Committed
//!         otherwise      -> release both, audit, InsufficientFunds (no retry)
//!     deadline passed or attempt limit reached -> audit, TimedOut
//!     park on the contended lock (holding nothing) for at most `backoff`
//! ```
//!
//! Neither lock is ever held while waiting for the other, and each attempt
//! ends holding both or none. A circular wait cannot form. Under adversarial
//! contention both sides of an A->B / B->A pair may time out; that is the
//! price of bounded waiting, and such transfers leave both balances untouched.

use super::account::{ensure_non_negative, Account};
use super::audit_log::AuditEvent;
use super::traits::AuditSink;
use crate::types::{BankError, TransferOutcome};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Timing limits for transfers
#[derive(Clone, Debug, PartialEq)]
pub struct TransferConfig {
    /// How long a transfer keeps retrying before giving up
    pub timeout: Duration,
    /// Longest single park on a contended lock between attempts
    pub backoff: Duration,
    /// Hard cap on lock-acquisition attempts, independent of the clock
    pub max_attempts: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(1000),
            backoff: Duration::from_millis(1),
            max_attempts: 100_000,
        }
    }
}

impl TransferConfig {
    /// Create a TransferConfig, replacing zero values with defaults
    pub fn new(timeout: Duration, backoff: Duration, max_attempts: u32) -> Self {
        let default = Self::default();

        let timeout = if timeout.is_zero() {
            warn!(
                default_ms = default.timeout.as_millis() as u64,
                "Invalid transfer timeout (0), using default"
            );
            default.timeout
        } else {
            timeout
        };

        let backoff = if backoff.is_zero() {
            warn!(
                default_ms = default.backoff.as_millis() as u64,
                "Invalid transfer backoff (0), using default"
            );
            default.backoff
        } else {
            backoff
        };

        let max_attempts = if max_attempts == 0 {
            warn!(
                default = default.max_attempts,
                "Invalid max_attempts (0), using default"
            );
            default.max_attempts
        } else {
            max_attempts
        };

        Self {
            timeout,
            backoff,
            max_attempts,
        }
    }
}

/// Moves funds between accounts using try-lock with bounded retry
#[derive(Clone)]
pub struct TransferCoordinator {
    config: TransferConfig,
    audit: Arc<dyn AuditSink>,
}

impl TransferCoordinator {
    /// Create a coordinator that writes outcomes to `audit`
    pub fn new(config: TransferConfig, audit: Arc<dyn AuditSink>) -> Self {
        Self { config, audit }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Transfer with the configured timeout
    ///
    /// See [`transfer_with_timeout`](Self::transfer_with_timeout).
    pub fn transfer(
        &self,
        source: &Account,
        target: &Account,
        amount: Decimal,
    ) -> Result<TransferOutcome, BankError> {
        self.transfer_with_timeout(source, target, amount, self.config.timeout)
    }

    /// Move `amount` from `source` to `target`, giving up after `timeout`
    ///
    /// # Returns
    ///
    /// - `TransferOutcome::Committed` when both balances were updated
    /// - `TransferOutcome::InsufficientFunds` when the source could not cover
    ///   the amount; returned on the first attempt that held both locks
    /// - `TransferOutcome::TimedOut` when the deadline or the attempt limit
    ///   was reached first
    ///
    /// Only `Committed` changes any balance.
    ///
    /// # Errors
    ///
    /// - `BankError::InvalidAmount` if `amount` is negative
    /// - `BankError::SelfTransfer` if both sides are the same account
    /// - `BankError::ArithmeticOverflow` if the target cannot hold the credit
    pub fn transfer_with_timeout(
        &self,
        source: &Account,
        target: &Account,
        amount: Decimal,
        timeout: Duration,
    ) -> Result<TransferOutcome, BankError> {
        ensure_non_negative(amount, "transfer", source.id())?;
        if std::ptr::eq(source, target) || source.id() == target.id() {
            return Err(BankError::self_transfer(source.id()));
        }

        let started = Instant::now();
        // None when the timeout is too large to represent; max_attempts still bounds the loop
        let deadline = started.checked_add(timeout);
        let mut attempts: u32 = 0;

        debug!(
            source = source.id(),
            target = target.id(),
            %amount,
            "Transfer attempt"
        );

        loop {
            attempts += 1;

            let contended = match source.try_lock_balance() {
                Some(mut from) => match target.try_lock_balance() {
                    Some(mut to) => {
                        let available = *from;
                        let committed = if available >= amount {
                            let credited = to.checked_add(amount).ok_or_else(|| {
                                BankError::arithmetic_overflow("transfer", target.id())
                            })?;
                            *from -= amount;
                            *to = credited;
                            true
                        } else {
                            false
                        };
                        drop(to);
                        drop(from);

                        return Ok(self.finish(
                            source, target, amount, available, committed, attempts, started,
                        ));
                    }
                    None => {
                        // Holding source while waiting on target is what deadlocks
                        drop(from);
                        target
                    }
                },
                None => source,
            };

            let now = Instant::now();
            let expired = deadline.is_some_and(|deadline| now >= deadline);
            if expired || attempts >= self.config.max_attempts {
                self.audit.record_event(&AuditEvent::TransferTimedOut {
                    source: source.id(),
                    target: target.id(),
                    amount,
                    attempts,
                });
                warn!(
                    source = source.id(),
                    target = target.id(),
                    %amount,
                    attempts,
                    "Transfer timed out, deadlock prevented"
                );
                return Ok(TransferOutcome::TimedOut {
                    attempts,
                    elapsed: started.elapsed(),
                });
            }

            trace!(contended = contended.id(), attempts, "Lock busy, parking");
            let wait = match deadline {
                Some(deadline) => self.config.backoff.min(deadline.saturating_duration_since(now)),
                None => self.config.backoff,
            };
            drop(contended.lock_balance_for(wait));
        }
    }

    /// Audit and build the outcome once both locks have been released
    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        source: &Account,
        target: &Account,
        amount: Decimal,
        available: Decimal,
        committed: bool,
        attempts: u32,
        started: Instant,
    ) -> TransferOutcome {
        let elapsed = started.elapsed();

        if committed {
            self.audit.record_event(&AuditEvent::TransferCompleted {
                source: source.id(),
                target: target.id(),
                amount,
            });
            debug!(source = source.id(), target = target.id(), %amount, attempts, "Transfer committed");
            TransferOutcome::Committed { attempts, elapsed }
        } else {
            self.audit.record_event(&AuditEvent::TransferRefused {
                source: source.id(),
                target: target.id(),
                amount,
                available,
            });
            debug!(source = source.id(), target = target.id(), %amount, %available, "Transfer refused");
            TransferOutcome::InsufficientFunds {
                available,
                requested: amount,
                attempts,
                elapsed,
            }
        }
    }
}
