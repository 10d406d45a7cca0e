//! Lock-guarded account
//!
//! An [`Account`] owns its balance behind its own mutex. It knows nothing
//! about other accounts; moving money between two accounts is the job of
//! [`TransferCoordinator`](super::TransferCoordinator).
//!
//! The type is not `Clone`. An account can be moved freely until it is
//! shared, after which it lives behind an `Arc`.

use super::audit_log::AuditEvent;
use super::traits::AuditSink;
use crate::types::{AccountId, AccountSnapshot, BankError, WithdrawOutcome};
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Shared account with a mutex-guarded balance
pub struct Account {
    id: AccountId,
    balance: Mutex<Decimal>,
    audit: Arc<dyn AuditSink>,
}

impl Account {
    /// Create an account with an initial balance
    ///
    /// Writes a "Created with" audit line so the trail starts from the
    /// opening balance.
    ///
    /// # Errors
    ///
    /// Returns `BankError::InvalidAmount` if `initial` is negative.
    pub fn new(
        id: AccountId,
        initial: Decimal,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, BankError> {
        ensure_non_negative(initial, "open", id)?;

        audit.record_event(&AuditEvent::Opened {
            account: id,
            amount: initial,
        });

        Ok(Account {
            id,
            balance: Mutex::new(initial),
            audit,
        })
    }

    /// The account's immutable identifier
    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Current balance, for display and reporting
    ///
    /// The value can be stale as soon as it is returned. Never use it to
    /// decide whether a later deposit, withdrawal or transfer may proceed;
    /// those operations re-check under the lock.
    pub fn balance(&self) -> Decimal {
        *self.balance.lock()
    }

    /// Snapshot of id and balance for reports
    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot::new(self.id, self.balance())
    }

    /// Add funds
    ///
    /// Blocks only until this account's lock is free. Records one audit line
    /// with the post-deposit balance while the lock is still held.
    ///
    /// # Returns
    ///
    /// The balance after the deposit.
    ///
    /// # Errors
    ///
    /// - `BankError::InvalidAmount` if `amount` is negative
    /// - `BankError::ArithmeticOverflow` if the balance cannot hold the sum
    ///
    /// In both cases the balance is left unchanged.
    pub fn deposit(&self, amount: Decimal) -> Result<Decimal, BankError> {
        ensure_non_negative(amount, "deposit", self.id)?;

        let mut balance = self.balance.lock();
        let updated = balance
            .checked_add(amount)
            .ok_or_else(|| BankError::arithmetic_overflow("deposit", self.id))?;
        *balance = updated;

        self.audit.record_event(&AuditEvent::Deposited {
            account: self.id,
            amount,
            balance: updated,
        });

        Ok(updated)
    }

    /// Remove funds if the balance covers them
    ///
    /// A shortfall is a normal outcome: it is logged as "Insufficient funds"
    /// and reported as [`WithdrawOutcome::InsufficientFunds`] without touching
    /// the balance.
    ///
    /// # Errors
    ///
    /// Returns `BankError::InvalidAmount` if `amount` is negative.
    pub fn withdraw(&self, amount: Decimal) -> Result<WithdrawOutcome, BankError> {
        ensure_non_negative(amount, "withdraw", self.id)?;

        let mut balance = self.balance.lock();
        if *balance >= amount {
            *balance -= amount;
            self.audit.record_event(&AuditEvent::Withdrawn {
                account: self.id,
                amount,
                balance: *balance,
            });
            Ok(WithdrawOutcome::Withdrawn { balance: *balance })
        } else {
            self.audit.record_event(&AuditEvent::WithdrawalRefused {
                account: self.id,
                amount,
                balance: *balance,
            });
            Ok(WithdrawOutcome::InsufficientFunds {
                balance: *balance,
                requested: amount,
            })
        }
    }

    /// Try to take the balance lock without blocking
    pub(crate) fn try_lock_balance(&self) -> Option<MutexGuard<'_, Decimal>> {
        self.balance.try_lock()
    }

    /// Park until the balance lock is free or `timeout` elapses
    pub(crate) fn lock_balance_for(&self, timeout: Duration) -> Option<MutexGuard<'_, Decimal>> {
        self.balance.try_lock_for(timeout)
    }

    /// Block until the balance lock is held
    #[cfg(test)]
    pub(crate) fn lock_balance(&self) -> MutexGuard<'_, Decimal> {
        self.balance.lock()
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("balance", &self.balance.try_lock().map(|b| *b))
            .finish()
    }
}

/// Reject negative amounts as a contract violation
pub(crate) fn ensure_non_negative(
    amount: Decimal,
    operation: &str,
    account: AccountId,
) -> Result<(), BankError> {
    if amount < Decimal::ZERO {
        return Err(BankError::invalid_amount(amount, operation, account));
    }
    Ok(())
}
