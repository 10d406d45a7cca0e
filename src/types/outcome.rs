//! Business outcomes of balance-changing operations
//!
//! Insufficient funds and transfer timeouts are normal results, not errors.
//! They are returned through these enums so callers can branch on them, while
//! contract violations such as a negative amount travel through
//! [`BankError`](super::BankError).

use rust_decimal::Decimal;
use std::time::Duration;

/// Result of a single withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawOutcome {
    /// Funds were removed; carries the post-withdrawal balance
    Withdrawn { balance: Decimal },

    /// Balance was lower than the requested amount and was left untouched
    InsufficientFunds { balance: Decimal, requested: Decimal },
}

impl WithdrawOutcome {
    /// `true` when the withdrawal was applied
    pub fn is_success(&self) -> bool {
        matches!(self, WithdrawOutcome::Withdrawn { .. })
    }

    /// Balance of the account right after the attempt
    pub fn balance(&self) -> Decimal {
        match self {
            WithdrawOutcome::Withdrawn { balance } => *balance,
            WithdrawOutcome::InsufficientFunds { balance, .. } => *balance,
        }
    }
}

/// Result of a transfer between two accounts
///
/// Every variant records how many lock-acquisition attempts were made and how
/// long the call took, so timeouts can be told apart from funding failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Both balances were updated
    Committed { attempts: u32, elapsed: Duration },

    /// Both locks were acquired but the source could not cover the amount
    ///
    /// Not retried: a lack of funds is not a transient condition.
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
        attempts: u32,
        elapsed: Duration,
    },

    /// The deadline or the attempt limit was reached before both locks could
    /// be held together
    TimedOut { attempts: u32, elapsed: Duration },
}

impl TransferOutcome {
    /// `true` when funds moved
    pub fn is_committed(&self) -> bool {
        matches!(self, TransferOutcome::Committed { .. })
    }

    /// `true` when the transfer gave up on lock acquisition
    pub fn is_timed_out(&self) -> bool {
        matches!(self, TransferOutcome::TimedOut { .. })
    }

    /// Number of lock-acquisition attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            TransferOutcome::Committed { attempts, .. }
            | TransferOutcome::InsufficientFunds { attempts, .. }
            | TransferOutcome::TimedOut { attempts, .. } => *attempts,
        }
    }

    /// Wall-clock time spent inside the transfer call
    pub fn elapsed(&self) -> Duration {
        match self {
            TransferOutcome::Committed { elapsed, .. }
            | TransferOutcome::InsufficientFunds { elapsed, .. }
            | TransferOutcome::TimedOut { elapsed, .. } => *elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::withdrawn(WithdrawOutcome::Withdrawn { balance: Decimal::from(150) }, true, Decimal::from(150))]
    #[case::insufficient(
        WithdrawOutcome::InsufficientFunds { balance: Decimal::from(50), requested: Decimal::from(100) },
        false,
        Decimal::from(50)
    )]
    fn test_withdraw_outcome_accessors(
        #[case] outcome: WithdrawOutcome,
        #[case] success: bool,
        #[case] balance: Decimal,
    ) {
        assert_eq!(outcome.is_success(), success);
        assert_eq!(outcome.balance(), balance);
    }

    #[rstest]
    #[case::committed(TransferOutcome::Committed { attempts: 1, elapsed: Duration::ZERO }, true, false)]
    #[case::insufficient(
        TransferOutcome::InsufficientFunds {
            available: Decimal::from(10),
            requested: Decimal::from(20),
            attempts: 2,
            elapsed: Duration::ZERO,
        },
        false,
        false
    )]
    #[case::timed_out(TransferOutcome::TimedOut { attempts: 7, elapsed: Duration::from_millis(5) }, false, true)]
    fn test_transfer_outcome_flags(
        #[case] outcome: TransferOutcome,
        #[case] committed: bool,
        #[case] timed_out: bool,
    ) {
        assert_eq!(outcome.is_committed(), committed);
        assert_eq!(outcome.is_timed_out(), timed_out);
    }

    #[test]
    fn test_transfer_outcome_reports_attempts_and_elapsed() {
        let outcome = TransferOutcome::TimedOut {
            attempts: 7,
            elapsed: Duration::from_millis(5),
        };

        assert_eq!(outcome.attempts(), 7);
        assert_eq!(outcome.elapsed(), Duration::from_millis(5));
    }
}
