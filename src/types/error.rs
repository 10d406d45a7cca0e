//! Error types for the concurrent accounts engine
//!
//! This module defines all error types that can occur while operating on
//! accounts, running workloads, and consuming directory listings.
//!
//! # Error Categories
//!
//! - **Contract violations**: Negative amounts, self-transfers, duplicate or unknown ids
//! - **Arithmetic errors**: Balance overflow
//! - **Workload errors**: Panicked tasks, runtime construction failures
//! - **I/O errors**: Audit/report writing, listing command failures
//!
//! Insufficient funds and transfer timeouts are not errors; see
//! [`crate::types::outcome`].

use super::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the accounts engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BankError {
    /// Amount was negative
    ///
    /// The caller broke the operation's contract. The amount is rejected
    /// rather than clamped and no balance is touched.
    #[error("Invalid amount {amount} for {operation} on account {account}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Operation that received it
        operation: String,
        /// Account the operation targeted
        account: AccountId,
    },

    /// Source and target of a transfer are the same account
    #[error("Cannot transfer from account {account} to itself")]
    SelfTransfer {
        /// The account named on both sides
        account: AccountId,
    },

    /// An account with this id is already registered
    #[error("Account {account} already exists")]
    DuplicateAccount {
        /// The clashing id
        account: AccountId,
    },

    /// No account with this id is registered
    #[error("Account {account} not found")]
    UnknownAccount {
        /// The missing id
        account: AccountId,
    },

    /// Arithmetic overflow would occur
    ///
    /// The operation is rejected to keep the balance intact.
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account the operation targeted
        account: AccountId,
    },

    /// Workload parameters cannot produce a meaningful run
    #[error("Invalid workload configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration
        message: String,
    },

    /// A workload task panicked before finishing
    #[error("Task {task} panicked: {message}")]
    TaskPanicked {
        /// Index of the task within its workload
        task: usize,
        /// Panic payload, when it was a string
        message: String,
    },

    /// The task runtime could not be built or driven
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the failure
        message: String,
    },

    /// I/O error occurred while writing output or reading a listing
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV serialization failed
    #[error("CSV error: {message}")]
    CsvError {
        /// Description of the CSV error
        message: String,
    },

    /// The listing producer command failed to start or exited unsuccessfully
    #[error("Listing command '{command}' failed: {message}")]
    ListingCommand {
        /// The command line that was run
        command: String,
        /// What went wrong
        message: String,
    },
}

// Conversion from io::Error to BankError
impl From<std::io::Error> for BankError {
    fn from(error: std::io::Error) -> Self {
        BankError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to BankError
impl From<csv::Error> for BankError {
    fn from(error: csv::Error) -> Self {
        BankError::CsvError {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl BankError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, operation: &str, account: AccountId) -> Self {
        BankError::InvalidAmount {
            amount,
            operation: operation.to_string(),
            account,
        }
    }

    /// Create a SelfTransfer error
    pub fn self_transfer(account: AccountId) -> Self {
        BankError::SelfTransfer { account }
    }

    /// Create a DuplicateAccount error
    pub fn duplicate_account(account: AccountId) -> Self {
        BankError::DuplicateAccount { account }
    }

    /// Create an UnknownAccount error
    pub fn unknown_account(account: AccountId) -> Self {
        BankError::UnknownAccount { account }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        BankError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(message: &str) -> Self {
        BankError::InvalidConfig {
            message: message.to_string(),
        }
    }

    /// Create a TaskPanicked error
    pub fn task_panicked(task: usize, message: &str) -> Self {
        BankError::TaskPanicked {
            task,
            message: message.to_string(),
        }
    }

    /// Create a Runtime error
    pub fn runtime(message: &str) -> Self {
        BankError::Runtime {
            message: message.to_string(),
        }
    }

    /// Create a ListingCommand error
    pub fn listing_command(command: &str, message: &str) -> Self {
        BankError::ListingCommand {
            command: command.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case::invalid_amount(
        BankError::InvalidAmount { amount: Decimal::from(-5), operation: "deposit".to_string(), account: 3 },
        "Invalid amount -5 for deposit on account 3"
    )]
    #[case::self_transfer(
        BankError::SelfTransfer { account: 7 },
        "Cannot transfer from account 7 to itself"
    )]
    #[case::duplicate_account(
        BankError::DuplicateAccount { account: 1 },
        "Account 1 already exists"
    )]
    #[case::unknown_account(
        BankError::UnknownAccount { account: 42 },
        "Account 42 not found"
    )]
    #[case::arithmetic_overflow(
        BankError::ArithmeticOverflow { operation: "deposit".to_string(), account: 1 },
        "Arithmetic overflow in deposit for account 1"
    )]
    #[case::invalid_config(
        BankError::InvalidConfig { message: "stress needs two accounts".to_string() },
        "Invalid workload configuration: stress needs two accounts"
    )]
    #[case::task_panicked(
        BankError::TaskPanicked { task: 4, message: "boom".to_string() },
        "Task 4 panicked: boom"
    )]
    #[case::runtime(
        BankError::Runtime { message: "no threads".to_string() },
        "Runtime error: no threads"
    )]
    #[case::io_error(
        BankError::IoError { message: "Permission denied".to_string() },
        "I/O error: Permission denied"
    )]
    #[case::listing_command(
        BankError::ListingCommand { command: "ls -l /tmp".to_string(), message: "exit status: 2".to_string() },
        "Listing command 'ls -l /tmp' failed: exit status: 2"
    )]
    fn test_error_display(#[case] error: BankError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::invalid_amount(
        BankError::invalid_amount(Decimal::from(-1), "withdraw", 2),
        BankError::InvalidAmount { amount: Decimal::from(-1), operation: "withdraw".to_string(), account: 2 }
    )]
    #[case::self_transfer(BankError::self_transfer(9), BankError::SelfTransfer { account: 9 })]
    #[case::duplicate_account(BankError::duplicate_account(5), BankError::DuplicateAccount { account: 5 })]
    #[case::unknown_account(BankError::unknown_account(6), BankError::UnknownAccount { account: 6 })]
    #[case::task_panicked(
        BankError::task_panicked(1, "oops"),
        BankError::TaskPanicked { task: 1, message: "oops".to_string() }
    )]
    fn test_helper_functions(#[case] result: BankError, #[case] expected: BankError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: BankError = io_error.into();
        assert!(matches!(error, BankError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
