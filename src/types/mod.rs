//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account identifiers and balance snapshots
//! - `outcome`: Business outcomes of withdrawals and transfers
//! - `error`: Error types for the accounts engine

pub mod account;
pub mod error;
pub mod outcome;

pub use account::{AccountId, AccountSnapshot};
pub use error::BankError;
pub use outcome::{TransferOutcome, WithdrawOutcome};
