//! Account-related types for the concurrent accounts engine
//!
//! This module defines the account identifier and the point-in-time snapshot
//! used for reporting. The live, lock-guarded account lives in
//! [`crate::core::account`].

use rust_decimal::Decimal;
use serde::Serialize;

/// Account identifier
///
/// Assigned at creation and never changed afterwards.
pub type AccountId = u32;

/// Point-in-time view of an account's balance
///
/// Snapshots are taken for display and reporting only. They are not kept in
/// step with the live account and must not be used to decide whether a later
/// mutation is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    /// The account this snapshot was taken from
    pub id: AccountId,

    /// Balance observed while the account lock was briefly held
    pub balance: Decimal,
}

impl AccountSnapshot {
    /// Create a snapshot for the given account and balance
    pub fn new(id: AccountId, balance: Decimal) -> Self {
        AccountSnapshot { id, balance }
    }
}
