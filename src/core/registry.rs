//! Registry of shared accounts
//!
//! The `AccountRegistry` creates accounts and hands out `Arc<Account>`
//! handles. It never holds an account's balance lock itself: all balance
//! access goes through the handle.
//!
//! # Thread Safety
//!
//! Accounts are stored in a `DashMap`, so concurrent `open` calls for
//! different ids proceed in parallel, and two concurrent `open` calls for the
//! same id are resolved so that exactly one succeeds.

use super::account::Account;
use super::traits::AuditSink;
use crate::types::{AccountId, AccountSnapshot, BankError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Id-indexed store of shared accounts
pub struct AccountRegistry {
    accounts: DashMap<AccountId, Arc<Account>>,
    audit: Arc<dyn AuditSink>,
}

impl AccountRegistry {
    /// Create an empty registry whose accounts write to `audit`
    pub fn new(audit: Arc<dyn AuditSink>) -> Self {
        Self {
            accounts: DashMap::new(),
            audit,
        }
    }

    /// Create and register an account
    ///
    /// # Errors
    ///
    /// - `BankError::DuplicateAccount` if `id` is already registered
    /// - `BankError::InvalidAmount` if `initial` is negative
    pub fn open(&self, id: AccountId, initial: Decimal) -> Result<Arc<Account>, BankError> {
        match self.accounts.entry(id) {
            Entry::Occupied(_) => Err(BankError::duplicate_account(id)),
            Entry::Vacant(slot) => {
                let account = Arc::new(Account::new(id, initial, Arc::clone(&self.audit))?);
                slot.insert(Arc::clone(&account));
                Ok(account)
            }
        }
    }

    /// Open `count` accounts with ids `0..count`, all with the same balance
    ///
    /// Returns the handles in id order.
    ///
    /// # Errors
    ///
    /// - `BankError::InvalidConfig` if `count` exceeds the id space; no
    ///   account is opened in that case
    pub fn open_many(&self, count: usize, initial: Decimal) -> Result<Vec<Arc<Account>>, BankError> {
        let limit = AccountId::try_from(count).map_err(|_| {
            BankError::invalid_config(&format!(
                "cannot open {} accounts, ids are limited to {}",
                count,
                AccountId::MAX
            ))
        })?;

        (0..limit).map(|id| self.open(id, initial)).collect()
    }

    /// Look up an account handle
    pub fn get(&self, id: AccountId) -> Result<Arc<Account>, BankError> {
        self.accounts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| BankError::unknown_account(id))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Snapshots of every account, sorted by id
    ///
    /// Each balance is read separately, so the set is not an atomic cut
    /// across accounts while transfers are in flight.
    pub fn snapshots(&self) -> Vec<AccountSnapshot> {
        let handles: Vec<Arc<Account>> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut snapshots: Vec<AccountSnapshot> =
            handles.iter().map(|account| account.snapshot()).collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Sum of all balances
    pub fn total_balance(&self) -> Decimal {
        self.snapshots().iter().map(|s| s.balance).sum()
    }
}

impl fmt::Debug for AccountRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRegistry")
            .field("accounts", &self.accounts.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit_log::MemoryAuditLog;
    use std::thread;

    fn registry() -> (AccountRegistry, Arc<MemoryAuditLog>) {
        let log = Arc::new(MemoryAuditLog::new());
        (AccountRegistry::new(log.clone()), log)
    }

    #[test]
    fn test_open_registers_account() {
        let (registry, log) = registry();

        let account = registry.open(7, Decimal::from(250)).unwrap();

        assert_eq!(account.id(), 7);
        assert_eq!(registry.get(7).unwrap().balance(), Decimal::from(250));
        assert_eq!(registry.len(), 1);
        assert_eq!(log.count_containing("Account 7: Created with $250"), 1);
    }

    #[test]
    fn test_open_rejects_duplicate_id() {
        let (registry, _log) = registry();
        registry.open(1, Decimal::from(10)).unwrap();

        let result = registry.open(1, Decimal::from(20));

        assert_eq!(result.unwrap_err(), BankError::duplicate_account(1));
        assert_eq!(registry.get(1).unwrap().balance(), Decimal::from(10));
    }

    #[test]
    fn test_open_rejects_negative_initial_balance() {
        let (registry, _log) = registry();

        let result = registry.open(1, Decimal::from(-10));

        assert!(matches!(result, Err(BankError::InvalidAmount { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_get_unknown_account() {
        let (registry, _log) = registry();

        assert_eq!(registry.get(3).unwrap_err(), BankError::unknown_account(3));
    }

    #[test]
    fn test_handles_share_the_same_account() {
        let (registry, _log) = registry();
        let first = registry.open(1, Decimal::from(10)).unwrap();

        registry.get(1).unwrap().deposit(Decimal::from(5)).unwrap();

        assert_eq!(first.balance(), Decimal::from(15));
    }

    #[test]
    fn test_open_many_and_snapshots_are_sorted() {
        let (registry, _log) = registry();

        let accounts = registry.open_many(5, Decimal::from(1000)).unwrap();

        assert_eq!(
            accounts.iter().map(|a| a.id()).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
        let ids: Vec<AccountId> = registry.snapshots().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(registry.total_balance(), Decimal::from(5000));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_open_many_rejects_count_beyond_id_space() {
        let (registry, log) = registry();

        let result = registry.open_many(AccountId::MAX as usize + 2, Decimal::from(1));

        assert!(matches!(result, Err(BankError::InvalidConfig { .. })));
        assert!(registry.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn test_concurrent_open_same_id_succeeds_once() {
        let registry = Arc::new(AccountRegistry::new(Arc::new(MemoryAuditLog::new())));
        let mut handles = vec![];

        for _ in 0..10 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || registry.open(1, Decimal::from(100)).is_ok()));
        }

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_open_different_ids() {
        let registry = Arc::new(AccountRegistry::new(Arc::new(MemoryAuditLog::new())));
        let mut handles = vec![];

        for i in 0..10u32 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                registry.open(i, Decimal::from(i)).unwrap();
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 10);
        assert_eq!(registry.total_balance(), Decimal::from(45));
    }
}
