//! Per-account lock registry
//!
//! Serializes all balance-affecting operations on a given account: two
//! concurrent operations can never both observe a pre-mutation balance
//! and independently commit conflicting updates. Transfers take both
//! account locks in lexicographic account-number order, so two transfers
//! touching the same pair in opposite directions cannot deadlock.

use bom_core::AccountNumber;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of one async mutex per account number.
///
/// Entries are created on first use and kept for the life of the
/// process; the registry is bounded by the number of accounts.
#[derive(Default)]
pub struct AccountLocks {
    inner: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, account_number: &AccountNumber) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().expect("account lock registry poisoned");
        map.entry(account_number.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire the lock for a single account.
    pub async fn lock(&self, account_number: &AccountNumber) -> OwnedMutexGuard<()> {
        self.entry(account_number).lock_owned().await
    }

    /// Acquire the locks for two distinct accounts in lexicographic
    /// order, regardless of which is source and which is destination.
    pub async fn lock_pair(
        &self,
        a: &AccountNumber,
        b: &AccountNumber,
    ) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        debug_assert_ne!(a.as_str(), b.as_str());
        let (first, second) = if a.as_str() <= b.as_str() { (a, b) } else { (b, a) };
        let first_guard = self.entry(first).lock_owned().await;
        let second_guard = self.entry(second).lock_owned().await;
        (first_guard, second_guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn number(raw: &str) -> AccountNumber {
        AccountNumber::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_same_account_is_exclusive() {
        let locks = Arc::new(AccountLocks::new());
        let acct = number("BOM0000001");

        let guard = locks.lock(&acct).await;
        let locks2 = locks.clone();
        let acct2 = acct.clone();
        let contender = tokio::spawn(async move {
            let _guard = locks2.lock(&acct2).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_opposite_direction_pairs_do_not_deadlock() {
        let locks = Arc::new(AccountLocks::new());
        let a = number("BOM0000001");
        let b = number("BOM0000002");

        let mut tasks = Vec::new();
        for i in 0..50 {
            let locks = locks.clone();
            let (x, y) = if i % 2 == 0 {
                (a.clone(), b.clone())
            } else {
                (b.clone(), a.clone())
            };
            tasks.push(tokio::spawn(async move {
                let _guards = locks.lock_pair(&x, &y).await;
            }));
        }
        for task in tasks {
            tokio::time::timeout(Duration::from_secs(5), task)
                .await
                .expect("deadlock between opposite-direction pairs")
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_distinct_accounts_run_in_parallel() {
        let locks = Arc::new(AccountLocks::new());
        let a = number("BOM0000001");
        let b = number("BOM0000002");

        let _guard_a = locks.lock(&a).await;
        // Holding A must not block B
        tokio::time::timeout(Duration::from_millis(100), locks.lock(&b))
            .await
            .expect("lock on a distinct account should be free");
    }
}
