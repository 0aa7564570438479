//! Ledger Engine - deposit, withdraw, transfer
//!
//! Each operation acquires the per-account lock(s), then runs one store
//! transaction covering the balance mutation, the transaction record,
//! and the audit entry. Nothing is observable until commit; a failure
//! at any step rolls the whole unit back.

use crate::error::{LedgerError, LedgerResult};
use crate::locks::AccountLocks;
use crate::notifier::{LedgerEvent, Notifier, TracingNotifier};
use bom_core::{
    ensure_positive, round_money, AccountNumber, AuditAction, Transaction, TransactionStatus,
    TransactionType,
};
use bom_persistence::{AccountRepo, AuditLogRepo, Database, TransactionRepo};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;

/// Read the current balance of an account inside a store transaction.
pub(crate) async fn load_balance(
    conn: &mut SqliteConnection,
    account_number: &AccountNumber,
) -> LedgerResult<Decimal> {
    let row = AccountRepo::find_by_number(&mut *conn, account_number)
        .await?
        .ok_or_else(|| LedgerError::AccountNotFound(account_number.to_string()))?;
    Ok(row.balance()?)
}

/// Credit `amount` to an account and record the Completed transaction.
///
/// Runs inside the caller's store transaction; the caller holds the
/// account lock and appends its own audit entry.
pub(crate) async fn credit_account(
    conn: &mut SqliteConnection,
    account_number: &AccountNumber,
    amount: Decimal,
    tx_type: TransactionType,
    description: &str,
    now: DateTime<Utc>,
) -> LedgerResult<Transaction> {
    let balance = load_balance(conn, account_number).await?;
    let new_balance = round_money(balance + amount);
    AccountRepo::update_balance(&mut *conn, account_number, new_balance, now).await?;

    let id = TransactionRepo::insert(
        &mut *conn,
        account_number,
        None,
        amount,
        tx_type,
        description,
        TransactionStatus::Completed,
        now,
    )
    .await?;

    Ok(Transaction {
        id,
        account_number: account_number.clone(),
        to_account_number: None,
        amount,
        tx_type,
        description: description.to_string(),
        status: TransactionStatus::Completed,
        timestamp: now,
    })
}

/// Debit `amount` from an account and record the Completed transaction.
///
/// Fails with `InsufficientBalance` before touching anything if the
/// balance does not cover the amount, so the non-negative invariant
/// holds at every observable instant.
pub(crate) async fn debit_account(
    conn: &mut SqliteConnection,
    account_number: &AccountNumber,
    amount: Decimal,
    tx_type: TransactionType,
    to_account_number: Option<&AccountNumber>,
    description: &str,
    now: DateTime<Utc>,
) -> LedgerResult<Transaction> {
    let balance = load_balance(conn, account_number).await?;
    if balance < amount {
        return Err(LedgerError::insufficient_balance(amount, balance));
    }
    let new_balance = round_money(balance - amount);
    AccountRepo::update_balance(&mut *conn, account_number, new_balance, now).await?;

    let id = TransactionRepo::insert(
        &mut *conn,
        account_number,
        to_account_number,
        amount,
        tx_type,
        description,
        TransactionStatus::Completed,
        now,
    )
    .await?;

    Ok(Transaction {
        id,
        account_number: account_number.clone(),
        to_account_number: to_account_number.cloned(),
        amount,
        tx_type,
        description: description.to_string(),
        status: TransactionStatus::Completed,
        timestamp: now,
    })
}

/// The component of record for account balances.
#[derive(Clone)]
pub struct LedgerEngine {
    pool: SqlitePool,
    locks: Arc<AccountLocks>,
    notifier: Arc<dyn Notifier>,
}

impl LedgerEngine {
    pub fn new(db: &Database) -> Self {
        Self::with_parts(
            db.pool().clone(),
            Arc::new(AccountLocks::new()),
            Arc::new(TracingNotifier),
        )
    }

    pub fn with_parts(
        pool: SqlitePool,
        locks: Arc<AccountLocks>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            pool,
            locks,
            notifier,
        }
    }

    /// The lock registry, shared with the fixed-deposit engine so both
    /// serialize against the same per-account locks.
    pub fn locks(&self) -> Arc<AccountLocks> {
        self.locks.clone()
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Credit `amount` to `account_number`.
    pub async fn deposit(
        &self,
        account_number: &AccountNumber,
        amount: Decimal,
        description: &str,
    ) -> LedgerResult<Transaction> {
        let amount = ensure_positive(amount)?;
        let _guard = self.locks.lock(account_number).await;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let record = credit_account(
            &mut tx,
            account_number,
            amount,
            TransactionType::Deposit,
            description,
            now,
        )
        .await?;
        AuditLogRepo::insert(
            &mut *tx,
            account_number,
            AuditAction::Deposit,
            account_number.as_str(),
            &format!("Deposit: {amount}"),
            now,
        )
        .await?;
        tx.commit().await?;

        self.dispatch(LedgerEvent::TransactionCompleted {
            account_number: account_number.clone(),
            tx_type: TransactionType::Deposit,
            amount,
        });
        Ok(record)
    }

    /// Debit `amount` from `account_number`.
    pub async fn withdraw(
        &self,
        account_number: &AccountNumber,
        amount: Decimal,
        description: &str,
    ) -> LedgerResult<Transaction> {
        let amount = ensure_positive(amount)?;
        let _guard = self.locks.lock(account_number).await;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let record = debit_account(
            &mut tx,
            account_number,
            amount,
            TransactionType::Withdrawal,
            None,
            description,
            now,
        )
        .await?;
        AuditLogRepo::insert(
            &mut *tx,
            account_number,
            AuditAction::Withdrawal,
            account_number.as_str(),
            &format!("Withdrawal: {amount}"),
            now,
        )
        .await?;
        tx.commit().await?;

        self.dispatch(LedgerEvent::TransactionCompleted {
            account_number: account_number.clone(),
            tx_type: TransactionType::Withdrawal,
            amount,
        });
        Ok(record)
    }

    /// Move `amount` between two accounts as one atomic unit: the sum of
    /// the two balances is the same before and after, and the source can
    /// never go negative with the destination credited.
    pub async fn transfer(
        &self,
        from_account: &AccountNumber,
        to_account: &AccountNumber,
        amount: Decimal,
        description: &str,
    ) -> LedgerResult<Transaction> {
        let amount = ensure_positive(amount)?;
        if from_account == to_account {
            return Err(LedgerError::InvalidRequest(
                "cannot transfer to the same account".to_string(),
            ));
        }
        let _guards = self.locks.lock_pair(from_account, to_account).await;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Destination must resolve before the source is touched.
        let dest_balance = load_balance(&mut tx, to_account).await?;

        let record = debit_account(
            &mut tx,
            from_account,
            amount,
            TransactionType::Transfer,
            Some(to_account),
            description,
            now,
        )
        .await?;

        let new_dest_balance = round_money(dest_balance + amount);
        AccountRepo::update_balance(&mut *tx, to_account, new_dest_balance, now).await?;

        AuditLogRepo::insert(
            &mut *tx,
            from_account,
            AuditAction::Transfer,
            to_account.as_str(),
            &format!("Transfer to {to_account}: {amount}"),
            now,
        )
        .await?;
        tx.commit().await?;

        self.dispatch(LedgerEvent::TransactionCompleted {
            account_number: from_account.clone(),
            tx_type: TransactionType::Transfer,
            amount,
        });
        Ok(record)
    }

    /// Transaction history for an account, newest first, paged.
    pub async fn transaction_history(
        &self,
        account_number: &AccountNumber,
        limit: i64,
        offset: i64,
    ) -> LedgerResult<Vec<Transaction>> {
        let rows =
            TransactionRepo::get_by_account(&self.pool, account_number, limit, offset).await?;
        rows.into_iter()
            .map(|row| Transaction::try_from(row).map_err(LedgerError::from))
            .collect()
    }

    /// Transaction history for an account within a time range.
    pub async fn transaction_history_between(
        &self,
        account_number: &AccountNumber,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LedgerResult<Vec<Transaction>> {
        let rows =
            TransactionRepo::get_by_account_between(&self.pool, account_number, from, to).await?;
        rows.into_iter()
            .map(|row| Transaction::try_from(row).map_err(LedgerError::from))
            .collect()
    }

    /// Current balance of an account.
    pub async fn balance(&self, account_number: &AccountNumber) -> LedgerResult<Decimal> {
        let row = AccountRepo::find_by_number(&self.pool, account_number)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_number.to_string()))?;
        Ok(row.balance()?)
    }

    /// Post-commit, fire-and-forget. A dispatch failure is logged and
    /// never surfaces to the caller.
    pub(crate) fn dispatch(&self, event: LedgerEvent) {
        if let Err(error) = self.notifier.notify(&event) {
            tracing::warn!(%error, ?event, "notification dispatch failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::test_support::RecordingNotifier;
    use bom_core::Account;
    use rust_decimal_macros::dec;

    async fn seeded_engine(notifier: Arc<dyn Notifier>) -> (LedgerEngine, AccountNumber) {
        let db = Database::in_memory().await.unwrap();
        let number = AccountNumber::parse("BOM0000001").unwrap();
        let account = Account::new(number.clone(), "Holder", "h@example.com", "9000000001");
        AccountRepo::insert(db.pool(), &account).await.unwrap();
        let engine =
            LedgerEngine::with_parts(db.pool().clone(), Arc::new(AccountLocks::new()), notifier);
        (engine, number)
    }

    #[tokio::test]
    async fn test_deposit_dispatches_event() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (engine, acct) = seeded_engine(notifier.clone()).await;

        engine.deposit(&acct, dec!(75), "seed").await.unwrap();

        let events = notifier.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            LedgerEvent::TransactionCompleted {
                tx_type: TransactionType::Deposit,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_operation() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let (engine, acct) = seeded_engine(notifier).await;

        engine.deposit(&acct, dec!(75), "seed").await.unwrap();
        assert_eq!(engine.balance(&acct).await.unwrap(), dec!(75.00));
    }
}
