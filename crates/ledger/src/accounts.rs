//! Account lifecycle
//!
//! Opening, deactivating, and blocking accounts. Balance mutations are
//! the ledger engine's business; this service only touches identity and
//! status.

use crate::error::{LedgerError, LedgerResult};
use crate::notifier::{LedgerEvent, Notifier, TracingNotifier};
use bom_core::{Account, AccountNumber, AccountStatus, AuditAction};
use bom_persistence::{AccountRepo, AuditLogRepo, Database};
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::sync::Arc;

const NUMBER_PICK_ATTEMPTS: usize = 16;

#[derive(Clone)]
pub struct AccountService {
    pool: SqlitePool,
    notifier: Arc<dyn Notifier>,
}

impl AccountService {
    pub fn new(db: &Database) -> Self {
        Self::with_notifier(db.pool().clone(), Arc::new(TracingNotifier))
    }

    pub fn with_notifier(pool: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// Open a new account with a zero balance and a fresh number.
    ///
    /// Email and mobile must be unused. The insert and the audit entry
    /// commit together.
    pub async fn open_account(
        &self,
        holder_name: &str,
        email: &str,
        mobile: &str,
    ) -> LedgerResult<Account> {
        if holder_name.trim().is_empty() {
            return Err(LedgerError::InvalidRequest(
                "holder name must not be empty".to_string(),
            ));
        }
        if AccountRepo::exists_by_email(&self.pool, email).await? {
            return Err(LedgerError::InvalidRequest(format!(
                "email {email} is already registered"
            )));
        }
        if AccountRepo::exists_by_mobile(&self.pool, mobile).await? {
            return Err(LedgerError::InvalidRequest(format!(
                "mobile {mobile} is already registered"
            )));
        }

        let account_number = self.pick_account_number().await?;
        let account = Account::new(account_number, holder_name, email, mobile);

        let mut tx = self.pool.begin().await?;
        AccountRepo::insert(&mut *tx, &account).await?;
        AuditLogRepo::insert(
            &mut *tx,
            &account.account_number,
            AuditAction::AccountCreation,
            account.account_number.as_str(),
            &format!("Account created for {holder_name}"),
            Utc::now(),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(account_number = %account.account_number, "account opened");
        if let Err(error) = self.notifier.notify(&LedgerEvent::AccountOpened {
            account_number: account.account_number.clone(),
        }) {
            tracing::warn!(%error, "notification dispatch failed");
        }
        Ok(account)
    }

    /// Random unused account number. Collisions are re-rolled.
    async fn pick_account_number(&self) -> LedgerResult<AccountNumber> {
        for _ in 0..NUMBER_PICK_ATTEMPTS {
            let digits = rand::thread_rng().gen_range(0..10_000_000);
            let candidate = AccountNumber::from_digits(digits);
            if AccountRepo::find_by_number(&self.pool, &candidate)
                .await?
                .is_none()
            {
                return Ok(candidate);
            }
        }
        Err(LedgerError::StoreUnavailable(
            "could not allocate an unused account number".to_string(),
        ))
    }

    /// Deactivate an account. Refused while any balance remains.
    pub async fn deactivate_account(
        &self,
        account_number: &AccountNumber,
    ) -> LedgerResult<Account> {
        let row = AccountRepo::get_by_number(&self.pool, account_number).await?;
        let mut account = Account::try_from(row).map_err(LedgerError::from)?;

        if account.balance != Decimal::ZERO {
            return Err(LedgerError::InvalidState(format!(
                "account {account_number} still holds {}",
                account.balance
            )));
        }
        if account.status == AccountStatus::Inactive {
            return Err(LedgerError::InvalidState(format!(
                "account {account_number} is already inactive"
            )));
        }

        let mut tx = self.pool.begin().await?;
        AccountRepo::update_status(&mut *tx, account_number, AccountStatus::Inactive).await?;
        AuditLogRepo::insert(
            &mut *tx,
            account_number,
            AuditAction::AccountDeletion,
            account_number.as_str(),
            "Account deactivated",
            Utc::now(),
        )
        .await?;
        tx.commit().await?;

        account.status = AccountStatus::Inactive;
        Ok(account)
    }

    /// Administrative block; reversible via `unblock_account`.
    pub async fn block_account(&self, account_number: &AccountNumber) -> LedgerResult<()> {
        AccountRepo::update_status(&self.pool, account_number, AccountStatus::Blocked).await?;
        tracing::info!(%account_number, "account blocked");
        Ok(())
    }

    pub async fn unblock_account(&self, account_number: &AccountNumber) -> LedgerResult<()> {
        AccountRepo::update_status(&self.pool, account_number, AccountStatus::Active).await?;
        tracing::info!(%account_number, "account unblocked");
        Ok(())
    }

    pub async fn get_by_number(&self, account_number: &AccountNumber) -> LedgerResult<Account> {
        let row = AccountRepo::get_by_number(&self.pool, account_number).await?;
        Account::try_from(row).map_err(LedgerError::from)
    }

    pub async fn get_by_email(&self, email: &str) -> LedgerResult<Account> {
        let row = AccountRepo::get_by_email(&self.pool, email).await?;
        Account::try_from(row).map_err(LedgerError::from)
    }

    /// All accounts, ordered by number.
    pub async fn list(&self) -> LedgerResult<Vec<Account>> {
        let rows = AccountRepo::get_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| Account::try_from(row).map_err(LedgerError::from))
            .collect()
    }
}
