//! Fixed-Deposit Engine - create, mature, close
//!
//! Creation debits the principal through the ledger's withdraw path;
//! maturation and closure credit through the deposit path. Each deposit
//! is its own atomic unit: a failure maturing one never aborts the
//! sweep for the rest.

use crate::engine::{credit_account, debit_account, LedgerEngine};
use crate::error::{LedgerError, LedgerResult};
use crate::locks::AccountLocks;
use crate::notifier::LedgerEvent;
use bom_core::{
    round_money, AccountNumber, AuditAction, FixedDeposit, FixedDepositStatus, InterestTerms,
    TransactionType,
};
use bom_persistence::{AuditLogRepo, FixedDepositRepo, FixedDepositRow};
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Fixed-deposit business rules.
#[derive(Debug, Clone)]
pub struct FixedDepositConfig {
    pub terms: InterestTerms,
    /// Smallest principal a deposit may be opened with
    pub min_principal: Decimal,
    /// Shortest term in months
    pub min_duration_months: u32,
}

impl Default for FixedDepositConfig {
    fn default() -> Self {
        Self {
            terms: InterestTerms::standard(),
            min_principal: Decimal::from(1000),
            min_duration_months: 3,
        }
    }
}

/// One deposit the sweep could not mature.
#[derive(Debug)]
pub struct SweepFailure {
    pub deposit_id: i64,
    pub error: LedgerError,
}

/// Result of one maturity sweep.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    /// Deposits transitioned to Matured and credited back
    pub processed: usize,
    /// Per-deposit failures, retried on the next firing
    pub failures: Vec<SweepFailure>,
}

/// Creates, matures, and closes fixed-term deposits.
#[derive(Clone)]
pub struct FixedDepositEngine {
    pool: SqlitePool,
    locks: Arc<AccountLocks>,
    ledger: LedgerEngine,
    config: FixedDepositConfig,
}

impl FixedDepositEngine {
    /// Build on top of a ledger engine, sharing its lock registry.
    pub fn new(ledger: LedgerEngine, config: FixedDepositConfig) -> Self {
        Self {
            pool: ledger.pool().clone(),
            locks: ledger.locks(),
            ledger,
            config,
        }
    }

    pub fn config(&self) -> &FixedDepositConfig {
        &self.config
    }

    /// Open a fixed deposit: debit the principal from the owning account
    /// and create the Active deposit record, atomically.
    pub async fn create_fixed_deposit(
        &self,
        account_number: &AccountNumber,
        principal: Decimal,
        duration_months: u32,
        description: &str,
    ) -> LedgerResult<FixedDeposit> {
        let principal = round_money(principal);
        if principal < self.config.min_principal {
            return Err(LedgerError::InvalidRequest(format!(
                "minimum fixed deposit amount is {}",
                self.config.min_principal
            )));
        }
        if duration_months < self.config.min_duration_months {
            return Err(LedgerError::InvalidRequest(format!(
                "minimum duration is {} months",
                self.config.min_duration_months
            )));
        }

        let maturity_amount = self.config.terms.maturity_amount(principal, duration_months);
        let _guard = self.locks.lock(account_number).await;

        let now = Utc::now();
        let maturity_date = FixedDeposit::maturity_date_for(now, duration_months);

        let mut tx = self.pool.begin().await?;
        debit_account(
            &mut tx,
            account_number,
            principal,
            TransactionType::Withdrawal,
            None,
            &format!("Fixed deposit creation: {description}"),
            now,
        )
        .await?;

        let id = FixedDepositRepo::insert(
            &mut *tx,
            account_number,
            principal,
            maturity_amount,
            duration_months,
            now,
            maturity_date,
            description,
        )
        .await?;

        AuditLogRepo::insert(
            &mut *tx,
            account_number,
            AuditAction::CreatedFd,
            account_number.as_str(),
            &format!("Fixed deposit created for {principal}"),
            now,
        )
        .await?;
        tx.commit().await?;

        self.ledger.dispatch(LedgerEvent::FixedDepositCreated {
            account_number: account_number.clone(),
            deposit_id: id,
            principal,
        });

        Ok(FixedDeposit {
            id,
            account_number: account_number.clone(),
            principal,
            maturity_amount,
            duration_months,
            start_date: now,
            maturity_date,
            status: FixedDepositStatus::Active,
            closed_date: None,
            description: description.to_string(),
        })
    }

    /// Mature every Active deposit whose maturity date has passed.
    ///
    /// Each deposit is handled in its own atomic unit; failures are
    /// collected and the sweep continues. Running the sweep again
    /// matures nothing extra - the status guard makes already-Matured
    /// deposits invisible to it.
    pub async fn process_matured_fixed_deposits(&self) -> LedgerResult<SweepOutcome> {
        let due = FixedDepositRepo::find_matured(&self.pool, Utc::now()).await?;
        let mut outcome = SweepOutcome::default();

        for row in due {
            let deposit_id = row.id;
            match self.mature_one(row).await {
                Ok(true) => outcome.processed += 1,
                // Lost a race with a concurrent closure; nothing to do.
                Ok(false) => {}
                Err(error) => {
                    tracing::warn!(deposit_id, %error, "failed to mature fixed deposit");
                    outcome.failures.push(SweepFailure { deposit_id, error });
                }
            }
        }

        tracing::info!(
            processed = outcome.processed,
            failed = outcome.failures.len(),
            "fixed deposit maturity sweep complete"
        );
        Ok(outcome)
    }

    /// Mature a single deposit. Returns Ok(false) when the deposit was
    /// no longer Active by the time its unit ran.
    async fn mature_one(&self, row: FixedDepositRow) -> LedgerResult<bool> {
        let account_number = AccountNumber::parse(&row.account_number)
            .map_err(|e| LedgerError::InvalidRequest(e.to_string()))?;
        let maturity_amount = row
            .maturity_amount
            .parse::<Decimal>()
            .map_err(|e| LedgerError::StoreUnavailable(format!("corrupt maturity amount: {e}")))?;

        let _guard = self.locks.lock(&account_number).await;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        if !FixedDepositRepo::mark_matured(&mut *tx, row.id).await? {
            tx.rollback().await?;
            return Ok(false);
        }
        credit_account(
            &mut tx,
            &account_number,
            maturity_amount,
            TransactionType::Deposit,
            &format!("Fixed deposit maturity: {}", row.description),
            now,
        )
        .await?;
        AuditLogRepo::insert(
            &mut *tx,
            &account_number,
            AuditAction::FdMatured,
            account_number.as_str(),
            &format!("Fixed deposit matured: {maturity_amount}"),
            now,
        )
        .await?;
        tx.commit().await?;

        self.ledger.dispatch(LedgerEvent::FixedDepositMatured {
            account_number,
            deposit_id: row.id,
            maturity_amount,
        });
        Ok(true)
    }

    /// Close a deposit before maturity at a penalized rate.
    ///
    /// The payout uses half the standard rate over the deposit's
    /// contracted duration; it is always at least the principal and
    /// strictly less than the full maturity amount.
    pub async fn close_fixed_deposit(
        &self,
        id: i64,
        requesting_account: &AccountNumber,
    ) -> LedgerResult<FixedDeposit> {
        let row = FixedDepositRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("fixed deposit {id}")))?;

        let mut deposit = FixedDeposit::try_from(row).map_err(LedgerError::from)?;
        if &deposit.account_number != requesting_account {
            return Err(LedgerError::Unauthorized(format!(
                "fixed deposit {id} is not owned by {requesting_account}"
            )));
        }
        if !deposit.is_active() {
            return Err(LedgerError::InvalidState(format!(
                "fixed deposit {id} is {}",
                deposit.status
            )));
        }

        let closure_amount = self
            .config
            .terms
            .premature_closure_amount(deposit.principal, deposit.duration_months);

        let _guard = self.locks.lock(&deposit.account_number).await;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        // Re-check under the transaction: a concurrent sweep may have
        // matured it between the read above and here.
        if !FixedDepositRepo::mark_closed(&mut *tx, id, now).await? {
            tx.rollback().await?;
            return Err(LedgerError::InvalidState(format!(
                "fixed deposit {id} is no longer active"
            )));
        }
        credit_account(
            &mut tx,
            &deposit.account_number,
            closure_amount,
            TransactionType::Deposit,
            &format!("Fixed deposit premature closure: {}", deposit.description),
            now,
        )
        .await?;
        AuditLogRepo::insert(
            &mut *tx,
            &deposit.account_number,
            AuditAction::FdClosed,
            deposit.account_number.as_str(),
            &format!("Fixed deposit closed: {closure_amount}"),
            now,
        )
        .await?;
        tx.commit().await?;

        self.ledger.dispatch(LedgerEvent::FixedDepositClosed {
            account_number: deposit.account_number.clone(),
            deposit_id: id,
            closure_amount,
        });

        deposit.status = FixedDepositStatus::Closed;
        deposit.closed_date = Some(now);
        Ok(deposit)
    }

    /// Active deposits owned by an account, newest first.
    pub async fn active_fixed_deposits(
        &self,
        account_number: &AccountNumber,
    ) -> LedgerResult<Vec<FixedDeposit>> {
        let rows = FixedDepositRepo::get_active_by_account(&self.pool, account_number).await?;
        rows.into_iter()
            .map(|row| FixedDeposit::try_from(row).map_err(LedgerError::from))
            .collect()
    }

    /// Look up a single deposit.
    pub async fn fixed_deposit(&self, id: i64) -> LedgerResult<FixedDeposit> {
        let row = FixedDepositRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("fixed deposit {id}")))?;
        FixedDeposit::try_from(row).map_err(LedgerError::from)
    }
}
