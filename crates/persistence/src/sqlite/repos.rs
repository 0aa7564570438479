//! Repository implementations for SQLite
//!
//! Stateless repos in the same shape for every table. Each function
//! takes an `impl SqliteExecutor`, so the ledger engines can point a
//! whole group of writes at one `sqlx` transaction and commit or roll
//! them back together.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use bom_core::{Account, AccountNumber, AccountStatus, AuditAction, TransactionStatus, TransactionType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteExecutor;

// ============================================================================
// Account Repository
// ============================================================================

/// Repository for the `accounts` table
pub struct AccountRepo;

impl AccountRepo {
    pub async fn insert(executor: impl SqliteExecutor<'_>, account: &Account) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (account_number, holder_name, email, mobile, balance, status, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.account_number.as_str())
        .bind(&account.holder_name)
        .bind(&account.email)
        .bind(&account.mobile)
        .bind(account.balance.to_string())
        .bind(account.status.as_str())
        .bind(account.role.as_str())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn get_by_number(
        executor: impl SqliteExecutor<'_>,
        account_number: &AccountNumber,
    ) -> PersistenceResult<AccountRow> {
        sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE account_number = ?")
            .bind(account_number.as_str())
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Account", account_number.as_str()))
    }

    pub async fn find_by_number(
        executor: impl SqliteExecutor<'_>,
        account_number: &AccountNumber,
    ) -> PersistenceResult<Option<AccountRow>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE account_number = ?")
            .bind(account_number.as_str())
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn get_by_email(
        executor: impl SqliteExecutor<'_>,
        email: &str,
    ) -> PersistenceResult<AccountRow> {
        sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Account", email))
    }

    pub async fn exists_by_email(
        executor: impl SqliteExecutor<'_>,
        email: &str,
    ) -> PersistenceResult<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_one(executor)
            .await?;
        Ok(row.0 > 0)
    }

    pub async fn exists_by_mobile(
        executor: impl SqliteExecutor<'_>,
        mobile: &str,
    ) -> PersistenceResult<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE mobile = ?")
            .bind(mobile)
            .fetch_one(executor)
            .await?;
        Ok(row.0 > 0)
    }

    /// Overwrite the stored balance. Only the ledger engines call this,
    /// inside a transaction that also records the mutation.
    pub async fn update_balance(
        executor: impl SqliteExecutor<'_>,
        account_number: &AccountNumber,
        balance: Decimal,
        updated_at: DateTime<Utc>,
    ) -> PersistenceResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET balance = ?, updated_at = ? WHERE account_number = ?",
        )
        .bind(balance.to_string())
        .bind(updated_at)
        .bind(account_number.as_str())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Account", account_number.as_str()));
        }
        Ok(())
    }

    pub async fn update_status(
        executor: impl SqliteExecutor<'_>,
        account_number: &AccountNumber,
        status: AccountStatus,
    ) -> PersistenceResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET status = ?, updated_at = ? WHERE account_number = ?",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(account_number.as_str())
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Account", account_number.as_str()));
        }
        Ok(())
    }

    pub async fn get_all(executor: impl SqliteExecutor<'_>) -> PersistenceResult<Vec<AccountRow>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM accounts ORDER BY account_number",
        )
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}

// ============================================================================
// Transaction Repository
// ============================================================================

/// Repository for the `transactions` table
pub struct TransactionRepo;

impl TransactionRepo {
    /// Insert a transaction record, returning the store-assigned id.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        executor: impl SqliteExecutor<'_>,
        account_number: &AccountNumber,
        to_account_number: Option<&AccountNumber>,
        amount: Decimal,
        tx_type: TransactionType,
        description: &str,
        status: TransactionStatus,
        timestamp: DateTime<Utc>,
    ) -> PersistenceResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (account_number, to_account_number, amount, tx_type, description, status, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account_number.as_str())
        .bind(to_account_number.map(|n| n.as_str()))
        .bind(amount.to_string())
        .bind(tx_type.as_str())
        .bind(description)
        .bind(status.as_str())
        .bind(timestamp)
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_by_id(
        executor: impl SqliteExecutor<'_>,
        id: i64,
    ) -> PersistenceResult<TransactionRow> {
        sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Transaction", &id.to_string()))
    }

    /// Transaction history for an account, newest first, paged.
    pub async fn get_by_account(
        executor: impl SqliteExecutor<'_>,
        account_number: &AccountNumber,
        limit: i64,
        offset: i64,
    ) -> PersistenceResult<Vec<TransactionRow>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT * FROM transactions WHERE account_number = ?
            ORDER BY timestamp DESC, id DESC LIMIT ? OFFSET ?
            "#,
        )
        .bind(account_number.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Transaction history for an account within a time range, newest first.
    pub async fn get_by_account_between(
        executor: impl SqliteExecutor<'_>,
        account_number: &AccountNumber,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PersistenceResult<Vec<TransactionRow>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT * FROM transactions
            WHERE account_number = ? AND timestamp >= ? AND timestamp <= ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(account_number.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn count_by_account(
        executor: impl SqliteExecutor<'_>,
        account_number: &AccountNumber,
    ) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE account_number = ?")
            .bind(account_number.as_str())
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Fixed Deposit Repository
// ============================================================================

/// Repository for the `fixed_deposits` table
pub struct FixedDepositRepo;

impl FixedDepositRepo {
    /// Insert a fixed deposit, returning the store-assigned id.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        executor: impl SqliteExecutor<'_>,
        account_number: &AccountNumber,
        principal: Decimal,
        maturity_amount: Decimal,
        duration_months: u32,
        start_date: DateTime<Utc>,
        maturity_date: DateTime<Utc>,
        description: &str,
    ) -> PersistenceResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO fixed_deposits
                (account_number, principal, maturity_amount, duration_months, start_date, maturity_date, status, closed_date, description)
            VALUES (?, ?, ?, ?, ?, ?, 'active', NULL, ?)
            "#,
        )
        .bind(account_number.as_str())
        .bind(principal.to_string())
        .bind(maturity_amount.to_string())
        .bind(duration_months as i64)
        .bind(start_date)
        .bind(maturity_date)
        .bind(description)
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(
        executor: impl SqliteExecutor<'_>,
        id: i64,
    ) -> PersistenceResult<Option<FixedDepositRow>> {
        let row = sqlx::query_as::<_, FixedDepositRow>("SELECT * FROM fixed_deposits WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Active deposits owned by an account, newest first.
    pub async fn get_active_by_account(
        executor: impl SqliteExecutor<'_>,
        account_number: &AccountNumber,
    ) -> PersistenceResult<Vec<FixedDepositRow>> {
        let rows = sqlx::query_as::<_, FixedDepositRow>(
            r#"
            SELECT * FROM fixed_deposits
            WHERE account_number = ? AND status = 'active'
            ORDER BY start_date DESC, id DESC
            "#,
        )
        .bind(account_number.as_str())
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Active deposits whose maturity date is at or before `as_of`.
    pub async fn find_matured(
        executor: impl SqliteExecutor<'_>,
        as_of: DateTime<Utc>,
    ) -> PersistenceResult<Vec<FixedDepositRow>> {
        let rows = sqlx::query_as::<_, FixedDepositRow>(
            r#"
            SELECT * FROM fixed_deposits
            WHERE status = 'active' AND maturity_date <= ?
            ORDER BY maturity_date ASC, id ASC
            "#,
        )
        .bind(as_of)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Transition an Active deposit to Matured. Returns false when the
    /// deposit was not Active anymore (already swept or closed).
    pub async fn mark_matured(executor: impl SqliteExecutor<'_>, id: i64) -> PersistenceResult<bool> {
        let result = sqlx::query(
            "UPDATE fixed_deposits SET status = 'matured' WHERE id = ? AND status = 'active'",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Transition an Active deposit to Closed with a closure date.
    /// Returns false when the deposit was not Active anymore.
    pub async fn mark_closed(
        executor: impl SqliteExecutor<'_>,
        id: i64,
        closed_date: DateTime<Utc>,
    ) -> PersistenceResult<bool> {
        let result = sqlx::query(
            "UPDATE fixed_deposits SET status = 'closed', closed_date = ? WHERE id = ? AND status = 'active'",
        )
        .bind(closed_date)
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

// ============================================================================
// Audit Log Repository
// ============================================================================

/// Repository for the `audit_logs` table. Append-only: entries are
/// never updated or deleted.
pub struct AuditLogRepo;

impl AuditLogRepo {
    pub async fn insert(
        executor: impl SqliteExecutor<'_>,
        account_number: &AccountNumber,
        action: AuditAction,
        target_account: &str,
        detail: &str,
        timestamp: DateTime<Utc>,
    ) -> PersistenceResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (account_number, action, target_account, detail, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(account_number.as_str())
        .bind(action.as_str())
        .bind(target_account)
        .bind(detail)
        .bind(timestamp)
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Entries produced by an acting account, newest first.
    pub async fn get_by_actor(
        executor: impl SqliteExecutor<'_>,
        account_number: &AccountNumber,
    ) -> PersistenceResult<Vec<AuditLogRow>> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            "SELECT * FROM audit_logs WHERE account_number = ? ORDER BY timestamp DESC, id DESC",
        )
        .bind(account_number.as_str())
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_action(
        executor: impl SqliteExecutor<'_>,
        action: AuditAction,
    ) -> PersistenceResult<Vec<AuditLogRow>> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            "SELECT * FROM audit_logs WHERE action = ? ORDER BY timestamp DESC, id DESC",
        )
        .bind(action.as_str())
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_target(
        executor: impl SqliteExecutor<'_>,
        target_account: &str,
    ) -> PersistenceResult<Vec<AuditLogRow>> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            "SELECT * FROM audit_logs WHERE target_account = ? ORDER BY timestamp DESC, id DESC",
        )
        .bind(target_account)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn get_between(
        executor: impl SqliteExecutor<'_>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PersistenceResult<Vec<AuditLogRow>> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT * FROM audit_logs WHERE timestamp >= ? AND timestamp <= ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn count(executor: impl SqliteExecutor<'_>) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}
