//! Database schema definitions
//!
//! Row types for sqlx mapping. Decimals are stored as TEXT and parsed
//! back on the way out; timestamps use chrono's RFC 3339 encoding.

use crate::error::{PersistenceError, PersistenceResult};
use bom_core::{
    Account, AccountNumber, AccountRole, AccountStatus, AuditAction, AuditLog, FixedDeposit,
    FixedDepositStatus, Transaction, TransactionStatus, TransactionType,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

fn parse_decimal(raw: &str) -> PersistenceResult<Decimal> {
    Decimal::from_str(raw).map_err(|e| PersistenceError::InvalidDecimal(format!("{raw}: {e}")))
}

/// Row type for the `accounts` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AccountRow {
    pub account_number: String,
    pub holder_name: String,
    pub email: String,
    pub mobile: String,
    pub balance: String, // Decimal stored as TEXT
    pub status: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRow {
    pub fn balance(&self) -> PersistenceResult<Decimal> {
        parse_decimal(&self.balance)
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = PersistenceError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            account_number: AccountNumber::parse(&row.account_number)?,
            holder_name: row.holder_name,
            email: row.email,
            mobile: row.mobile,
            balance: parse_decimal(&row.balance)?,
            status: AccountStatus::parse(&row.status)?,
            role: AccountRole::parse(&row.role)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row type for the `transactions` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: i64,
    pub account_number: String,
    pub to_account_number: Option<String>,
    pub amount: String, // Decimal stored as TEXT
    pub tx_type: String,
    pub description: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = PersistenceError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let to_account_number = row
            .to_account_number
            .as_deref()
            .map(AccountNumber::parse)
            .transpose()?;
        Ok(Transaction {
            id: row.id,
            account_number: AccountNumber::parse(&row.account_number)?,
            to_account_number,
            amount: parse_decimal(&row.amount)?,
            tx_type: TransactionType::parse(&row.tx_type)?,
            description: row.description,
            status: TransactionStatus::parse(&row.status)?,
            timestamp: row.timestamp,
        })
    }
}

/// Row type for the `fixed_deposits` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct FixedDepositRow {
    pub id: i64,
    pub account_number: String,
    pub principal: String,       // Decimal stored as TEXT
    pub maturity_amount: String, // Decimal stored as TEXT
    pub duration_months: i64,
    pub start_date: DateTime<Utc>,
    pub maturity_date: DateTime<Utc>,
    pub status: String,
    pub closed_date: Option<DateTime<Utc>>,
    pub description: String,
}

impl TryFrom<FixedDepositRow> for FixedDeposit {
    type Error = PersistenceError;

    fn try_from(row: FixedDepositRow) -> Result<Self, Self::Error> {
        Ok(FixedDeposit {
            id: row.id,
            account_number: AccountNumber::parse(&row.account_number)?,
            principal: parse_decimal(&row.principal)?,
            maturity_amount: parse_decimal(&row.maturity_amount)?,
            duration_months: row.duration_months as u32,
            start_date: row.start_date,
            maturity_date: row.maturity_date,
            status: FixedDepositStatus::parse(&row.status)?,
            closed_date: row.closed_date,
            description: row.description,
        })
    }
}

/// Row type for the `audit_logs` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AuditLogRow {
    pub id: i64,
    pub account_number: String,
    pub action: String,
    pub target_account: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<AuditLogRow> for AuditLog {
    type Error = PersistenceError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        Ok(AuditLog {
            id: row.id,
            account_number: AccountNumber::parse(&row.account_number)?,
            action: AuditAction::parse(&row.action)?,
            target_account: row.target_account,
            detail: row.detail,
            timestamp: row.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_row_conversion() {
        let now = Utc::now();
        let row = AccountRow {
            account_number: "BOM1234567".to_string(),
            holder_name: "Priya Raman".to_string(),
            email: "priya@example.com".to_string(),
            mobile: "9876543210".to_string(),
            balance: "250.50".to_string(),
            status: "active".to_string(),
            role: "user".to_string(),
            created_at: now,
            updated_at: now,
        };

        let account = Account::try_from(row).unwrap();
        assert_eq!(account.balance, dec!(250.50));
        assert_eq!(account.status, AccountStatus::Active);
    }

    #[test]
    fn test_bad_decimal_rejected() {
        let now = Utc::now();
        let row = AccountRow {
            account_number: "BOM1234567".to_string(),
            holder_name: "x".to_string(),
            email: "x@example.com".to_string(),
            mobile: "9876543210".to_string(),
            balance: "not-a-number".to_string(),
            status: "active".to_string(),
            role: "user".to_string(),
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(
            Account::try_from(row),
            Err(PersistenceError::InvalidDecimal(_))
        ));
    }
}
