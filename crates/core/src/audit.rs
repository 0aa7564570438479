//! # Audit Module
//!
//! Append-only audit trail. Every mutating ledger or fixed-deposit
//! operation produces exactly one audit entry; entries are never
//! updated or deleted.

use crate::account::AccountNumber;
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of action an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    Logout,
    PasswordChange,
    AccountCreation,
    AccountDeletion,
    Deposit,
    Withdrawal,
    Transfer,
    CreatedFd,
    FdMatured,
    FdClosed,
    StatementGenerated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::PasswordChange => "password_change",
            AuditAction::AccountCreation => "account_creation",
            AuditAction::AccountDeletion => "account_deletion",
            AuditAction::Deposit => "deposit",
            AuditAction::Withdrawal => "withdrawal",
            AuditAction::Transfer => "transfer",
            AuditAction::CreatedFd => "created_fd",
            AuditAction::FdMatured => "fd_matured",
            AuditAction::FdClosed => "fd_closed",
            AuditAction::StatementGenerated => "statement_generated",
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.to_lowercase().as_str() {
            "login" => Ok(AuditAction::Login),
            "logout" => Ok(AuditAction::Logout),
            "password_change" => Ok(AuditAction::PasswordChange),
            "account_creation" => Ok(AuditAction::AccountCreation),
            "account_deletion" => Ok(AuditAction::AccountDeletion),
            "deposit" => Ok(AuditAction::Deposit),
            "withdrawal" => Ok(AuditAction::Withdrawal),
            "transfer" => Ok(AuditAction::Transfer),
            "created_fd" => Ok(AuditAction::CreatedFd),
            "fd_matured" => Ok(AuditAction::FdMatured),
            "fd_closed" => Ok(AuditAction::FdClosed),
            "statement_generated" => Ok(AuditAction::StatementGenerated),
            _ => Err(CoreError::UnknownAuditAction(s.to_string())),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable audit entry.
///
/// The acting account reference is carried for traceability only; the
/// audit trail is never consulted for control flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// Store-assigned identifier
    pub id: i64,
    /// Acting account
    pub account_number: AccountNumber,
    pub action: AuditAction,
    /// Account the action targeted (usually the actor's own)
    pub target_account: String,
    /// Free-text detail
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_roundtrip() {
        let all = [
            AuditAction::Login,
            AuditAction::Logout,
            AuditAction::PasswordChange,
            AuditAction::AccountCreation,
            AuditAction::AccountDeletion,
            AuditAction::Deposit,
            AuditAction::Withdrawal,
            AuditAction::Transfer,
            AuditAction::CreatedFd,
            AuditAction::FdMatured,
            AuditAction::FdClosed,
            AuditAction::StatementGenerated,
        ];
        for action in all {
            assert_eq!(AuditAction::parse(action.as_str()).unwrap(), action);
        }
        assert!(AuditAction::parse("impersonation").is_err());
    }
}
