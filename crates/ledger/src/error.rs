//! Ledger errors
//!
//! Every failure mode of the core is a distinct variant so calling
//! request handlers can map them to distinct user-facing responses.

use bom_core::CoreError;
use bom_persistence::PersistenceError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Ledger operation errors
#[derive(Debug, Error)]
pub enum LedgerError {
    // === Validation errors ===
    #[error("Invalid amount: {0} (must be strictly positive)")]
    InvalidAmount(Decimal),

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // === Lookup errors ===
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // === State errors ===
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    // === Store errors ===
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn insufficient_balance(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientBalance {
            required,
            available,
        }
    }

    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, Self::InsufficientBalance { .. })
    }
}

impl From<PersistenceError> for LedgerError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { entity, id } if entity == "Account" => {
                LedgerError::AccountNotFound(id)
            }
            PersistenceError::NotFound { entity, id } => {
                LedgerError::NotFound(format!("{entity} {id}"))
            }
            PersistenceError::AlreadyExists { entity, id } => {
                LedgerError::InvalidRequest(format!("{entity} {id} already exists"))
            }
            // Database failures and corrupt rows alike mean the store
            // cannot be trusted for this unit; the caller sees one kind.
            other => LedgerError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::StoreUnavailable(err.to_string())
    }
}

impl From<CoreError> for LedgerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidAmount(amount) => LedgerError::InvalidAmount(amount),
            other => LedgerError::InvalidRequest(other.to_string()),
        }
    }
}
