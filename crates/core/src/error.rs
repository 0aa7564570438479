//! # Error Module
//!
//! Domain errors for the core types, defined with thiserror.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core domain errors.
///
/// Pure validation and state errors, independent of any store.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid amount: {0} (must be strictly positive)")]
    InvalidAmount(Decimal),

    #[error("Invalid account number: {0} (expected BOM followed by 7 digits)")]
    InvalidAccountNumber(String),

    #[error("Unknown account status: {0}")]
    UnknownAccountStatus(String),

    #[error("Unknown account role: {0}")]
    UnknownAccountRole(String),

    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),

    #[error("Unknown transaction status: {0}")]
    UnknownTransactionStatus(String),

    #[error("Unknown fixed deposit status: {0}")]
    UnknownFixedDepositStatus(String),

    #[error("Unknown audit action: {0}")]
    UnknownAuditAction(String),
}

/// Result type alias with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidAmount(dec!(-10));
        assert!(err.to_string().contains("-10"));

        let err = CoreError::InvalidAccountNumber("ABC123".to_string());
        assert!(err.to_string().contains("ABC123"));
    }
}
