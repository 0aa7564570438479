//! # Account Module
//!
//! The account record: a unique `BOM`-prefixed number, holder details,
//! a non-negative balance, and a status/role pair. Balances are only
//! ever mutated through the ledger or fixed-deposit engines.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated account number: `BOM` followed by exactly 7 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Parse and validate an account number.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let digits = raw
            .strip_prefix("BOM")
            .ok_or_else(|| CoreError::InvalidAccountNumber(raw.to_string()))?;
        if digits.len() != 7 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidAccountNumber(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Build an account number from a 7-digit sequence number.
    pub fn from_digits(digits: u32) -> Self {
        Self(format!("BOM{:07}", digits % 10_000_000))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountNumber> for String {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Normal operation
    Active,
    /// Deactivated by the holder; never physically deleted
    Inactive,
    /// Blocked by an administrator
    Blocked,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Blocked => "blocked",
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            "blocked" => Ok(AccountStatus::Blocked),
            _ => Err(CoreError::UnknownAccountStatus(s.to_string())),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account role. The core performs no role checks; the role is carried
/// for the authorization layer sitting in front of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    User,
    Admin,
    SuperAdmin,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::User => "user",
            AccountRole::Admin => "admin",
            AccountRole::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.to_lowercase().as_str() {
            "user" => Ok(AccountRole::User),
            "admin" => Ok(AccountRole::Admin),
            "super_admin" => Ok(AccountRole::SuperAdmin),
            _ => Err(CoreError::UnknownAccountRole(s.to_string())),
        }
    }
}

/// A customer account.
///
/// Invariant: `balance >= 0` before and after every committed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique, immutable account number (BOM + 7 digits)
    pub account_number: AccountNumber,
    /// Holder's full name
    pub holder_name: String,
    /// Unique contact email
    pub email: String,
    /// Unique 10-digit mobile number
    pub mobile: String,
    /// Current balance, scale 2
    pub balance: Decimal,
    /// Account status
    pub status: AccountStatus,
    /// Role carried for the authorization layer
    pub role: AccountRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new active user account with a zero balance.
    pub fn new(account_number: AccountNumber, holder_name: &str, email: &str, mobile: &str) -> Self {
        let now = Utc::now();
        Self {
            account_number,
            holder_name: holder_name.to_string(),
            email: email.to_string(),
            mobile: mobile.to_string(),
            balance: Decimal::ZERO,
            status: AccountStatus::Active,
            role: AccountRole::User,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account {} ({}, status: {}, balance: {})",
            self.account_number, self.holder_name, self.status, self.balance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_number_parse() {
        let number = AccountNumber::parse("BOM1234567").unwrap();
        assert_eq!(number.as_str(), "BOM1234567");

        assert!(AccountNumber::parse("BOM123456").is_err()); // 6 digits
        assert!(AccountNumber::parse("BOM12345678").is_err()); // 8 digits
        assert!(AccountNumber::parse("BOM12345a7").is_err()); // non-digit
        assert!(AccountNumber::parse("XYZ1234567").is_err()); // wrong prefix
    }

    #[test]
    fn test_account_number_from_digits() {
        assert_eq!(AccountNumber::from_digits(42).as_str(), "BOM0000042");
        assert_eq!(AccountNumber::from_digits(9_999_999).as_str(), "BOM9999999");
    }

    #[test]
    fn test_account_creation() {
        let number = AccountNumber::parse("BOM0000001").unwrap();
        let account = Account::new(number, "Priya Raman", "priya@example.com", "9876543210");

        assert_eq!(account.balance, dec!(0));
        assert_eq!(account.status, AccountStatus::Active);
        assert_eq!(account.role, AccountRole::User);
        assert!(account.is_active());
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            AccountStatus::Active,
            AccountStatus::Inactive,
            AccountStatus::Blocked,
        ] {
            assert_eq!(AccountStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(AccountStatus::parse("frozen").is_err());
    }

    #[test]
    fn test_role_roundtrip() {
        for role in [AccountRole::User, AccountRole::Admin, AccountRole::SuperAdmin] {
            assert_eq!(AccountRole::parse(role.as_str()).unwrap(), role);
        }
    }
}
