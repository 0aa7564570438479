//! # Fixed Deposit Module
//!
//! Fixed-term deposits earn simple interest on the principal. The
//! maturity amount is fixed at creation; the only mutation a deposit
//! ever sees is its terminal status transition (Matured or Closed).

use crate::account::AccountNumber;
use crate::error::{CoreError, CoreResult};
use crate::money::round_money;
use chrono::{DateTime, Months, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed deposit lifecycle.
///
/// `Active -> Matured` via the daily sweep, or `Active -> Closed` via
/// explicit premature closure. Both end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedDepositStatus {
    Active,
    Matured,
    Closed,
}

impl FixedDepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixedDepositStatus::Active => "active",
            FixedDepositStatus::Matured => "matured",
            FixedDepositStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.to_lowercase().as_str() {
            "active" => Ok(FixedDepositStatus::Active),
            "matured" => Ok(FixedDepositStatus::Matured),
            "closed" => Ok(FixedDepositStatus::Closed),
            _ => Err(CoreError::UnknownFixedDepositStatus(s.to_string())),
        }
    }
}

impl fmt::Display for FixedDepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Simple-interest terms applied to every fixed deposit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InterestTerms {
    /// Annual simple-interest rate (e.g. 0.05 for 5% p.a.)
    pub annual_rate: Decimal,
    /// Fraction of the annual rate paid out on premature closure
    pub premature_rate_factor: Decimal,
}

impl InterestTerms {
    /// Standard terms: 5% p.a., half rate on premature closure.
    pub fn standard() -> Self {
        Self {
            annual_rate: Decimal::new(5, 2),            // 0.05
            premature_rate_factor: Decimal::new(5, 1),  // 0.5
        }
    }

    /// Maturity amount: `principal * (1 + rate * months/12)`, rounded to
    /// two decimals half-up.
    pub fn maturity_amount(&self, principal: Decimal, duration_months: u32) -> Decimal {
        simple_interest_total(principal, self.annual_rate, duration_months)
    }

    /// Premature closure payout, computed at the reduced rate over the
    /// deposit's contracted duration (not elapsed time).
    pub fn premature_closure_amount(&self, principal: Decimal, duration_months: u32) -> Decimal {
        let reduced = self.annual_rate * self.premature_rate_factor;
        simple_interest_total(principal, reduced, duration_months)
    }
}

fn simple_interest_total(principal: Decimal, annual_rate: Decimal, duration_months: u32) -> Decimal {
    // Time in years at 4-decimal precision, half-up, matching the
    // monetary rounding convention.
    let time_in_years = (Decimal::from(duration_months) / Decimal::from(12))
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    round_money(principal * (Decimal::ONE + annual_rate * time_in_years))
}

/// A fixed-term deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedDeposit {
    /// Store-assigned identifier
    pub id: i64,
    /// Owning account
    pub account_number: AccountNumber,
    /// Principal debited from the owning account at creation
    pub principal: Decimal,
    /// Amount credited back at maturity, fixed at creation
    pub maturity_amount: Decimal,
    pub duration_months: u32,
    pub start_date: DateTime<Utc>,
    pub maturity_date: DateTime<Utc>,
    pub status: FixedDepositStatus,
    /// Set only on premature closure
    pub closed_date: Option<DateTime<Utc>>,
    pub description: String,
}

impl FixedDeposit {
    pub fn is_active(&self) -> bool {
        self.status == FixedDepositStatus::Active
    }

    /// Maturity date for a deposit starting at `start`.
    pub fn maturity_date_for(start: DateTime<Utc>, duration_months: u32) -> DateTime<Utc> {
        start
            .checked_add_months(Months::new(duration_months))
            .unwrap_or(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_maturity_amount_twelve_months() {
        let terms = InterestTerms::standard();
        assert_eq!(terms.maturity_amount(dec!(1000), 12), dec!(1050.00));
    }

    #[test]
    fn test_maturity_amount_six_months() {
        let terms = InterestTerms::standard();
        assert_eq!(terms.maturity_amount(dec!(1000), 6), dec!(1025.00));
    }

    #[test]
    fn test_maturity_amount_rounds_half_up() {
        let terms = InterestTerms::standard();
        // 2500 * (1 + 0.05 * 0.5833) = 2572.9125 -> 2572.91
        assert_eq!(terms.maturity_amount(dec!(2500), 7), dec!(2572.91));
    }

    #[test]
    fn test_premature_closure_between_principal_and_maturity() {
        let terms = InterestTerms::standard();
        let principal = dec!(1000);
        let maturity = terms.maturity_amount(principal, 12);
        let closure = terms.premature_closure_amount(principal, 12);

        assert_eq!(closure, dec!(1025.00)); // half of the 5% rate
        assert!(closure < maturity);
        assert!(closure >= principal);
    }

    #[test]
    fn test_maturity_date_adds_months() {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
        let maturity = FixedDeposit::maturity_date_for(start, 12);
        assert_eq!(maturity, Utc.with_ymd_and_hms(2027, 1, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            FixedDepositStatus::Active,
            FixedDepositStatus::Matured,
            FixedDepositStatus::Closed,
        ] {
            assert_eq!(FixedDepositStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(FixedDepositStatus::parse("expired").is_err());
    }
}
