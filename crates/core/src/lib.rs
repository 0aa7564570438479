//! # bom-core
//!
//! Domain types for the Bank of Madras ledger core: accounts, monetary
//! transactions, fixed-term deposits, and the audit trail. This crate is
//! pure data and math - persistence and orchestration live in
//! `bom-persistence` and `bom-ledger`.

pub mod account;
pub mod audit;
pub mod error;
pub mod fixed_deposit;
pub mod money;
pub mod transaction;

pub use account::{Account, AccountNumber, AccountRole, AccountStatus};
pub use audit::{AuditAction, AuditLog};
pub use error::{CoreError, CoreResult};
pub use fixed_deposit::{FixedDeposit, FixedDepositStatus, InterestTerms};
pub use money::{ensure_positive, round_money, MONEY_SCALE};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
