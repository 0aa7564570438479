//! # bom-persistence
//!
//! SQLite-backed account store for the Bank of Madras ledger core.
//! Repositories are stateless and take any `SqliteExecutor`, so a write
//! can run against the pool directly or inside a caller-owned
//! transaction - the ledger engines use the latter to make a balance
//! mutation, its transaction record, and its audit entry one atomic
//! unit.

pub mod error;
pub mod sqlite;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::repos::{AccountRepo, AuditLogRepo, FixedDepositRepo, TransactionRepo};
pub use sqlite::schema::{AccountRow, AuditLogRow, FixedDepositRow, TransactionRow};
pub use sqlite::Database;
