//! # bom-ledger
//!
//! The ledger core: the only component allowed to mutate account
//! balances. Every balance-affecting operation runs as one atomic unit -
//! balance update, transaction record, and audit entry commit together
//! or not at all - serialized per account by an in-process lock registry
//! on top of the store's transaction boundary.
//!
//! Request handlers call [`LedgerEngine`] and [`FixedDepositEngine`];
//! the [`MaturityScheduler`] drives the daily fixed-deposit sweep
//! independently of any request.

pub mod accounts;
pub mod audit;
pub mod engine;
pub mod error;
pub mod fixed_deposit;
pub mod locks;
pub mod notifier;
pub mod scheduler;

pub use accounts::AccountService;
pub use audit::AuditRecorder;
pub use engine::LedgerEngine;
pub use error::{LedgerError, LedgerResult};
pub use fixed_deposit::{FixedDepositConfig, FixedDepositEngine, SweepFailure, SweepOutcome};
pub use locks::AccountLocks;
pub use notifier::{LedgerEvent, Notifier, TracingNotifier};
pub use scheduler::MaturityScheduler;
