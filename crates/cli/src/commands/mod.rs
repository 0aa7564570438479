//! Command handlers

pub mod account;
pub mod audit;
pub mod fd;
pub mod tx;

use anyhow::{Context, Result};
use bom_core::AccountNumber;
use bom_ledger::{FixedDepositConfig, FixedDepositEngine, LedgerEngine, MaturityScheduler};
use std::path::Path;
use std::sync::Arc;

use crate::db;

pub(crate) fn parse_account(raw: &str) -> Result<AccountNumber> {
    AccountNumber::parse(raw).with_context(|| format!("invalid account number {raw:?}"))
}

/// Run the daily maturity sweep loop until interrupted.
pub async fn run_scheduler(db_path: &Path, hour: u32) -> Result<()> {
    let database = db::connect(db_path).await?;
    let ledger = LedgerEngine::new(&database);
    let engine = FixedDepositEngine::new(ledger, FixedDepositConfig::default());
    let scheduler = Arc::new(MaturityScheduler::new(engine, hour));

    println!("Maturity scheduler running (fires daily at {hour:02}:00 UTC). Ctrl-C to stop.");
    tokio::select! {
        _ = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => {
            println!("Scheduler stopped.");
        }
    }
    Ok(())
}
