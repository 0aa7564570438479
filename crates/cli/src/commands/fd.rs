//! Fixed deposit commands

use anyhow::Result;
use bom_ledger::{FixedDepositConfig, FixedDepositEngine, LedgerEngine};
use std::path::Path;

use crate::commands::parse_account;
use crate::db;
use crate::FdAction;

pub async fn handle(db_path: &Path, action: FdAction) -> Result<()> {
    let database = db::connect(db_path).await?;
    let ledger = LedgerEngine::new(&database);
    let engine = FixedDepositEngine::new(ledger.clone(), FixedDepositConfig::default());

    match action {
        FdAction::Open {
            account_number,
            principal,
            duration_months,
            description,
        } => {
            let number = parse_account(&account_number)?;
            let deposit = engine
                .create_fixed_deposit(&number, principal, duration_months, &description)
                .await?;
            println!("Fixed deposit #{} opened for {number}", deposit.id);
            println!("  Principal:  {}", deposit.principal);
            println!("  Matures on: {}", deposit.maturity_date.to_rfc3339());
            println!("  Pays out:   {}", deposit.maturity_amount);
        }
        FdAction::Close { deposit_id, account } => {
            let number = parse_account(&account)?;
            let deposit = engine.close_fixed_deposit(deposit_id, &number).await?;
            let balance = ledger.balance(&number).await?;
            println!("Fixed deposit #{} closed.", deposit.id);
            println!("New balance: {balance}");
        }
        FdAction::List { account_number } => {
            let number = parse_account(&account_number)?;
            let deposits = engine.active_fixed_deposits(&number).await?;
            if deposits.is_empty() {
                println!("No active fixed deposits.");
            }
            for deposit in deposits {
                println!(
                    "#{:<6} {:>12} for {:>3} months, matures {} paying {}",
                    deposit.id,
                    deposit.principal,
                    deposit.duration_months,
                    deposit.maturity_date.to_rfc3339(),
                    deposit.maturity_amount
                );
            }
        }
        FdAction::Sweep => {
            let outcome = engine.process_matured_fixed_deposits().await?;
            println!(
                "Sweep complete: {} matured, {} failed.",
                outcome.processed,
                outcome.failures.len()
            );
            for failure in &outcome.failures {
                println!("  deposit #{}: {}", failure.deposit_id, failure.error);
            }
        }
    }

    Ok(())
}
