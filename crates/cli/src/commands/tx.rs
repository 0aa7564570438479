//! Ledger transaction commands

use anyhow::Result;
use bom_ledger::LedgerEngine;
use std::path::Path;

use crate::commands::parse_account;
use crate::db;
use crate::TxAction;

pub async fn handle(db_path: &Path, action: TxAction) -> Result<()> {
    let database = db::connect(db_path).await?;
    let engine = LedgerEngine::new(&database);

    match action {
        TxAction::Deposit {
            account_number,
            amount,
            description,
        } => {
            let number = parse_account(&account_number)?;
            let record = engine.deposit(&number, amount, &description).await?;
            let balance = engine.balance(&number).await?;
            println!("Deposited {} to {number} (tx #{})", record.amount, record.id);
            println!("New balance: {balance}");
        }
        TxAction::Withdraw {
            account_number,
            amount,
            description,
        } => {
            let number = parse_account(&account_number)?;
            let record = engine.withdraw(&number, amount, &description).await?;
            let balance = engine.balance(&number).await?;
            println!("Withdrew {} from {number} (tx #{})", record.amount, record.id);
            println!("New balance: {balance}");
        }
        TxAction::Transfer {
            from_account,
            to_account,
            amount,
            description,
        } => {
            let from = parse_account(&from_account)?;
            let to = parse_account(&to_account)?;
            let record = engine.transfer(&from, &to, amount, &description).await?;
            println!(
                "Transferred {} from {from} to {to} (tx #{})",
                record.amount, record.id
            );
        }
        TxAction::History {
            account_number,
            limit,
            offset,
        } => {
            let number = parse_account(&account_number)?;
            let history = engine.transaction_history(&number, limit, offset).await?;
            if history.is_empty() {
                println!("No transactions.");
            }
            for tx in history {
                let destination = tx
                    .to_account_number
                    .as_ref()
                    .map(|to| format!(" -> {to}"))
                    .unwrap_or_default();
                println!(
                    "#{:<6} {}  {:<10} {:>12}{}  {}",
                    tx.id,
                    tx.timestamp.to_rfc3339(),
                    tx.tx_type,
                    tx.amount,
                    destination,
                    tx.description
                );
            }
        }
    }

    Ok(())
}
